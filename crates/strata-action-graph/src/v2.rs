use crate::wire::{Action, DepSetOfFiles, Target};
use crate::VersionedGraph;
use serde::Deserialize;
use std::collections::HashMap;

/// `analysis_v2.ActionGraphContainer`: artifact paths are path-fragment
/// chains that need bottom-up reconstruction through the fragment table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ActionGraphContainer {
    pub artifacts: Vec<Artifact>,
    pub targets: Vec<Target<u32>>,
    pub actions: Vec<Action<u32>>,
    pub dep_set_of_files: Vec<DepSetOfFiles<u32>>,
    pub path_fragments: Vec<PathFragment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Artifact {
    pub id: u32,
    pub path_fragment_id: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PathFragment {
    pub id: u32,
    pub label: String,
    pub parent_id: u32,
}

#[derive(Debug)]
pub(crate) struct Graph {
    container: ActionGraphContainer,
    depsets_by_id: HashMap<u32, usize>,
    artifacts_by_id: HashMap<u32, usize>,
    fragments_by_id: HashMap<u32, usize>,
}

impl Graph {
    pub(crate) fn new(container: ActionGraphContainer) -> Self {
        let depsets_by_id = container
            .dep_set_of_files
            .iter()
            .enumerate()
            .map(|(idx, depset)| (depset.id, idx))
            .collect();
        let artifacts_by_id = container
            .artifacts
            .iter()
            .enumerate()
            .map(|(idx, artifact)| (artifact.id, idx))
            .collect();
        let fragments_by_id = container
            .path_fragments
            .iter()
            .enumerate()
            .map(|(idx, fragment)| (fragment.id, idx))
            .collect();
        Graph {
            container,
            depsets_by_id,
            artifacts_by_id,
            fragments_by_id,
        }
    }

    /// Rebuild a path by walking the fragment chain up to the root
    /// (`parent_id == 0` means no parent) and joining the labels in reverse.
    fn construct_path(&self, path_fragment_id: u32) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = path_fragment_id;
        while current != 0 {
            let fragment = self
                .fragments_by_id
                .get(&current)
                .map(|&idx| &self.container.path_fragments[idx])?;
            segments.push(fragment.label.as_str());
            current = fragment.parent_id;
        }
        segments.reverse();
        Some(segments.join("/"))
    }
}

impl VersionedGraph for Graph {
    type Id = u32;

    fn target_id(&self, label: &str) -> Option<u32> {
        self.container
            .targets
            .iter()
            .find(|target| target.label == label)
            .map(|target| target.id)
    }

    fn actions_of(&self, target_id: &u32) -> Vec<&Action<u32>> {
        self.container
            .actions
            .iter()
            .filter(|action| action.target_id == *target_id)
            .collect()
    }

    fn depset(&self, id: &u32) -> Option<&DepSetOfFiles<u32>> {
        self.depsets_by_id
            .get(id)
            .map(|&idx| &self.container.dep_set_of_files[idx])
    }

    fn artifact_exec_path(&self, id: &u32) -> Option<String> {
        let artifact = self
            .artifacts_by_id
            .get(id)
            .map(|&idx| &self.container.artifacts[idx])?;
        self.construct_path(artifact.path_fragment_id)
    }
}
