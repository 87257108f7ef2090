use crate::wire::{Action, DepSetOfFiles, Target};
use crate::VersionedGraph;
use serde::Deserialize;
use std::collections::HashMap;

/// `analysis.ActionGraphContainer`: artifacts carry their full exec path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ActionGraphContainer {
    pub artifacts: Vec<Artifact>,
    pub targets: Vec<Target<String>>,
    pub actions: Vec<Action<String>>,
    pub dep_set_of_files: Vec<DepSetOfFiles<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Artifact {
    pub id: String,
    pub exec_path: String,
}

#[derive(Debug)]
pub(crate) struct Graph {
    container: ActionGraphContainer,
    depsets_by_id: HashMap<String, usize>,
    artifacts_by_id: HashMap<String, usize>,
}

impl Graph {
    pub(crate) fn new(container: ActionGraphContainer) -> Self {
        let depsets_by_id = container
            .dep_set_of_files
            .iter()
            .enumerate()
            .map(|(idx, depset)| (depset.id.clone(), idx))
            .collect();
        let artifacts_by_id = container
            .artifacts
            .iter()
            .enumerate()
            .map(|(idx, artifact)| (artifact.id.clone(), idx))
            .collect();
        Graph {
            container,
            depsets_by_id,
            artifacts_by_id,
        }
    }
}

impl VersionedGraph for Graph {
    type Id = String;

    fn target_id(&self, label: &str) -> Option<String> {
        // Linear scan: fine for single-pass use, the target list is walked
        // once per query.
        self.container
            .targets
            .iter()
            .find(|target| target.label == label)
            .map(|target| target.id.clone())
    }

    fn actions_of(&self, target_id: &String) -> Vec<&Action<String>> {
        self.container
            .actions
            .iter()
            .filter(|action| action.target_id == *target_id)
            .collect()
    }

    fn depset(&self, id: &String) -> Option<&DepSetOfFiles<String>> {
        self.depsets_by_id
            .get(id)
            .map(|&idx| &self.container.dep_set_of_files[idx])
    }

    fn artifact_exec_path(&self, id: &String) -> Option<String> {
        self.artifacts_by_id
            .get(id)
            .map(|&idx| self.container.artifacts[idx].exec_path.clone())
    }
}
