//! Decoding of bazel's analysis protocol (`aquery`) output.
//!
//! The action graph arrives in one of two wire versions which differ only in
//! how artifact paths are stored: v1 carries full exec paths, v2 carries
//! path-fragment chains. Both answer the same two queries:
//!
//! - which artifacts are *inputs* of a target's actions (via depset expansion)
//! - which artifacts are *outputs* of a target's actions (direct ids)
//!
//! Depsets form a DAG, not a tree, precisely so large artifact lists can be
//! shared between actions; expansion flattens one into a concrete artifact
//! set exactly once per reachable depset.

mod v1;
mod v2;
mod wire;

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;
use std::path::Path;
use strata_core::{Uri, EXEC_ROOT_SCHEME};
use wire::{Action, DepSetOfFiles};

#[derive(Debug, thiserror::Error)]
pub enum ActionGraphError {
    #[error("failed to decode {version} action graph: {source}")]
    Decode {
        version: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Version seam shared by the query implementations: target/action/depset
/// lookup plus version-specific artifact path resolution.
trait VersionedGraph {
    type Id: Clone + Eq + Hash + Default;

    fn target_id(&self, label: &str) -> Option<Self::Id>;
    fn actions_of(&self, target_id: &Self::Id) -> Vec<&Action<Self::Id>>;
    fn depset(&self, id: &Self::Id) -> Option<&DepSetOfFiles<Self::Id>>;
    fn artifact_exec_path(&self, id: &Self::Id) -> Option<String>;
}

/// A decoded action graph, tagged by wire version.
#[derive(Debug)]
pub enum ActionGraph {
    V1(v1::Graph),
    V2(v2::Graph),
}

impl ActionGraph {
    pub fn parse_v1(bytes: &[u8]) -> Result<Self, ActionGraphError> {
        let container: v1::ActionGraphContainer =
            serde_json::from_slice(bytes).map_err(|source| ActionGraphError::Decode {
                version: "v1",
                source,
            })?;
        Ok(ActionGraph::V1(v1::Graph::new(container)))
    }

    pub fn parse_v2(bytes: &[u8]) -> Result<Self, ActionGraphError> {
        let container: v2::ActionGraphContainer =
            serde_json::from_slice(bytes).map_err(|source| ActionGraphError::Decode {
                version: "v2",
                source,
            })?;
        Ok(ActionGraph::V2(v2::Graph::new(container)))
    }

    /// Input artifact paths of the label's actions, `exec-root://`-prefixed,
    /// deduplicated and sorted. An empty suffix list keeps every path.
    ///
    /// A label with no matching actions yields an empty result: targets that
    /// produce no actions (metadata-only rules) are a legitimate fall-through,
    /// not an error.
    pub fn inputs(&self, label: &str, suffixes: &[&str]) -> Vec<String> {
        match self {
            ActionGraph::V1(graph) => inputs_impl(graph, label, suffixes),
            ActionGraph::V2(graph) => inputs_impl(graph, label, suffixes),
        }
    }

    /// All input artifacts of the label's actions, resolved against the exec
    /// root.
    pub fn inputs_as_uris(&self, label: &str, exec_root: &Path) -> Vec<Uri> {
        self.inputs(label, &[])
            .iter()
            .filter_map(|path| Uri::from_exec_path(path, exec_root).ok())
            .collect()
    }

    /// Output artifact paths of the label's actions, filtered to the suffix
    /// set. Outputs are direct artifact ids; no depset expansion is involved.
    pub fn outputs(&self, label: &str, suffixes: &[&str]) -> Vec<String> {
        match self {
            ActionGraph::V1(graph) => outputs_impl(graph, label, suffixes),
            ActionGraph::V2(graph) => outputs_impl(graph, label, suffixes),
        }
    }
}

fn matches_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.is_empty() || suffixes.iter().any(|suffix| path.ends_with(suffix))
}

fn inputs_impl<G: VersionedGraph>(graph: &G, label: &str, suffixes: &[&str]) -> Vec<String> {
    let Some(target_id) = graph.target_id(label) else {
        return Vec::new();
    };

    let mut queue: VecDeque<G::Id> = graph
        .actions_of(&target_id)
        .iter()
        .flat_map(|action| action.input_dep_set_ids.iter().cloned())
        .collect();

    // Breadth-first depset expansion. The visited set keeps shared
    // sub-depsets from being expanded twice and guarantees termination when
    // the same depset is reachable via multiple paths.
    let mut visited: HashSet<G::Id> = HashSet::new();
    let mut artifact_ids: HashSet<G::Id> = HashSet::new();
    while let Some(depset_id) = queue.pop_front() {
        if !visited.insert(depset_id.clone()) {
            continue;
        }
        let Some(depset) = graph.depset(&depset_id) else {
            continue;
        };
        queue.extend(depset.transitive_dep_set_ids.iter().cloned());
        artifact_ids.extend(depset.direct_artifact_ids.iter().cloned());
    }

    let paths: BTreeSet<String> = artifact_ids
        .iter()
        .filter_map(|id| graph.artifact_exec_path(id))
        .map(|path| format!("{EXEC_ROOT_SCHEME}{path}"))
        .filter(|path| matches_suffix(path, suffixes))
        .collect();
    paths.into_iter().collect()
}

fn outputs_impl<G: VersionedGraph>(graph: &G, label: &str, suffixes: &[&str]) -> Vec<String> {
    let Some(target_id) = graph.target_id(label) else {
        return Vec::new();
    };

    let output_ids: HashSet<G::Id> = graph
        .actions_of(&target_id)
        .iter()
        .flat_map(|action| action.output_ids.iter().cloned())
        .collect();

    let paths: BTreeSet<String> = output_ids
        .iter()
        .filter_map(|id| graph.artifact_exec_path(id))
        .filter(|path| matches_suffix(path, suffixes))
        .collect();
    paths.into_iter().collect()
}
