//! Wire structs shared by both action-graph schema versions.
//!
//! Proto3-style JSON omits default-valued fields, so everything is
//! `#[serde(default)]`. The id type is the only difference between the
//! versions at this layer: v1 uses opaque strings, v2 dense integers.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Target<Id: Default> {
    pub id: Id,
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Action<Id: Default> {
    pub target_id: Id,
    pub input_dep_set_ids: Vec<Id>,
    pub output_ids: Vec<Id>,
}

/// A DAG node representing a set of artifacts: direct members plus
/// references to other depsets (shared between actions).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DepSetOfFiles<Id: Default> {
    pub id: Id,
    pub direct_artifact_ids: Vec<Id>,
    pub transitive_dep_set_ids: Vec<Id>,
}
