//! The project resolution engine.
//!
//! A resolution pass turns the raw analysis output of the build tool into an
//! IDE-consumable [`Project`]:
//!
//! 1. construct the [`strata_execution_context::WorkspaceContext`] from the
//!    project view,
//! 2. drive discovery (the bazel boundary) to obtain the complete target map
//!    and root-target set,
//! 3. build the [`DependencyTree`] over the full target graph,
//! 4. dispatch language plugins per target (after a mandatory whole-graph
//!    prepare pass),
//! 5. assemble the immutable project model plus its source-to-target index.
//!
//! The pass is single-threaded and synchronous: every stage consumes the
//! complete output of its predecessor. Depset expansion and transitive
//! closures are only correct over a complete, static graph.

mod dependency_tree;
pub mod languages;
mod mapper;
mod model;
mod paths;
mod resolver;

pub use crate::{
    dependency_tree::DependencyTree,
    mapper::ProjectMapper,
    model::{BuildTargetData, Language, LanguageData, Module, Project, SourceSet, Tag},
    paths::BazelPathsResolver,
    resolver::{BazelTargetDiscovery, ProjectResolver, TargetDiscovery},
};
