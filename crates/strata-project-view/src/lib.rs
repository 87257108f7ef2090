//! The project-view configuration DSL.
//!
//! A project view is a line-oriented text file selecting which targets and
//! options apply to a resolution pass:
//!
//! ```text
//! import tools/base.projectview
//!
//! targets:
//!   //server/...
//!   -//server/experimental/...
//!
//! bazel_path: /usr/local/bin/bazel
//! ```
//!
//! This crate splits the text into raw sections, parses each known section
//! into a typed value, and merges imported views into a single immutable
//! [`ProjectView`].

mod model;
mod parser;
mod sections;
mod splitter;

pub use crate::{
    model::ProjectView,
    parser::{FileProvider, FsFileProvider, ProjectViewParser},
    sections::{
        BazelPathSection, BuildFlagsSection, BuildManualTargetsSection, DebuggerAddressSection,
        ImportDepthSection, JavaPathSection, TargetsSection,
    },
    splitter::{split_into_raw_sections, RawSection, RawSections},
};

use std::path::PathBuf;

/// Errors produced while parsing or assembling a project view.
///
/// Every variant names the offending section (or file) and the concrete
/// reason: these messages are shown to the IDE user as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ProjectViewError {
    #[error("section name '{actual}' does not match parsed section '{expected}'")]
    WrongSectionName { expected: String, actual: String },

    #[error("'{section}' section has an invalid value '{value}': {reason}")]
    MalformedValue {
        section: String,
        value: String,
        reason: String,
    },

    #[error("'targets' section in project view is empty.")]
    MissingTargets,

    #[error("'targets' section has no included targets.")]
    NoIncludedTargets,

    #[error("import cycle detected at {path}: {chain}")]
    ImportCycle { path: PathBuf, chain: String },

    #[error("failed to read imported project view {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
