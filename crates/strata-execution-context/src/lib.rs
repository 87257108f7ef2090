//! Validated, typed configuration derived from a project view.
//!
//! A resolution pass never works with the raw [`strata_project_view::ProjectView`];
//! it works with two immutable contexts constructed from it:
//!
//! - [`WorkspaceContext`]: target selection and bazel invocation settings for
//!   the current pass
//! - [`InstallationContext`]: toolchain paths and debug settings chosen at
//!   install time
//!
//! Each context field is produced by a dedicated mapper (a pure function from
//! the view to a typed entity) and construction is monadic: the first mapper
//! failure aborts the whole construction and its message is returned
//! verbatim. No partial contexts are ever exposed.

mod installation;
mod workspace;

pub use crate::{
    installation::{
        DebuggerAddressSpec, InstallationContext, InstallationContextConstructor, JavaPathSpec,
    },
    workspace::{
        BazelBinarySpec, BuildFlagsSpec, BuildManualTargetsSpec, ImportDepthSpec, TargetsSpec,
        WorkspaceContext, WorkspaceContextConstructor,
    },
};

/// A failed context construction.
///
/// Both variants carry messages meant for the IDE user: they name the
/// offending section or field and the concrete reason.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("mapping project view into '{section}' failed! {reason}")]
    Mapping { section: String, reason: String },

    #[error("{message}")]
    MissingField { message: String },
}

impl ContextError {
    pub(crate) fn mapping(section: &str, reason: impl Into<String>) -> Self {
        ContextError::Mapping {
            section: section.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_field(context_name: &str, field: &str) -> Self {
        ContextError::MissingField {
            message: format!("{context_name} creation failed! '{field}' has to be defined."),
        }
    }
}
