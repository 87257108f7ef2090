use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Scheme used by the action graph for exec-root-relative artifact paths.
pub const EXEC_ROOT_SCHEME: &str = "exec-root://";

/// A `file://` URI.
///
/// The resolution engine hands locations to the IDE layer as URIs; all
/// constructors normalize to an absolute `file://` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UriError {
    #[error("'{path}' does not start with '{EXEC_ROOT_SCHEME}'")]
    NotAnExecPath { path: String },
}

impl Uri {
    pub fn from_file_uri(uri: impl Into<String>) -> Self {
        Uri(uri.into())
    }

    pub fn from_absolute_path(path: &Path) -> Self {
        Uri(format!("file://{}", path.display()))
    }

    /// Resolve an `exec-root://`-prefixed artifact path against the exec root.
    pub fn from_exec_path(exec_path: &str, exec_root: &Path) -> Result<Self, UriError> {
        let relative =
            exec_path
                .strip_prefix(EXEC_ROOT_SCHEME)
                .ok_or_else(|| UriError::NotAnExecPath {
                    path: exec_path.to_string(),
                })?;
        Ok(Uri::from_absolute_path(&exec_root.join(relative)))
    }

    pub fn from_workspace_path(path: &str, workspace_root: &Path) -> Self {
        Uri::from_absolute_path(&workspace_root.join(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
