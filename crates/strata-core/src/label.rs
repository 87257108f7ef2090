use serde::{Deserialize, Serialize};
use std::fmt;

/// A bazel target label, e.g. `//server/sync:lib` or `@maven//:guava`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        Label(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Whether the label points into the main workspace (as opposed to an
    /// external repository).
    pub fn is_main_workspace(&self) -> bool {
        self.0.starts_with("//") || self.0.starts_with("@//") || self.0.starts_with("@@//")
    }

    /// The package path between `//` and `:`, e.g. `server/sync` for
    /// `//server/sync:lib`. External-repository prefixes are stripped.
    pub fn package_path(&self) -> &str {
        let without_repo = match self.0.find("//") {
            Some(idx) => &self.0[idx + 2..],
            None => self.0.as_str(),
        };
        match without_repo.split_once(':') {
            Some((package, _)) => package,
            None => without_repo,
        }
    }

    /// The target name after `:`, falling back to the last package segment
    /// for shorthand labels like `//server/sync`.
    pub fn target_name(&self) -> &str {
        if let Some((_, name)) = self.0.rsplit_once(':') {
            return name;
        }
        self.package_path()
            .rsplit('/')
            .next()
            .unwrap_or(self.package_path())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::new(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label(value)
    }
}
