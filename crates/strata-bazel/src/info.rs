use crate::command::BazelCommand;
use crate::runner::{BazelRunner, CommandRunner};
use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// The bazel release version, e.g. `6.3.2`.
///
/// Development builds report `no_version` (or other unparseable strings);
/// those resolve to `None` at the call sites that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BazelRelease {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl BazelRelease {
    /// Parse the value of `bazel info release`.
    ///
    /// Accepts `release 6.3.2`, bare `6.3.2`, and suffixed forms like
    /// `6.4.0rc1` or `8.0.0-pre.20240101.2`.
    pub fn parse(raw: &str) -> Option<BazelRelease> {
        let version = raw.trim().strip_prefix("release ").unwrap_or(raw.trim());
        let mut numbers = version.split('.').map(leading_number);
        Some(BazelRelease {
            major: numbers.next()??,
            minor: numbers.next()??,
            patch: numbers.next()??,
        })
    }
}

fn leading_number(segment: &str) -> Option<u32> {
    let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Workspace facts reported by `bazel info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelInfo {
    pub execution_root: PathBuf,
    pub output_base: PathBuf,
    pub workspace_root: PathBuf,
    pub release: Option<BazelRelease>,
}

impl BazelInfo {
    pub fn resolve<R: CommandRunner>(runner: &BazelRunner<R>) -> Result<BazelInfo> {
        let output = runner
            .run(&BazelCommand::info())
            .context("failed to query bazel info")?;
        BazelInfo::parse(&output.stdout_text())
    }

    /// Parse `bazel info` output: one `key: value` pair per line.
    pub fn parse(stdout: &str) -> Result<BazelInfo> {
        let entries: HashMap<&str, &str> = stdout
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let path_entry = |key: &str| -> Result<PathBuf> {
            entries
                .get(key)
                .map(|value| PathBuf::from(*value))
                .ok_or_else(|| anyhow!("bazel info did not report '{key}'"))
        };

        Ok(BazelInfo {
            execution_root: path_entry("execution_root")?,
            output_base: path_entry("output_base")?,
            workspace_root: path_entry("workspace")?,
            release: entries.get("release").and_then(|raw| BazelRelease::parse(raw)),
        })
    }
}
