use crate::command::BazelCommand;
use crate::runner::{BazelRunner, CommandRunner};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use strata_core::{Label, TargetInfo};
use strata_execution_context::WorkspaceContext;
use walkdir::WalkDir;

/// Aspect applied to the requested targets during discovery.
const ASPECT_FLAG: &str = "--aspects=@strata//aspects:target_info.bzl%strata_target_info_aspect";
const OUTPUT_GROUP_FLAG: &str = "--output_groups=strata-target-info";

/// Suffix of the per-target descriptor files the aspect writes.
pub const ASPECT_OUTPUT_SUFFIX: &str = ".strata-info.json";

/// The raw material of a resolution pass: every analyzed target keyed by id,
/// plus the subset the user asked for (the roots of the pass).
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub targets: HashMap<String, TargetInfo>,
    pub root_targets: HashSet<String>,
}

/// Build the requested targets with the descriptor aspect attached, then
/// collect the descriptors the aspect wrote into the output tree.
///
/// The build is synchronous: descriptors are only read after the invocation
/// reported a clean exit, so the parser never sees a half-written set.
pub fn discover_targets<R: CommandRunner>(
    runner: &BazelRunner<R>,
    context: &WorkspaceContext,
    aspect_output_root: &Path,
) -> Result<DiscoveryResult> {
    let mut command = BazelCommand::build()
        .flag(ASPECT_FLAG)
        .flag(OUTPUT_GROUP_FLAG)
        .flag("--keep_going")
        .arguments(target_pattern_arguments(context));
    if context.build_manual_targets.value {
        command = command.flag("--build_manual_tests");
    }
    runner.run(&command).context("aspect build failed")?;

    let targets = read_aspect_outputs(aspect_output_root)?;
    let root_targets = select_root_targets(&targets, context);
    tracing::info!(
        targets = targets.len(),
        roots = root_targets.len(),
        "discovered targets"
    );

    Ok(DiscoveryResult {
        targets,
        root_targets,
    })
}

/// Included patterns verbatim, excluded patterns with the `-` prefix bazel
/// expects on the command line.
fn target_pattern_arguments(context: &WorkspaceContext) -> Vec<String> {
    let included = context.targets.included.iter().map(|label| label.value().to_string());
    let excluded = context
        .targets
        .excluded
        .iter()
        .map(|label| format!("-{}", label.value()));
    included.chain(excluded).collect()
}

fn read_aspect_outputs(aspect_output_root: &Path) -> Result<HashMap<String, TargetInfo>> {
    let mut targets = HashMap::new();
    for entry in WalkDir::new(aspect_output_root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(ASPECT_OUTPUT_SUFFIX) {
            continue;
        }

        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("failed to read {}", entry.path().display()))?;
        let info: TargetInfo = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", entry.path().display()))?;
        targets.insert(info.id.clone(), info);
    }
    Ok(targets)
}

fn select_root_targets(
    targets: &HashMap<String, TargetInfo>,
    context: &WorkspaceContext,
) -> HashSet<String> {
    targets
        .keys()
        .filter(|id| {
            let matches = |patterns: &[Label]| {
                patterns
                    .iter()
                    .any(|pattern| matches_target_pattern(id, pattern.value()))
            };
            matches(&context.targets.included) && !matches(&context.targets.excluded)
        })
        .cloned()
        .collect()
}

/// Whether a concrete label falls under a target pattern.
///
/// Supports the pattern forms a project view uses: exact labels,
/// `//package` shorthand, `//package:all`, and recursive `//package/...`.
pub fn matches_target_pattern(label: &str, pattern: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix("/...") {
        return label == prefix
            || label
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with(':'));
    }
    if let Some(package) = pattern.strip_suffix(":all") {
        return label
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with(':'));
    }
    if label == pattern {
        return true;
    }
    // `//package` is shorthand for `//package:package`.
    match label.rsplit_once(':') {
        Some((package, name)) => {
            package == pattern && package.rsplit('/').next().unwrap_or(package) == name
        }
        None => false,
    }
}
