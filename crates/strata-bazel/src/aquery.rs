use crate::command::BazelCommand;
use crate::info::BazelInfo;
use crate::runner::{BazelRunner, CommandRunner};
use anyhow::{Context, Result};
use strata_action_graph::ActionGraph;
use strata_core::Label;

/// Which analysis-protocol schema the tool emits.
///
/// The v2 container (path fragments instead of full exec paths) shipped with
/// bazel 4; older releases still speak v1. Development builds with no
/// parseable release are treated as current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionGraphVersion {
    V1,
    V2,
}

impl ActionGraphVersion {
    pub fn for_info(info: &BazelInfo) -> ActionGraphVersion {
        match &info.release {
            Some(release) if release.major < 4 => ActionGraphVersion::V1,
            _ => ActionGraphVersion::V2,
        }
    }
}

/// Fetch the action graph for the dependency closure of `targets` via
/// `bazel aquery --output=jsonproto`.
pub fn fetch_action_graph<R: CommandRunner>(
    runner: &BazelRunner<R>,
    info: &BazelInfo,
    targets: &[Label],
) -> Result<ActionGraph> {
    let expression = deps_expression(targets);
    let version = ActionGraphVersion::for_info(info);
    tracing::debug!(%expression, ?version, "fetching action graph");

    let output = runner
        .run(
            &BazelCommand::aquery()
                .flag("--output=jsonproto")
                .flag("--include_commandline=false")
                .argument(expression),
        )
        .context("bazel aquery failed")?;

    let graph = match version {
        ActionGraphVersion::V1 => ActionGraph::parse_v1(&output.stdout)?,
        ActionGraphVersion::V2 => ActionGraph::parse_v2(&output.stdout)?,
    };
    Ok(graph)
}

fn deps_expression(targets: &[Label]) -> String {
    let joined = targets
        .iter()
        .map(Label::value)
        .collect::<Vec<_>>()
        .join(" + ");
    format!("deps({joined})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::BazelRelease;
    use std::path::PathBuf;

    fn info_with_release(release: Option<BazelRelease>) -> BazelInfo {
        BazelInfo {
            execution_root: PathBuf::from("/exec"),
            output_base: PathBuf::from("/out"),
            workspace_root: PathBuf::from("/work"),
            release,
        }
    }

    #[test]
    fn release_selects_the_wire_version() {
        let old = info_with_release(BazelRelease::parse("release 3.7.2"));
        assert_eq!(ActionGraphVersion::for_info(&old), ActionGraphVersion::V1);

        let new = info_with_release(BazelRelease::parse("release 6.3.2"));
        assert_eq!(ActionGraphVersion::for_info(&new), ActionGraphVersion::V2);

        let unknown = info_with_release(None);
        assert_eq!(ActionGraphVersion::for_info(&unknown), ActionGraphVersion::V2);
    }

    #[test]
    fn deps_expression_joins_targets() {
        let expr = deps_expression(&[Label::new("//a:a"), Label::new("//b:b")]);
        assert_eq!(expr, "deps(//a:a + //b:b)");
    }
}
