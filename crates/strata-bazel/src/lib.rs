//! Bazel integration for Strata.
//!
//! This crate drives the external build tool and hands its analysis output to
//! the resolution engine:
//! - workspace discovery (`WORKSPACE`, `WORKSPACE.bazel`, `MODULE.bazel`)
//! - command assembly and synchronous invocation with bazel's exit-code
//!   conventions (0 = ok, 8 = cancelled by the user, anything else = failure)
//! - `bazel info` parsing (exec root, output base, release version)
//! - action-graph fetch via `aquery`, wire version picked by release
//! - aspect-based target discovery producing raw [`strata_core::TargetInfo`]s

mod aquery;
mod command;
mod discovery;
mod info;
mod runner;
mod workspace;

pub use crate::{
    aquery::{fetch_action_graph, ActionGraphVersion},
    command::BazelCommand,
    discovery::{discover_targets, matches_target_pattern, DiscoveryResult, ASPECT_OUTPUT_SUFFIX},
    info::{BazelInfo, BazelRelease},
    runner::{BazelError, BazelOutput, BazelRunner, CommandRunner, DefaultCommandRunner},
    workspace::{bazel_workspace_root, is_bazel_workspace},
};

/// Exit code bazel reports when the user interrupts a command.
pub const USER_CANCELLED_EXIT_CODE: i32 = 8;
