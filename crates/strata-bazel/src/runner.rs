use crate::command::BazelCommand;
use crate::USER_CANCELLED_EXIT_CODE;
use std::io;
use std::path::{Path, PathBuf};
use strata_execution_context::WorkspaceContext;
use strata_process::{run_command_spec, CommandResult, CommandSpec, RunOptions};

/// Executes a fully assembled command. The production implementation shells
/// out through `strata-process`; tests substitute a fake.
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec, opts: RunOptions) -> io::Result<CommandResult>;
}

#[derive(Debug, Default, Clone)]
pub struct DefaultCommandRunner;

impl CommandRunner for DefaultCommandRunner {
    fn run(&self, spec: &CommandSpec, opts: RunOptions) -> io::Result<CommandResult> {
        run_command_spec(spec, opts)
    }
}

/// Captured output of a successful bazel invocation.
///
/// stderr is kept even on success: bazel reports warnings there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl BazelOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BazelError {
    #[error("bazel invocation `{command}` was cancelled by the user")]
    Cancelled { command: String },

    #[error("`{command}` failed with exit code {code}.\nstderr:\n{stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` was killed before reporting an exit code.\nstderr:\n{stderr}")]
    Killed { command: String, stderr: String },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Invokes bazel for one workspace, applying the workspace context's binary
/// and build flags to every command.
///
/// The runner is synchronous and never retries: a failure carries the full
/// captured stderr and retry policy is the calling orchestrator's business.
#[derive(Debug)]
pub struct BazelRunner<R = DefaultCommandRunner> {
    workspace_root: PathBuf,
    bazel_binary: PathBuf,
    build_flags: Vec<String>,
    runner: R,
}

impl BazelRunner<DefaultCommandRunner> {
    pub fn new(workspace_root: impl Into<PathBuf>, context: &WorkspaceContext) -> Self {
        Self::with_command_runner(workspace_root, context, DefaultCommandRunner)
    }
}

impl<R: CommandRunner> BazelRunner<R> {
    pub fn with_command_runner(
        workspace_root: impl Into<PathBuf>,
        context: &WorkspaceContext,
        runner: R,
    ) -> Self {
        BazelRunner {
            workspace_root: workspace_root.into(),
            bazel_binary: context.bazel_binary.value.clone(),
            build_flags: context.build_flags.flags.clone(),
            runner,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn run(&self, command: &BazelCommand) -> Result<BazelOutput, BazelError> {
        let args = command.to_args(&self.build_flags);
        let spec = CommandSpec::new(&self.workspace_root, &self.bazel_binary, &args);
        tracing::info!(command = %spec, "invoking bazel");

        let result = self
            .runner
            .run(&spec, RunOptions::default())
            .map_err(|source| BazelError::Io {
                command: spec.to_string(),
                source,
            })?;

        let stderr = result.output.stderr.clone();
        if !stderr.is_empty() {
            tracing::debug!(stderr = %stderr, "bazel stderr");
        }

        match result.exit_code() {
            Some(0) => Ok(BazelOutput {
                stdout: result.output.stdout,
                stderr,
            }),
            Some(USER_CANCELLED_EXIT_CODE) => Err(BazelError::Cancelled {
                command: spec.to_string(),
            }),
            Some(code) => Err(BazelError::CommandFailed {
                command: spec.to_string(),
                code,
                stderr,
            }),
            None => Err(BazelError::Killed {
                command: spec.to_string(),
                stderr,
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{workspace_context, FakeCommandRunner};
    use super::*;

    #[test]
    fn success_keeps_stderr_warnings() {
        let fake = FakeCommandRunner::default().respond("query", 0, b"//a:a\n", "WARNING: slow\n");
        let runner =
            BazelRunner::with_command_runner("/work", &workspace_context(&["--config=ide"]), fake);

        let output = runner.run(&BazelCommand::query().argument("//...")).unwrap();
        assert_eq!(output.stdout_text(), "//a:a\n");
        assert_eq!(output.stderr, "WARNING: slow\n");
    }

    #[test]
    fn build_flags_are_applied_to_every_command() {
        let fake = FakeCommandRunner::default();
        let runner =
            BazelRunner::with_command_runner("/work", &workspace_context(&["--config=ide"]), fake);

        runner.run(&BazelCommand::query().argument("//...")).unwrap();

        let seen = runner.runner.seen.lock().unwrap();
        assert_eq!(seen[0].args, vec!["query", "--config=ide", "//..."]);
        assert_eq!(seen[0].cwd, PathBuf::from("/work"));
    }

    #[test]
    fn exit_code_eight_maps_to_cancelled() {
        let fake = FakeCommandRunner::default().respond("build", 8, b"", "interrupted\n");
        let runner = BazelRunner::with_command_runner("/work", &workspace_context(&[]), fake);

        let err = runner.run(&BazelCommand::build().argument("//a:a")).unwrap_err();
        assert!(matches!(err, BazelError::Cancelled { .. }));
    }

    #[test]
    fn other_exit_codes_fail_with_captured_stderr() {
        let fake = FakeCommandRunner::default().respond("build", 1, b"", "ERROR: no such target\n");
        let runner = BazelRunner::with_command_runner("/work", &workspace_context(&[]), fake);

        let err = runner.run(&BazelCommand::build().argument("//gone")).unwrap_err();
        match err {
            BazelError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, 1);
                assert!(stderr.contains("no such target"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
