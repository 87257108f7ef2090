//! Safe helpers for spawning external commands.
//!
//! Build tools can be extremely chatty. Using `std::process::Command::output()`
//! buffers *all* stdout/stderr in memory, which can lead to OOM when invoked
//! from a long-lived resolution service. This crate provides bounded output
//! capture with an optional wall-clock timeout.
//!
//! Both streams are drained to EOF on reader threads and joined before a
//! result is returned: callers always observe a complete capture, never a
//! partial stream. A reader failure surfaces as an error, not as truncated
//! output.

use std::{
    fmt,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

/// Captured stdout/stderr from a command, truncated to a maximum size.
///
/// stdout is kept as raw bytes (it may carry a wire payload); stderr is
/// diagnostics text and is decoded lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    /// Set when either stdout or stderr had more bytes than were captured.
    pub truncated: bool,
}

impl BoundedOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Options controlling command execution.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Kill the process if it hasn't exited after this duration.
    pub timeout: Option<Duration>,
    /// Maximum bytes to capture *per stream* (stdout and stderr).
    pub max_bytes: usize,
    /// How long to wait after sending a graceful termination signal before
    /// force-killing the process tree.
    pub kill_grace: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            // 64MiB per stream: action-graph dumps for large workspaces are
            // big, and the parser needs the complete payload.
            max_bytes: 64 * 1024 * 1024,
            kill_grace: Duration::from_millis(250),
        }
    }
}

/// A full command invocation (cwd + program + args).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub cwd: PathBuf,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(cwd: &Path, program: &Path, args: &[String]) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            program: program.to_path_buf(),
            args: args.to_vec(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Human-readable debugging output, not a round-trippable shell snippet.
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') || arg.contains('\t') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Result of running a command with bounded output capture.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: ExitStatus,
    pub output: BoundedOutput,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Run a command, capturing at most `opts.max_bytes` bytes of stdout and
/// stderr each.
///
/// The function always returns the process `ExitStatus`. When the timeout is
/// reached, the process tree is killed and `timed_out` is set to `true`.
pub fn run_command(
    cwd: &Path,
    program: &Path,
    args: &[String],
    opts: RunOptions,
) -> io::Result<CommandResult> {
    run_command_spec(&CommandSpec::new(cwd, program, args), opts)
}

pub fn run_command_spec(command: &CommandSpec, opts: RunOptions) -> io::Result<CommandResult> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(&command.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Put the child into its own process group on Unix so timeouts can kill
    // the whole process tree (wrapper scripts spawning long-running children
    // would otherwise keep the stdout/stderr pipes open).
    #[cfg(unix)]
    unsafe {
        use std::os::unix::process::CommandExt;

        cmd.pre_exec(|| {
            // SAFETY: `setpgid` is async-signal-safe and does not allocate.
            // This is executed after `fork` in the child process.
            if libc::setpgid(0, 0) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let mut child = cmd.spawn()?;

    let Some(stdout) = child.stdout.take() else {
        return Err(io::Error::other("child stdout was not captured"));
    };
    let Some(stderr) = child.stderr.take() else {
        return Err(io::Error::other("child stderr was not captured"));
    };

    let max_bytes = opts.max_bytes;
    let stdout_handle = thread::spawn(move || read_bounded(stdout, max_bytes));
    let stderr_handle = thread::spawn(move || read_bounded(stderr, max_bytes));

    let start = Instant::now();
    let mut timed_out = false;

    let status = if let Some(timeout) = opts.timeout {
        let poll = Duration::from_millis(50);
        loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            if start.elapsed() >= timeout {
                timed_out = true;
                break terminate_process_tree(&mut child, opts.kill_grace)?;
            }

            thread::sleep(poll.min(timeout.saturating_sub(start.elapsed())));
        }
    } else {
        child.wait()?
    };

    let (stdout_bytes, stdout_truncated) = join_reader(stdout_handle, "stdout")??;
    let (stderr_bytes, stderr_truncated) = join_reader(stderr_handle, "stderr")??;

    Ok(CommandResult {
        status,
        output: BoundedOutput {
            stdout: stdout_bytes,
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            truncated: stdout_truncated || stderr_truncated,
        },
        timed_out,
    })
}

fn terminate_process_tree(
    child: &mut std::process::Child,
    grace: Duration,
) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        let pid = child.id() as i32;
        // Negative pid targets the process group, which we set to the child's
        // pid via `setpgid(0, 0)` in `pre_exec`.
        unsafe {
            let _ = libc::kill(-pid, libc::SIGTERM);
        }

        let start = Instant::now();
        while start.elapsed() < grace {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(Duration::from_millis(25));
        }

        unsafe {
            let _ = libc::kill(-pid, libc::SIGKILL);
        }
        child.wait()
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        let _ = child.kill();
        child.wait()
    }
}

fn join_reader(
    handle: thread::JoinHandle<io::Result<(Vec<u8>, bool)>>,
    stream: &'static str,
) -> io::Result<io::Result<(Vec<u8>, bool)>> {
    handle
        .join()
        .map_err(|_| io::Error::other(format!("{stream} reader thread panicked")))
}

fn read_bounded(mut reader: impl Read, max_bytes: usize) -> io::Result<(Vec<u8>, bool)> {
    let mut out = Vec::new();
    let mut truncated = false;
    let mut buf = [0u8; 8 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }

        if out.len() < max_bytes {
            let remaining = max_bytes - out.len();
            let to_store = remaining.min(n);
            out.extend_from_slice(&buf[..to_store]);
            if to_store < n {
                truncated = true;
            }
        } else {
            truncated = true;
        }
    }

    Ok((out, truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> (PathBuf, Vec<String>) {
        (
            PathBuf::from("sh"),
            vec!["-c".to_string(), script.to_string()],
        )
    }

    #[test]
    fn captures_both_streams_to_eof() {
        let dir = tempfile::tempdir().unwrap();
        let (program, args) = sh("printf out; printf warn >&2");
        let result = run_command(dir.path(), &program, &args, RunOptions::default()).unwrap();

        assert!(result.status.success());
        assert_eq!(result.output.stdout, b"out");
        assert_eq!(result.output.stderr, "warn");
        assert!(!result.output.truncated);
    }

    #[test]
    fn reports_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let (program, args) = sh("exit 8");
        let result = run_command(dir.path(), &program, &args, RunOptions::default()).unwrap();

        assert_eq!(result.exit_code(), Some(8));
        assert!(!result.timed_out);
    }

    #[test]
    fn truncates_output_beyond_the_byte_budget() {
        let dir = tempfile::tempdir().unwrap();
        let (program, args) = sh("head -c 4096 /dev/zero");
        let opts = RunOptions {
            max_bytes: 1024,
            ..RunOptions::default()
        };
        let result = run_command(dir.path(), &program, &args, opts).unwrap();

        assert_eq!(result.output.stdout.len(), 1024);
        assert!(result.output.truncated);
    }

    #[test]
    fn kills_the_process_tree_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let (program, args) = sh("sleep 30");
        let opts = RunOptions {
            timeout: Some(Duration::from_millis(100)),
            ..RunOptions::default()
        };
        let result = run_command(dir.path(), &program, &args, opts).unwrap();

        assert!(result.timed_out);
        assert!(!result.status.success());
    }

    #[test]
    fn command_spec_display_quotes_spaced_args() {
        let spec = CommandSpec::new(
            Path::new("/tmp"),
            Path::new("bazel"),
            &["query".to_string(), "kind(rule, //...)".to_string()],
        );
        assert_eq!(spec.to_string(), "bazel query \"kind(rule, //...)\"");
    }
}
