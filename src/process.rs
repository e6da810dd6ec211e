//! External command execution.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ProcessError;

/// Combined output and exit status of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Stdout followed by stderr.
    pub output: String,
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running external commands.
///
/// This abstraction allows substituting the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program args...` in `working_dir` and wait for it to exit.
    ///
    /// A non-zero exit is not an error here; only spawn failures and
    /// deadline overruns are.
    async fn run(
        &self,
        working_dir: &Path,
        program: &str,
        args: &[String],
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Runner that spawns real processes with a per-command deadline.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(
        &self,
        working_dir: &Path,
        program: &str,
        args: &[String],
    ) -> Result<ProcessOutput, ProcessError> {
        let command = render_command(program, args);
        debug!(command = %command, dir = %working_dir.display(), "running command");

        let output = timeout(
            self.timeout,
            Command::new(program)
                .args(args)
                .current_dir(working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ProcessError::Timeout {
            command: command.clone(),
            timeout: self.timeout,
        })?
        .map_err(|source| ProcessError::SpawnFailed {
            command: command.clone(),
            source,
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        let combined = combine_output(&output.stdout, &output.stderr);
        debug!(command = %command, exit_code, bytes = combined.len(), "command finished");

        Ok(ProcessOutput {
            output: combined,
            exit_code,
        })
    }
}

/// Render a command line for logs and error messages.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Join stdout and stderr, decoding lossily.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }
    combined
}
