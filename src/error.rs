//! Error types for commit-assist modules using thiserror.

use std::time::Duration;

use thiserror::Error;

/// Errors from spawning an external command.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Errors from git staging, diff and commit operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found. Install git and make sure it is on your PATH")]
    NotInstalled,

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Command failed: {command} (exit {exit_code})\n{output}")]
    CommandFailure {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Commit summary is required.")]
    EmptySummary,

    #[error("Not a git repository: {path}: {source}")]
    NotARepository {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Repository at {0} has no working tree")]
    BareRepository(String),
}

/// Errors from the chat-completion endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Could not reach the model endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Model request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model endpoint returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Could not read the model response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by a single assistant operation.
///
/// The `Display` output is the status line shown to the user.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Another operation is still running. Wait for it to finish.")]
    Busy,

    #[error("Git staging failed: {0}")]
    Staging(#[source] GitError),

    #[error("Generation failed: {0}")]
    Generation(#[source] LlmError),

    #[error("Commit failed: {0}")]
    Commit(#[source] GitError),

    #[error("Push failed: {0}")]
    Push(#[source] GitError),

    #[error("Connection failed: {0}")]
    Connection(#[source] LlmError),
}
