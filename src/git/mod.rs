//! Git operations: staging, staged diff retrieval, committing.
//!
//! Staging, diffing and committing shell out to the system `git` binary
//! through a [`ProcessRunner`], inheriting the user's git config, hooks and
//! credential store. Repository discovery uses git2.

pub mod commit;
pub mod diff;
pub mod repo;

use std::path::Path;

use crate::error::GitError;
use crate::process::{ProcessRunner, render_command};

pub use commit::{commit_changes, push};
pub use diff::{DiffPayload, StagingOutcome, stage_and_fetch_diff, stage_and_fetch_diff_with_retries};
pub use repo::{FileStatus, Project, StagedFile, staged_files};

const GIT: &str = "git";

/// Check that the git executable is on PATH.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which(GIT).map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Run a git command and return its combined output.
///
/// A non-zero exit becomes [`GitError::CommandFailure`] carrying the full
/// output for diagnostics.
pub(crate) async fn run_git<R: ProcessRunner + ?Sized>(
    runner: &R,
    repo_path: &Path,
    args: &[&str],
) -> Result<String, GitError> {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let output = runner.run(repo_path, GIT, &args).await?;

    if !output.is_success() {
        return Err(GitError::CommandFailure {
            command: render_command(GIT, &args),
            exit_code: output.exit_code,
            output: output.output,
        });
    }

    Ok(output.output)
}
