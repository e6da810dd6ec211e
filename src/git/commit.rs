//! Committing staged changes and pushing.

use std::path::Path;

use tracing::info;

use crate::error::GitError;
use crate::git::run_git;
use crate::process::ProcessRunner;

/// Stage all changes and create a commit.
///
/// Re-stages with `git add -A` first so files edited between generation and
/// confirmation are included. The description, when not blank, is passed as
/// a second `-m` segment, which git separates from the summary with one
/// blank line.
///
/// Returns the combined output of `git commit`.
pub async fn commit_changes<R: ProcessRunner + ?Sized>(
    runner: &R,
    repo_path: &Path,
    summary: &str,
    description: &str,
) -> Result<String, GitError> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(GitError::EmptySummary);
    }

    run_git(runner, repo_path, &["add", "-A"]).await?;

    let mut args = vec!["commit", "-m", summary];
    let description = description.trim();
    if !description.is_empty() {
        args.extend(["-m", description]);
    }

    let output = run_git(runner, repo_path, &args).await?;
    info!(summary = %summary, "commit created");
    Ok(output)
}

/// Push the current branch to its configured upstream.
pub async fn push<R: ProcessRunner + ?Sized>(runner: &R, repo_path: &Path) -> Result<String, GitError> {
    let output = run_git(runner, repo_path, &["push"]).await?;
    info!("push completed");
    Ok(output)
}
