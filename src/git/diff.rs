//! Staging and staged-diff retrieval.

use std::path::Path;

use tracing::{debug, info};

use crate::config::DEFAULT_EMPTY_DIFF_RETRIES;
use crate::error::GitError;
use crate::git::run_git;
use crate::process::ProcessRunner;

/// Diffs of this many characters or more are truncated.
pub const MAX_DIFF_CHARS: usize = 40_000;

/// Characters kept from the start of a truncated diff.
pub const HEAD_CHARS: usize = 25_000;

/// Characters kept from the end of a truncated diff.
pub const TAIL_CHARS: usize = 15_000;

/// Inserted between the head and tail of a truncated diff.
pub const TRUNCATION_MARKER: &str = "\n\n[Diff truncated for model input compatibility]\n\n";

const STAGE_ALL: &[&str] = &["add", "-A"];
const CACHED_DIFF: &[&str] = &["diff", "--cached", "--no-color"];

/// A staged diff prepared for the model prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPayload {
    content: String,
    truncated: bool,
}

impl DiffPayload {
    /// Remove NUL characters and bound the size of a raw diff.
    ///
    /// Diffs of [`MAX_DIFF_CHARS`] characters or more keep their first
    /// [`HEAD_CHARS`] and last [`TAIL_CHARS`] characters around
    /// [`TRUNCATION_MARKER`].
    pub fn from_raw(raw: &str) -> Self {
        let normalized: String = raw.chars().filter(|&c| c != '\0').collect();
        let char_count = normalized.chars().count();

        if char_count < MAX_DIFF_CHARS {
            return Self {
                content: normalized,
                truncated: false,
            };
        }

        let head: String = normalized.chars().take(HEAD_CHARS).collect();
        let tail: String = normalized.chars().skip(char_count - TAIL_CHARS).collect();

        let mut content = String::with_capacity(head.len() + TRUNCATION_MARKER.len() + tail.len());
        content.push_str(&head);
        content.push_str(TRUNCATION_MARKER);
        content.push_str(&tail);

        Self {
            content,
            truncated: true,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Result of the stage-then-diff protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingOutcome {
    Ready(DiffPayload),
    /// Nothing staged even after re-staging; not a failure.
    NoChanges,
}

/// Stage everything in `repo_path` and fetch the staged diff.
///
/// A blank diff triggers one re-stage-and-fetch cycle before reporting
/// [`StagingOutcome::NoChanges`].
pub async fn stage_and_fetch_diff<R: ProcessRunner + ?Sized>(
    runner: &R,
    repo_path: &Path,
) -> Result<StagingOutcome, GitError> {
    stage_and_fetch_diff_with_retries(runner, repo_path, DEFAULT_EMPTY_DIFF_RETRIES).await
}

/// Same as [`stage_and_fetch_diff`] with a configurable number of
/// re-stage-and-fetch cycles on a blank diff.
pub async fn stage_and_fetch_diff_with_retries<R: ProcessRunner + ?Sized>(
    runner: &R,
    repo_path: &Path,
    empty_retries: u32,
) -> Result<StagingOutcome, GitError> {
    let mut attempt = 0;

    loop {
        run_git(runner, repo_path, STAGE_ALL).await?;
        let diff = run_git(runner, repo_path, CACHED_DIFF).await?;

        if !diff.trim().is_empty() {
            let payload = DiffPayload::from_raw(&diff);
            info!(
                chars = payload.content().chars().count(),
                truncated = payload.is_truncated(),
                "staged diff ready"
            );
            return Ok(StagingOutcome::Ready(payload));
        }

        if attempt >= empty_retries {
            info!("no staged changes after {} attempt(s)", attempt + 1);
            return Ok(StagingOutcome::NoChanges);
        }

        attempt += 1;
        debug!("staged diff was blank, re-staging (retry {attempt}/{empty_retries})");
    }
}
