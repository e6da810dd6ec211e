//! Single-flight orchestration of generate, commit, push and connection checks.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::commit::{CommitMessage, ParseStrategy, compose_prompt, parse_reply};
use crate::config::DEFAULT_EMPTY_DIFF_RETRIES;
use crate::error::SessionError;
use crate::git::{self, Project, StagedFile, StagingOutcome};
use crate::llm::LlmGateway;
use crate::process::ProcessRunner;

/// A message produced from the staged diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
    pub message: CommitMessage,
    pub strategy: ParseStrategy,
    pub diff_truncated: bool,
}

/// Outcome of a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Generated(GeneratedMessage),
    /// Nothing to describe; the working tree matches HEAD.
    NoChanges,
}

impl Generation {
    /// Status line shown to the user.
    pub fn status_line(&self) -> &'static str {
        match self {
            Generation::Generated(generated) if generated.strategy.is_degraded() => {
                "Commit message generated from staged changes, but the model reply was not in the expected format. Review it before committing."
            }
            Generation::Generated(_) => "Commit message generated from staged changes.",
            Generation::NoChanges => "No staged changes found after git add -A.",
        }
    }
}

/// Status line after a successful commit: the first line of git's output.
pub fn commit_status_line(output: &str) -> String {
    let first = output.lines().next().unwrap_or("").trim();
    format!("Commit created. {first}").trim_end().to_string()
}

/// Drives the commit workflow for one user, one operation at a time.
///
/// Every operation claims the in-flight flag; a call made while another is
/// outstanding fails with [`SessionError::Busy`] without touching git or the
/// model endpoint.
pub struct Assistant<R, L> {
    runner: R,
    gateway: L,
    empty_diff_retries: u32,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<R: ProcessRunner, L: LlmGateway> Assistant<R, L> {
    pub fn new(runner: R, gateway: L) -> Self {
        Self {
            runner,
            gateway,
            empty_diff_retries: DEFAULT_EMPTY_DIFF_RETRIES,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Number of re-stage cycles when the staged diff comes back blank.
    pub fn with_empty_diff_retries(mut self, retries: u32) -> Self {
        self.empty_diff_retries = retries;
        self
    }

    /// Whether an operation is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(InFlightGuard {
            flag: &self.in_flight,
        })
    }

    /// Stage everything, send the diff to the model and parse its reply.
    pub async fn generate(
        &self,
        project: &Project,
        user_context: Option<&str>,
    ) -> Result<Generation, SessionError> {
        let _guard = self.begin()?;

        info!(project = %project.name(), "staging changes and preparing diff");
        let outcome = git::stage_and_fetch_diff_with_retries(
            &self.runner,
            project.path(),
            self.empty_diff_retries,
        )
        .await
        .map_err(SessionError::Staging)?;

        let diff = match outcome {
            StagingOutcome::Ready(diff) => diff,
            StagingOutcome::NoChanges => return Ok(Generation::NoChanges),
        };

        info!("generating commit message from staged diff");
        let prompt = compose_prompt(project.name(), project.path(), &diff, user_context);
        let reply = self
            .gateway
            .complete(&prompt.to_messages())
            .await
            .map_err(SessionError::Generation)?;

        let parsed = parse_reply(&reply);
        Ok(Generation::Generated(GeneratedMessage {
            message: parsed.message,
            strategy: parsed.strategy,
            diff_truncated: diff.is_truncated(),
        }))
    }

    /// Stage everything and list what is staged.
    pub async fn staged_files(&self, project: &Project) -> Result<Vec<StagedFile>, SessionError> {
        let _guard = self.begin()?;

        git::run_git(&self.runner, project.path(), &["add", "-A"])
            .await
            .map_err(SessionError::Staging)?;
        git::staged_files(&self.runner, project)
            .await
            .map_err(SessionError::Staging)
    }

    /// Commit all changes with `message`. Returns git's output.
    pub async fn commit(
        &self,
        project: &Project,
        message: &CommitMessage,
    ) -> Result<String, SessionError> {
        let _guard = self.begin()?;

        git::commit_changes(
            &self.runner,
            project.path(),
            &message.summary,
            &message.description,
        )
        .await
        .map_err(SessionError::Commit)
    }

    /// Push the current branch. Returns git's output.
    pub async fn push(&self, project: &Project) -> Result<String, SessionError> {
        let _guard = self.begin()?;

        git::push(&self.runner, project.path())
            .await
            .map_err(SessionError::Push)
    }

    /// Check that the model endpoint answers.
    pub async fn test_connection(&self) -> Result<String, SessionError> {
        let _guard = self.begin()?;

        self.gateway
            .test_connection()
            .await
            .map_err(SessionError::Connection)
    }
}
