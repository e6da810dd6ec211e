//! commit-assist - Generate commit messages for staged changes with a local model.
//!
//! # Overview
//!
//! commit-assist stages a repository's working tree, sends the staged diff to
//! an OpenAI-compatible chat-completion endpoint, turns the free-form reply
//! into a summary and bullet-list description, and commits it after the user
//! confirms.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod process;
pub mod session;

// Re-export commonly used types
pub use commit::{CommitMessage, ParseStrategy, parse_commit_message};
pub use config::Settings;
pub use error::{GitError, LlmError, ProcessError, SessionError};
pub use git::{DiffPayload, Project, StagingOutcome};
pub use llm::{LlmGateway, OpenAiCompatClient};
pub use process::{ProcessRunner, SystemRunner};
pub use session::{Assistant, Generation};
