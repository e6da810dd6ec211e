//! Commit message prompting, parsing and sanitizing.

pub mod message;
pub mod parser;
pub mod prompt;
pub mod sanitize;

pub use message::{CommitMessage, PLACEHOLDER_DESCRIPTION, SUMMARY_SOFT_LIMIT};
pub use parser::{ParseStrategy, ParsedReply, parse_commit_message, parse_reply};
pub use prompt::{CommitPrompt, SYSTEM_PROMPT, compose_prompt};
pub use sanitize::sanitize_description;
