//! Prompt construction for commit message generation.

use std::path::Path;

use crate::commit::message::SUMMARY_SOFT_LIMIT;
use crate::git::DiffPayload;
use crate::llm::ChatMessage;

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You write concise, high-quality git commit messages.";

/// The system and user messages for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPrompt {
    pub system: String,
    pub user: String,
}

impl CommitPrompt {
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Build the prompt for a staged diff.
///
/// Pure string construction. `user_context` is appended verbatim (trimmed)
/// under its own heading when it is not blank.
pub fn compose_prompt(
    project_name: &str,
    project_path: &Path,
    diff: &DiffPayload,
    user_context: Option<&str>,
) -> CommitPrompt {
    let truncation_note = if diff.is_truncated() {
        "\n\nNote: the diff was truncated because of its size. The middle part is omitted; \
         describe the visible changes."
    } else {
        ""
    };

    let mut user = format!(
        r#"Project name: {project_name}
Project path: {project_path}

Generate commit message output in this exact format:
Summary: <single line summary <= {SUMMARY_SOFT_LIMIT} chars>
Description:
<bullet list describing key changes and rationale>
Do NOT include raw diff lines, file hunks, or code blocks in the description.

Staged git diff:
{diff}{truncation_note}"#,
        project_path = project_path.display(),
        diff = diff.content(),
    );

    if let Some(context) = user_context.map(str::trim).filter(|c| !c.is_empty()) {
        user.push_str("\n\nAdditional user context:\n");
        user.push_str(context);
    }

    CommitPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
