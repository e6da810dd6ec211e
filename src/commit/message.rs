//! The commit message value produced by generation and consumed by commit.

/// Recommended upper bound for the summary line. Not enforced.
pub const SUMMARY_SOFT_LIMIT: usize = 72;

/// Description used when the model gives nothing usable.
pub const PLACEHOLDER_DESCRIPTION: &str = "- Update implementation details.";

/// A two-part commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub summary: String,
    pub description: String,
}

impl CommitMessage {
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
        }
    }

    /// Whether the summary exceeds [`SUMMARY_SOFT_LIMIT`] characters.
    pub fn summary_too_long(&self) -> bool {
        self.summary.trim().chars().count() > SUMMARY_SOFT_LIMIT
    }

    /// Render the message the way git stores it.
    ///
    /// ```text
    /// Summary line
    ///
    /// - description bullet
    /// ```
    pub fn format(&self) -> String {
        let summary = self.summary.trim();
        let description = self.description.trim();

        if description.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n\n{description}")
        }
    }
}
