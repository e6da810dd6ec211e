//! Interpretation of free-form model replies as commit messages.
//!
//! Strategies are tried in order and the first that yields a non-blank
//! summary wins:
//!
//! 1. Structured: a JSON object, bare, fenced, or embedded in prose
//! 2. Labeled: `Summary:` / `Description:` lines
//! 3. Bare: first line is the summary, the rest is the description
//! 4. Last resort: a truncated copy of the reply with a placeholder description
//!
//! Parsing never fails. Whatever strategy wins, the description is passed
//! through [`sanitize_description`].

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::commit::message::{CommitMessage, PLACEHOLDER_DESCRIPTION, SUMMARY_SOFT_LIMIT};
use crate::commit::sanitize::sanitize_description;
use crate::llm::json::{find_json_object, parse_object, strip_code_fence};

/// Summary used when the reply contains nothing usable.
pub const FALLBACK_SUMMARY: &str = "Update project";

const SUMMARY_KEYS: &[&str] = &["summary", "subject", "title"];
const DESCRIPTION_KEYS: &[&str] = &["description", "body"];

/// Which strategy produced a parsed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Structured,
    Labeled,
    Bare,
    /// Nothing recognizable; the message is a best-effort fallback.
    LastResort,
}

impl ParseStrategy {
    pub fn is_degraded(self) -> bool {
        self == ParseStrategy::LastResort
    }
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStrategy::Structured => write!(f, "structured"),
            ParseStrategy::Labeled => write!(f, "labeled"),
            ParseStrategy::Bare => write!(f, "bare"),
            ParseStrategy::LastResort => write!(f, "last-resort"),
        }
    }
}

/// A parsed reply together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub message: CommitMessage,
    pub strategy: ParseStrategy,
}

/// Parse a raw model reply into a commit message.
pub fn parse_commit_message(raw: &str) -> CommitMessage {
    parse_reply(raw).message
}

/// Parse a raw model reply, reporting which strategy succeeded.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let without_nul: String = raw.chars().filter(|&c| c != '\0').collect();
    let cleaned = strip_code_fence(&without_nul);

    let (strategy, summary, candidate) = if let Some((s, d)) = parse_structured(cleaned) {
        (ParseStrategy::Structured, s, d)
    } else if let Some((s, d)) = parse_labeled(cleaned) {
        (ParseStrategy::Labeled, s, d)
    } else if let Some((s, d)) = parse_bare(cleaned) {
        (ParseStrategy::Bare, s, d)
    } else {
        let (s, d) = last_resort(cleaned);
        (ParseStrategy::LastResort, s, d)
    };

    if strategy.is_degraded() {
        warn!(
            reply_chars = raw.chars().count(),
            "model reply had no recognizable commit message, using fallback"
        );
    } else {
        debug!(%strategy, "parsed model reply");
    }

    ParsedReply {
        message: CommitMessage::new(summary, sanitize_description(&candidate)),
        strategy,
    }
}

/// Remove markdown decoration from a summary and keep its first line.
fn clean_summary(text: &str) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    line.trim_start_matches('#')
        .trim()
        .trim_matches(|c| matches!(c, '*' | '_' | '`'))
        .trim()
        .to_string()
}

fn parse_structured(text: &str) -> Option<(String, String)> {
    let direct = if text.starts_with('{') {
        parse_object(text).filter(has_summary)
    } else {
        None
    };
    let map = direct.or_else(|| find_json_object(text, has_summary))?;

    let summary = clean_summary(summary_field(&map)?);
    if summary.is_empty() {
        return None;
    }

    Some((summary, description_field(&map)))
}

fn has_summary(map: &Map<String, Value>) -> bool {
    summary_field(map).is_some()
}

fn summary_field(map: &Map<String, Value>) -> Option<&str> {
    SUMMARY_KEYS.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    })
}

/// Read the description as a string, or join an array as `- item` lines.
fn description_field(map: &Map<String, Value>) -> String {
    let value = DESCRIPTION_KEYS.iter().find_map(|key| map.get(*key));

    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .map(|s| {
                let item = s.strip_prefix("- ").unwrap_or(s.as_str());
                format!("- {item}")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Match `label:` at the start of a line, tolerating markdown decoration
/// such as `**Summary:**` or `## Summary`. Returns the remainder.
fn label_remainder<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let stripped = line.trim_start().trim_start_matches(['*', '#', ' ', '\t']);
    let head = stripped.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }

    let rest = stripped[label.len()..].trim_start_matches(['*', '_']);
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim_start_matches(['*', '_']).trim())
}

fn parse_labeled(text: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = text.lines().collect();

    let summary_label = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| label_remainder(line, "summary").map(|r| (i, r)));

    let description_from = summary_label.map_or(0, |(i, _)| i + 1);
    let description_label = lines
        .iter()
        .enumerate()
        .skip(description_from)
        .find_map(|(i, line)| label_remainder(line, "description").map(|r| (i, r)));

    let (summary, body_start) = match summary_label {
        Some((summary_idx, remainder)) => {
            let summary = clean_summary(remainder);
            if summary.is_empty() {
                // Summary text on the line after the label
                let search_end = description_label.map_or(lines.len(), |(i, _)| i);
                first_summary_line(&lines, summary_idx + 1, search_end)?
            } else {
                (summary, summary_idx + 1)
            }
        }
        // Unlabeled summary line ahead of a `Description:` label
        None => {
            let (description_idx, _) = description_label?;
            first_summary_line(&lines, 0, description_idx)?
        }
    };

    let description = match description_label {
        Some((idx, inline)) => {
            let mut parts: Vec<&str> = Vec::new();
            if !inline.is_empty() {
                parts.push(inline);
            }
            parts.extend(&lines[idx + 1..]);
            parts.join("\n").trim().to_string()
        }
        None => lines[body_start..].join("\n").trim().to_string(),
    };

    Some((summary, description))
}

/// First non-blank line in `lines[start..end]` as a cleaned summary, with the
/// index just past it.
fn first_summary_line(lines: &[&str], start: usize, end: usize) -> Option<(String, usize)> {
    let (offset, line) = lines[start..end]
        .iter()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty())?;

    let summary = clean_summary(line);
    if summary.is_empty() {
        None
    } else {
        Some((summary, start + offset + 1))
    }
}

/// Whether a line holds nothing but a `Summary:` or `Description:` label.
fn is_bare_label(line: &str) -> bool {
    ["summary", "description"]
        .iter()
        .any(|label| label_remainder(line, label).is_some_and(str::is_empty))
}

fn parse_bare(text: &str) -> Option<(String, String)> {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !is_bare_label(line));

    let summary = clean_summary(lines.next()?);
    if summary.is_empty() {
        return None;
    }

    let description = lines.map(str::trim_end).collect::<Vec<_>>().join("\n");
    Some((summary, description))
}

fn last_resort(text: &str) -> (String, String) {
    let content = text
        .lines()
        .filter(|line| !is_bare_label(line))
        .collect::<Vec<_>>()
        .join("\n");
    let truncated: String = content.chars().take(SUMMARY_SOFT_LIMIT).collect();
    let summary = truncated.split_whitespace().collect::<Vec<_>>().join(" ");

    let summary = if summary.is_empty() {
        FALLBACK_SUMMARY.to_string()
    } else {
        summary
    };

    (summary, PLACEHOLDER_DESCRIPTION.to_string())
}
