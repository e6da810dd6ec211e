//! Removal of diff content that models echo back into descriptions.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::commit::message::PLACEHOLDER_DESCRIPTION;

/// Line prefixes that mark the start of an echoed diff.
const DIFF_HEADER_PREFIXES: &[&str] = &["diff --git", "index ", "@@", "--- ", "+++ "];

/// A single added or removed line. A marker followed by whitespace is a bullet.
static DIFF_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-][^+\-\s]").expect("Invalid regex"));

/// Prompt section heading that models sometimes repeat before the diff.
const STAGED_DIFF_HEADING: &str = "staged git diff:";

/// Whether a line (leading whitespace ignored) starts an echoed diff.
pub fn is_diff_header(line: &str) -> bool {
    let line = line.trim_start();
    DIFF_HEADER_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
        || line
            .get(..STAGED_DIFF_HEADING.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(STAGED_DIFF_HEADING))
}

/// Whether a line (leading whitespace ignored) looks like a diff body line.
pub fn is_diff_line(line: &str) -> bool {
    DIFF_LINE.is_match(line.trim_start())
}

/// Strip diff syntax from a candidate description.
///
/// Everything from the first diff header onwards is discarded. A `+foo` or
/// `-foo` line does not cut the description: it is dropped on its own and
/// the lines after it are kept, as are code fences removed line by line.
/// Never returns an empty string.
pub fn sanitize_description(candidate: &str) -> String {
    let kept: Vec<&str> = candidate
        .lines()
        .take_while(|line| !is_diff_header(line))
        .filter(|line| !is_diff_line(line))
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    let cleaned = kept.join("\n");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        PLACEHOLDER_DESCRIPTION.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_plain_bullets() {
        let input = "- fixed null check\n- added test";
        assert_eq!(sanitize_description(input), input);
    }

    #[test]
    fn test_truncates_at_diff_header() {
        let input = "- valid bullet\ndiff --git a/x b/x\n- after the diff";
        assert_eq!(sanitize_description(input), "- valid bullet");
    }

    #[test]
    fn test_truncates_at_each_header_kind() {
        for header in ["index 83db48f..bf269f4 100644", "@@ -1,3 +1,4 @@", "--- a/x", "+++ b/x"] {
            let input = format!("- keep\n  {header}\n- drop");
            assert_eq!(sanitize_description(&input), "- keep", "header: {header}");
        }
    }

    #[test]
    fn test_truncates_at_echoed_prompt_heading() {
        let input = "- add parser\nStaged git diff:\nsomething";
        assert_eq!(sanitize_description(input), "- add parser");
    }

    #[test]
    fn test_drops_individual_diff_lines() {
        let input = "- rename helper\n+let x = 1;\n-let y = 2;\n- update docs";
        assert_eq!(sanitize_description(input), "- rename helper\n- update docs");
    }

    #[test]
    fn test_plus_bullet_with_space_is_kept() {
        assert_eq!(sanitize_description("+ added retry"), "+ added retry");
    }

    #[test]
    fn test_drops_code_fences() {
        let input = "```\n- one\n```";
        assert_eq!(sanitize_description(input), "- one");
    }

    #[test]
    fn test_blank_becomes_placeholder() {
        assert_eq!(sanitize_description(""), PLACEHOLDER_DESCRIPTION);
        assert_eq!(sanitize_description("  \n\t"), PLACEHOLDER_DESCRIPTION);
        assert_eq!(
            sanitize_description("diff --git a/x b/x\n+new"),
            PLACEHOLDER_DESCRIPTION
        );
    }

    #[test]
    fn test_is_diff_line() {
        assert!(is_diff_line("+fn main() {}"));
        assert!(is_diff_line("  -removed"));
        assert!(!is_diff_line("- bullet"));
        assert!(!is_diff_line("---"));
        assert!(!is_diff_line("plain text"));
    }
}
