//! JSON extraction from model replies.
//!
//! Models often wrap JSON in markdown code fences or surround it with
//! conversational text. These helpers find JSON objects in such replies,
//! handling nested braces and string escaping correctly.

use serde_json::{Map, Value};

/// Upper bound on `{` positions tried when scanning prose for an object.
const MAX_CANDIDATES: usize = 64;

/// Strip a leading code fence line (with optional language tag) and a
/// trailing fence line.
///
/// A fence on a single line (`` ```json{...}``` ``) is unwrapped in place.
/// Text without a leading fence is returned trimmed but otherwise unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_fence) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => return strip_inline_fence(after_fence),
    };

    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Unwrap the remainder of a one-line fence. A language tag is only dropped
/// when JSON follows it, so inline code such as `` ```Fix bug``` `` keeps
/// its first word.
fn strip_inline_fence(after_fence: &str) -> &str {
    let inner = after_fence.trim_end();
    let inner = inner.strip_suffix("```").unwrap_or(inner);

    let tag_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    let rest = inner[tag_len..].trim_start();
    if rest.starts_with(['{', '[']) {
        rest.trim_end()
    } else {
        inner.trim()
    }
}

/// Parse `text` as a single JSON object.
pub fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Find the first JSON object embedded in `text` that satisfies `accept`.
///
/// Iterates through `{` positions in order. For each one, first tries a
/// streaming `serde_json` parse (which tolerates trailing text), then falls
/// back to balanced-brace extraction with string-escape awareness. Nested
/// objects are candidates too, so an acceptable object inside an unrelated
/// wrapper is still found.
pub fn find_json_object<F>(text: &str, accept: F) -> Option<Map<String, Value>>
where
    F: Fn(&Map<String, Value>) -> bool,
{
    for (start_idx, _) in text.match_indices('{').take(MAX_CANDIDATES) {
        let candidate = &text[start_idx..];

        // Fast path: the object is followed by arbitrary text
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next()
            && accept(&map)
        {
            return Some(map);
        }

        // Slow path: balanced-brace extraction then validation
        if let Some(map) = extract_balanced_braces(candidate).and_then(parse_object)
            && accept(&map)
        {
            return Some(map);
        }
    }

    None
}

/// Extract a substring with balanced braces starting from the first `{`.
///
/// Tracks brace depth while respecting JSON string literals (including
/// escaped characters), so `{"msg": "use { and } carefully"}` is handled
/// correctly.
fn extract_balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
