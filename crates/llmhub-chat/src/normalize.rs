//! Prose normalization for multimodal replies.
//!
//! Vision models sometimes answer with a fenced JSON list of detections
//! (`[{"label": "cat", "box_2d": [...]}, ...]`) when prose was expected.
//! Such replies are rewritten into a sentence naming the labels.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Group 1: a tag followed by JSON on the same line. Group 2: everything else,
// with an optional tag line.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)\A```(?:[A-Za-z0-9_+-]+[ \t]+([\[{].*?)|(?:[A-Za-z0-9_+-]*[ \t]*\r?\n)?(.*?))\r?\n?```\z",
    )
    .expect("valid fence regex")
});

/// Strip one surrounding code-fence wrapper, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
    {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Labels from a JSON list of objects that all carry a string `label`,
/// de-duplicated in first-seen order. `None` if the text is anything else.
pub fn extract_labels(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }

    let mut labels: Vec<String> = Vec::new();
    for item in items {
        let label = item.get("label")?.as_str()?.trim();
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

/// Normalize a multimodal reply into prose.
pub fn normalize_reply(text: &str) -> String {
    let body = strip_code_fence(text);
    match extract_labels(body) {
        Some(labels) => format!("I can see {}.", join_natural(&labels)),
        None => body.to_string(),
    }
}

/// `a`, `a and b`, `a, b and c`.
fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
