/*!
 * Output cleanup for raw model completions.
 *
 * Instruct models often answer inside a fenced block (```text ... ```) even
 * when told not to. `sanitize` unwraps that and never fails.
 */

use once_cell::sync::Lazy;
use regex::Regex;

const FENCE: &str = "```";

/// Whole-output fenced block with an optional language label and a possibly empty body
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[A-Za-z0-9_-]*[^\S\n]*\n(?:(?P<body>[\s\S]*?)\n)?```$")
        .expect("fenced block pattern is valid")
});

/// Strip markdown fence wrapping from a raw completion
///
/// - a fully fenced output yields its trimmed body;
/// - an opening fence without a closing one is dropped together with the rest of its line;
/// - anything else is returned trimmed.
///
/// Fence markers left at either end afterwards are removed until none remain.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut cleaned = match FENCED_BLOCK.captures(trimmed) {
        Some(captures) => captures.name("body").map_or("", |body| body.as_str().trim()),
        None => trimmed,
    };
    loop {
        let next = strip_trailing_fence(strip_leading_fence_line(cleaned));
        if next.len() == cleaned.len() {
            return next.to_string();
        }
        cleaned = next;
    }
}

/// Drop an opening fence together with the rest of its line
fn strip_leading_fence_line(text: &str) -> &str {
    if !text.starts_with(FENCE) {
        return text;
    }
    match text.split_once('\n') {
        Some((_, rest)) => rest.trim(),
        None => "",
    }
}

fn strip_trailing_fence(text: &str) -> &str {
    match text.strip_suffix(FENCE) {
        Some(rest) => rest.trim_end(),
        None => text,
    }
}
