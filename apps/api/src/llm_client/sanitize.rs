//! Response Sanitizer: recovers the payload from a chat reply that may be
//! wrapped in markdown code fences or surrounded by prose.
//!
//! The stripping functions are pure and total: they always return a slice of the input,
//! which downstream parsing may still reject.

const FENCE: &str = "```";

fn is_fence_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')
}

/// Strips ```` ```lang ```` / ```` ``` ```` wrappers from the start and end of `raw`.
///
/// Repeats until neither end carries a fence, so the result is a fixed point.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        if let Some(rest) = text.strip_prefix(FENCE) {
            text = rest.trim_start_matches(is_fence_tag_char).trim_start();
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim_end();
        }
        if text.len() == before {
            return text;
        }
    }
}

/// Strips code fences, then narrows to the span between the first `{` and the
/// last `}` when both exist in that order.
pub fn sanitize(raw: &str) -> &str {
    let text = strip_code_fences(raw);
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// First `max_chars` characters of `text`, for diagnostics and previews.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
