const FENCE: &str = "```";

/// Remove a leading ```` ``` ```` (optionally tagged `json`) and a trailing ```` ``` ````, then trim.
///
/// Fences in the middle of the text are left alone.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}
