//! Outermost-tag extraction. A linear scan rather than a greedy regex, so
//! HTML wrapping the reply (e.g. a chat UI re-rendering `<br>` or bolding
//! part of the tag) doesn't make a naive `.*` swallow past the real
//! closing tag.

/// Finds the first `<tag>...</tag>` span in `text` by scanning for the
/// opening tag, then the first matching closing tag after it — no nested
/// same-name tags are expected in this wire format, so "first close after
/// open" is the outermost span.
///
/// Returns the inner body, with a single wrapping HTML comment (`<!-- ...
/// -->`) unwrapped if present.
pub fn extract_tag(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let open_idx = find_case_insensitive(text, &open)?;
    let body_start = open_idx + open.len();
    let close_idx = find_case_insensitive(&text[body_start..], &close)? + body_start;

    let body = &text[body_start..close_idx];
    Some(unwrap_html_comment(body))
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let haystack_lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    haystack_lower.find(&needle_lower)
}

/// If the trimmed body is wrapped in a single `<!-- ... -->` comment,
/// returns the comment's inner text; otherwise returns the body unchanged.
fn unwrap_html_comment(body: &str) -> String {
    let trimmed = body.trim();
    if let Some(inner) = trimmed.strip_prefix("<!--").and_then(|s| s.strip_suffix("-->")) {
        inner.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_body() {
        let text = "before <infobar_data>add p(1 {\"1\",\"v\"})</infobar_data> after";
        assert_eq!(extract_tag(text, "infobar_data").unwrap(), "add p(1 {\"1\",\"v\"})");
    }

    #[test]
    fn unwraps_single_html_comment_body() {
        let text = "<infobar_data><!--\nadd p(1 {\"1\",\"v\"})\n--></infobar_data>";
        assert_eq!(extract_tag(text, "infobar_data").unwrap(), "add p(1 {\"1\",\"v\"})");
    }

    #[test]
    fn missing_tag_returns_none() {
        assert!(extract_tag("no tags here", "infobar_data").is_none());
    }

    #[test]
    fn tolerates_html_wrapping_between_tags_and_content() {
        let text = "<aiThinkProcess><b>1. update-strategy</b></aiThinkProcess>";
        let body = extract_tag(text, "aiThinkProcess").unwrap();
        assert_eq!(body, "<b>1. update-strategy</b>");
    }

    #[test]
    fn commented_and_uncommented_bodies_extract_identically() {
        let commented = extract_tag("<infobar_data><!--add p(1 {\"1\",\"v\"})--></infobar_data>", "infobar_data").unwrap();
        let plain = extract_tag("<infobar_data>add p(1 {\"1\",\"v\"})</infobar_data>", "infobar_data").unwrap();
        assert_eq!(commented, plain);
    }
}
