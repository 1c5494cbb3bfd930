use once_cell::sync::Lazy;
use regex::Regex;

// First quoted argument of a HYPERLINK formula; any label argument after the
// URL is ignored.
static HYPERLINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*=HYPERLINK\(\s*"([^"]+)""#).expect("hyperlink pattern"));

/// Maps one raw post-identifier cell to a canonical URL, if any.
///
/// Handles the three shapes a post cell shows up in: a `=HYPERLINK(...)`
/// formula, a plain URL, or a bare `www.` address. Anything else (including
/// malformed formulas) yields None; this never errors.
pub fn normalize_post_url(raw: &str) -> Option<String> {
    if let Some(caps) = HYPERLINK_RE.captures(raw) {
        return Some(caps[1].to_string());
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    if lower.starts_with("www.") {
        return Some(format!("https://{trimmed}"));
    }

    None
}
