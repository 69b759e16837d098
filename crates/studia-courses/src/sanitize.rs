//! Best-effort HTML cleanup for assignment instructions.
//!
//! Upstream sends rich-text descriptions; downstream consumers want plain
//! text. This is regex-class tag removal, not a full parser, and it never
//! fails on malformed markup.

use once_cell::sync::Lazy;
use regex::Regex;

// Patterns are literals; compilation cannot fail.
#[allow(clippy::expect_used)]
static STYLE_SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style[^>]*>.*?</style>|<script[^>]*>.*?</script>")
        .expect("literal pattern")
});

#[allow(clippy::expect_used)]
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("literal pattern"));

#[allow(clippy::expect_used)]
static LI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li>").expect("literal pattern"));

#[allow(clippy::expect_used)]
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("literal pattern"));

/// Strip markup from `text`, keeping the readable content.
///
/// `<style>`/`<script>` blocks are removed with their content, `<br>`
/// becomes a newline, `<li>` becomes a dashed list entry, all remaining
/// tags are dropped, HTML entities are decoded, and the result is trimmed.
pub fn clean_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = STYLE_SCRIPT_RE.replace_all(text, "");
    let cleaned = BR_RE.replace_all(&cleaned, "\n");
    let cleaned = LI_RE.replace_all(&cleaned, "\n- ");
    let cleaned = TAG_RE.replace_all(&cleaned, "");

    html_escape::decode_html_entities(cleaned.as_ref())
        .trim()
        .to_string()
}
