use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([.,])").expect("valid regex"));
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("valid regex"));

/// Tidy raw OCR output
///
/// Collapses runs of spaces, folds blank lines away, pulls stray spaces
/// off the front of periods and commas, and trims the result.
pub fn clean_text(raw: &str) -> String {
    let text = REPEATED_SPACES.replace_all(raw, " ");
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = text.trim();

    preserve_list_items(text)
}

/// List items (`- x`, `• x`, `1. x`, `2) x`) are recognised but kept
/// verbatim; no reformatting of bullets or numbering is applied.
fn preserve_list_items(text: &str) -> String {
    let list_items = text.lines().filter(|line| is_list_item(line)).count();
    if list_items > 0 {
        tracing::trace!(list_items, "list items left untouched");
    }
    text.to_string()
}

fn is_list_item(line: &str) -> bool {
    LIST_MARKER.is_match(line)
}

/// Join recognized lines the way the basic pipeline reports them.
pub fn join_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines.into_iter().collect::<Vec<_>>().join("\n").trim().to_string()
}
