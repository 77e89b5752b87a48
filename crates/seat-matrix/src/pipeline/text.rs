use regex::Regex;
use std::sync::OnceLock;

static PARENTHETICAL: OnceLock<Regex> = OnceLock::new();

/// Matches one `( ... )` group without nesting.
pub(crate) fn parenthetical() -> &'static Regex {
    PARENTHETICAL.get_or_init(|| Regex::new(r"\([^()]*\)").expect("static pattern compiles"))
}

/// Collapses whitespace runs to single spaces and trims the edges. Byte-order
/// marks and zero-width spaces left behind by the extractor are dropped.
pub(crate) fn collapse_whitespace(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key: collapsed whitespace, lowercase.
pub(crate) fn normalize_key(value: &str) -> String {
    collapse_whitespace(value).to_lowercase()
}

/// Blank cells and the placeholders dataframe exports leave in empty cells.
pub(crate) fn is_blank_cell(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("null")
}

/// True when the whole value is a single parenthetical token such as `(W)`.
pub(crate) fn is_parenthetical(value: &str) -> bool {
    let trimmed = value.trim();
    parenthetical()
        .find(trimmed)
        .map(|found| found.start() == 0 && found.end() == trimmed.len() && found.len() > 2)
        .unwrap_or(false)
}
