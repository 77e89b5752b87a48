use super::text::{collapse_whitespace, is_blank_cell, is_parenthetical};
use crate::rules::ReconstructionRules;

/// Shape of a college-name cell. `text` is always whitespace-collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellClass {
    Full(String),
    Suffix(String),
    Fragment(String),
    Placeholder(String),
    Empty,
}

/// Classifies one college-name cell.
///
/// Known full names win over every table lookup, then shape (a lone
/// parenthetical is a suffix), then the fragment and placeholder tables.
/// Anything else that is not blank is taken as a full name.
pub fn classify(cell: &str, rules: &ReconstructionRules) -> CellClass {
    if is_blank_cell(cell) {
        return CellClass::Empty;
    }

    let text = collapse_whitespace(cell);

    if rules.is_known_full_name(&text) {
        return CellClass::Full(text);
    }

    if is_parenthetical(&text) {
        let suffix = rules
            .canonical_suffix(&text)
            .map(str::to_string)
            .unwrap_or(text);
        return CellClass::Suffix(suffix);
    }

    if rules.fragment_rules(&text).is_some() {
        return CellClass::Fragment(text);
    }

    if rules.placeholder(&text).is_some() {
        return CellClass::Placeholder(text);
    }

    CellClass::Full(text)
}
