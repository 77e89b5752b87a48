use serde::{Deserialize, Serialize};

/// Recoverable data-quality finding. The pipeline applied a documented
/// fallback and kept going; the row is listed for human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityWarning {
    pub row_index: Option<usize>,
    pub raw: Vec<String>,
    #[serde(flatten)]
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    UnresolvedFragment {
        fragment: String,
    },
    UnresolvedPlaceholder {
        placeholder: String,
        program: String,
    },
    InferredPlaceholder {
        placeholder: String,
        keyword: String,
        college: String,
    },
    AmbiguousPlaceholder {
        placeholder: String,
        keyword: String,
        college: String,
        alternatives: Vec<String>,
    },
    SuffixWithoutCursor {
        suffix: String,
    },
    EmptyWithoutCursor,
    NegativeSeatValue {
        category: String,
        value: String,
    },
    InvalidSeatValue {
        category: String,
        value: String,
    },
    SerialCollision {
        serial: u32,
        replaced_row: usize,
    },
    CandidateCountMismatch {
        expected: usize,
        found: usize,
    },
}

impl WarningKind {
    /// Warnings that leave a record without a trustworthy college name.
    pub fn is_unresolved_name(&self) -> bool {
        matches!(
            self,
            WarningKind::UnresolvedFragment { .. }
                | WarningKind::UnresolvedPlaceholder { .. }
                | WarningKind::SuffixWithoutCursor { .. }
                | WarningKind::EmptyWithoutCursor
        )
    }

    pub fn summary(&self) -> String {
        match self {
            WarningKind::UnresolvedFragment { fragment } => {
                format!("fragment '{fragment}' has no mapping and no preceding college")
            }
            WarningKind::UnresolvedPlaceholder {
                placeholder,
                program,
            } => format!("placeholder '{placeholder}' matched no keyword in program '{program}'"),
            WarningKind::InferredPlaceholder {
                placeholder,
                keyword,
                college,
            } => format!("placeholder '{placeholder}' assigned to '{college}' via keyword '{keyword}'"),
            WarningKind::AmbiguousPlaceholder {
                placeholder,
                keyword,
                college,
                alternatives,
            } => format!(
                "placeholder '{placeholder}' assigned to '{college}' via keyword '{keyword}', also matched {}",
                alternatives.join(", ")
            ),
            WarningKind::SuffixWithoutCursor { suffix } => {
                format!("suffix '{suffix}' appears before any college name")
            }
            WarningKind::EmptyWithoutCursor => {
                "empty college cell appears before any college name".to_string()
            }
            WarningKind::NegativeSeatValue { category, value } => {
                format!("negative seat count '{value}' in {category} coerced to 0")
            }
            WarningKind::InvalidSeatValue { category, value } => {
                format!("non-numeric seat count '{value}' in {category} coerced to 0")
            }
            WarningKind::SerialCollision {
                serial,
                replaced_row,
            } => format!("serial number {serial} repeats; replaced the record from row {replaced_row}"),
            WarningKind::CandidateCountMismatch { expected, found } => {
                format!("expected {expected} records but found {found} valid serial numbers")
            }
        }
    }
}

impl QualityWarning {
    pub(crate) fn for_row(row_index: usize, raw: &[String], kind: WarningKind) -> Self {
        Self {
            row_index: Some(row_index),
            raw: raw.to_vec(),
            kind,
        }
    }

    pub(crate) fn for_run(kind: WarningKind) -> Self {
        Self {
            row_index: None,
            raw: Vec::new(),
            kind,
        }
    }

    pub fn summary(&self) -> String {
        match self.row_index {
            Some(index) => format!("row {index}: {}", self.kind.summary()),
            None => self.kind.summary(),
        }
    }
}

/// A row whose shape does not match the column schema. Excluded from output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralError {
    pub row_index: usize,
    pub expected_cells: usize,
    pub found_cells: usize,
    pub raw: Vec<String>,
}

impl StructuralError {
    pub fn summary(&self) -> String {
        format!(
            "row {}: expected {} cells, found {}",
            self.row_index, self.expected_cells, self.found_cells
        )
    }
}
