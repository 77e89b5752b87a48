use super::diagnostics::StructuralError;
use super::table::{ColumnSchema, RawRow};
use crate::rules::ReconstructionRules;
use tracing::{debug, warn};

/// A raw row carrying a genuine serial number, kept with its original index
/// so later stages can look at neighbouring rows.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRow<'a> {
    pub index: usize,
    pub serial: u32,
    pub row: &'a RawRow,
}

#[derive(Debug, Default)]
pub struct Validation<'a> {
    pub candidates: Vec<CandidateRow<'a>>,
    pub structural_errors: Vec<StructuralError>,
    pub header_repeats: usize,
    pub noise_rows: usize,
}

/// Serial numbers are plain positive integers. Signs, decimals and zero are
/// not accepted.
pub fn parse_serial(cell: &str) -> Option<u32> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|serial| *serial > 0)
}

/// Filters `rows` down to candidate records, preserving order and indices.
pub fn validate<'a>(
    rows: &'a [RawRow],
    schema: &ColumnSchema,
    rules: &ReconstructionRules,
) -> Validation<'a> {
    let mut validation = Validation::default();
    let arity = schema.arity();

    for (index, row) in rows.iter().enumerate() {
        let serial_cell = row.cell(ColumnSchema::SERIAL);

        let Some(serial) = parse_serial(serial_cell) else {
            if rules.is_header_sentinel(serial_cell) {
                validation.header_repeats += 1;
            } else {
                validation.noise_rows += 1;
            }
            continue;
        };

        let width = row.significant_len();
        if row.len() < arity || width > arity {
            warn!(row = index, expected = arity, found = row.len(), "row shape does not match schema");
            validation.structural_errors.push(StructuralError {
                row_index: index,
                expected_cells: arity,
                found_cells: if row.len() < arity { row.len() } else { width },
                raw: row.cells().to_vec(),
            });
            continue;
        }

        validation.candidates.push(CandidateRow { index, serial, row });
    }

    debug!(
        candidates = validation.candidates.len(),
        header_repeats = validation.header_repeats,
        noise_rows = validation.noise_rows,
        structural_errors = validation.structural_errors.len(),
        "row validation finished"
    );

    validation
}
