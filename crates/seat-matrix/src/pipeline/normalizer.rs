use super::diagnostics::{QualityWarning, WarningKind};
use super::record::{ReconstructedRecord, SeatCounts};
use super::resolver::ResolvedName;
use super::table::ColumnSchema;
use super::text::{collapse_whitespace, is_blank_cell, normalize_key, parenthetical};
use super::validator::CandidateRow;
use crate::rules::ReconstructionRules;
use std::collections::HashMap;
use tracing::warn;

/// Parsed form of one seat cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeatCell {
    Blank,
    Count(u32),
    Negative,
    Invalid,
}

/// Seat cells are counts. Blank cells and a lone dash mean zero; integral
/// decimals such as `12.0` are accepted as the extractor emits them.
pub(crate) fn parse_seat_cell(cell: &str) -> SeatCell {
    let trimmed = cell.trim();
    if is_blank_cell(trimmed) || matches!(trimmed, "-" | "--" | "\u{2013}" | "\u{2014}") {
        return SeatCell::Blank;
    }
    if let Ok(count) = trimmed.parse::<u32>() {
        return SeatCell::Count(count);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value < 0.0 => SeatCell::Negative,
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value <= f64::from(u32::MAX) => {
            SeatCell::Count(value as u32)
        }
        _ => SeatCell::Invalid,
    }
}

/// Final cleanup of resolved records: canonical text, integer seats and one
/// record per serial number.
pub struct Normalizer<'a> {
    rules: &'a ReconstructionRules,
    schema: &'a ColumnSchema,
}

impl<'a> Normalizer<'a> {
    pub fn new(rules: &'a ReconstructionRules, schema: &'a ColumnSchema) -> Self {
        Self { rules, schema }
    }

    /// Builds records from candidates and their resolved names. When a serial
    /// number repeats, the earlier record is dropped and the later one kept.
    pub fn normalize(
        &self,
        candidates: &[CandidateRow<'_>],
        names: Vec<ResolvedName>,
        warnings: &mut Vec<QualityWarning>,
    ) -> Vec<ReconstructedRecord> {
        let mut slots: Vec<Option<ReconstructedRecord>> = Vec::with_capacity(candidates.len());
        let mut by_serial: HashMap<u32, usize> = HashMap::with_capacity(candidates.len());

        for (candidate, resolved) in candidates.iter().zip(names) {
            let record = self.build(candidate, resolved, warnings);

            if let Some(previous) = by_serial.insert(candidate.serial, slots.len()) {
                if let Some(replaced) = slots[previous].take() {
                    warn!(
                        serial = candidate.serial,
                        row = candidate.index,
                        replaced_row = replaced.row_index,
                        "serial number collision"
                    );
                    warnings.push(QualityWarning::for_row(
                        candidate.index,
                        candidate.row.cells(),
                        WarningKind::SerialCollision {
                            serial: candidate.serial,
                            replaced_row: replaced.row_index,
                        },
                    ));
                }
            }
            slots.push(Some(record));
        }

        slots.into_iter().flatten().collect()
    }

    /// Collapsed whitespace, configured suffix casing and no consecutive
    /// repeats of the same parenthetical token.
    pub fn college_name(&self, raw: &str) -> String {
        let collapsed = collapse_whitespace(raw);
        let mut tidy = String::with_capacity(collapsed.len());
        let mut last_end = 0;
        let mut previous: Option<String> = None;

        for found in parenthetical().find_iter(&collapsed) {
            let between = &collapsed[last_end..found.start()];
            let token = self
                .rules
                .canonical_suffix(found.as_str())
                .unwrap_or(found.as_str());
            let key = normalize_key(token);

            let repeated = between.trim().is_empty() && previous.as_deref() == Some(key.as_str());
            if !repeated {
                tidy.push_str(between);
                tidy.push_str(token);
                previous = Some(key);
            }
            last_end = found.end();
        }
        tidy.push_str(&collapsed[last_end..]);

        collapse_whitespace(&tidy)
    }

    fn build(
        &self,
        candidate: &CandidateRow<'_>,
        resolved: ResolvedName,
        warnings: &mut Vec<QualityWarning>,
    ) -> ReconstructedRecord {
        let mut seats = SeatCounts::default();

        for (category, cell) in self.schema.category_cells(candidate.row) {
            let count = match parse_seat_cell(cell) {
                SeatCell::Count(count) => count,
                SeatCell::Blank => 0,
                SeatCell::Negative => {
                    warnings.push(QualityWarning::for_row(
                        candidate.index,
                        candidate.row.cells(),
                        WarningKind::NegativeSeatValue {
                            category: category.to_string(),
                            value: cell.trim().to_string(),
                        },
                    ));
                    0
                }
                SeatCell::Invalid => {
                    warnings.push(QualityWarning::for_row(
                        candidate.index,
                        candidate.row.cells(),
                        WarningKind::InvalidSeatValue {
                            category: category.to_string(),
                            value: cell.trim().to_string(),
                        },
                    ));
                    0
                }
            };
            seats.push(category, count);
        }

        ReconstructedRecord {
            serial_number: candidate.serial,
            row_index: candidate.index,
            college_name: self.college_name(&resolved.name),
            program_name: collapse_whitespace(candidate.row.cell(ColumnSchema::PROGRAM)),
            seats,
            resolution: resolved.resolution,
        }
    }
}
