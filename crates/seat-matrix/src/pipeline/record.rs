use super::table::RawRow;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// How a record's college name was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Resolution {
    /// The cell held a complete name.
    Verbatim,
    /// A suffix cell attached to the preceding college.
    Suffixed,
    /// A fragment replaced through the fragment table.
    Mapped,
    /// A fragment appended to the preceding college.
    Continued,
    /// An empty cell that took the preceding college.
    Inherited,
    /// A placeholder assigned from the program name. Approximate.
    Inferred { keyword: String },
    /// No deterministic resolution; the raw text was kept.
    Unresolved,
}

impl Resolution {
    pub fn is_approximate(&self) -> bool {
        matches!(self, Resolution::Inferred { .. } | Resolution::Unresolved)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Resolution::Verbatim => "verbatim",
            Resolution::Suffixed => "suffixed",
            Resolution::Mapped => "mapped",
            Resolution::Continued => "continued",
            Resolution::Inherited => "inherited",
            Resolution::Inferred { .. } => "inferred",
            Resolution::Unresolved => "unresolved",
        }
    }
}

/// Seat counts per reservation category, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatCounts {
    entries: Vec<(String, u32)>,
}

impl SeatCounts {
    pub(crate) fn push(&mut self, category: &str, seats: u32) {
        self.entries.push((category.to_string(), seats));
    }

    pub fn get(&self, category: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(code, _)| code == category)
            .map(|(_, seats)| *seats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(code, seats)| (code.as_str(), *seats))
    }

    /// Sum over all categories, widened so that saturated cells cannot wrap.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, seats)| u64::from(*seats)).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SeatCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, seats) in &self.entries {
            map.serialize_entry(code, seats)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructedRecord {
    pub serial_number: u32,
    pub row_index: usize,
    pub college_name: String,
    pub program_name: String,
    pub seats: SeatCounts,
    pub resolution: Resolution,
}

impl ReconstructedRecord {
    /// The record laid out as an already-clean raw row, in schema order.
    pub fn to_raw_row(&self) -> RawRow {
        let mut cells = Vec::with_capacity(3 + self.seats.len());
        cells.push(self.serial_number.to_string());
        cells.push(self.college_name.clone());
        cells.push(self.program_name.clone());
        cells.extend(self.seats.iter().map(|(_, seats)| seats.to_string()));
        RawRow::new(cells)
    }
}
