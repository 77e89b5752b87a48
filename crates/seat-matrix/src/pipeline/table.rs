use serde::{Deserialize, Serialize};
use std::io::Read;

/// One row exactly as the extractor produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(cells.into_iter().map(Into::into).collect())
    }

    /// Cell at `position`, or `""` past the end of a short row.
    pub fn cell(&self, position: usize) -> &str {
        self.cells.get(position).map(String::as_str).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Width once trailing blank padding is ignored.
    pub fn significant_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|cell| !cell.trim().is_empty())
            .map(|last| last + 1)
            .unwrap_or(0)
    }
}

/// Column layout of the seat matrix: serial number, college, program, then
/// one seat column per reservation category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    categories: Vec<String>,
}

impl ColumnSchema {
    pub const SERIAL: usize = 0;
    pub const COLLEGE: usize = 1;
    pub const PROGRAM: usize = 2;
    pub const FIRST_CATEGORY: usize = 3;

    pub fn new(categories: Vec<String>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn arity(&self) -> usize {
        Self::FIRST_CATEGORY + self.categories.len()
    }

    /// `(code, cell)` pairs for every category column of `row`.
    pub fn category_cells<'a>(&'a self, row: &'a RawRow) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.categories
            .iter()
            .enumerate()
            .map(move |(offset, code)| (code.as_str(), row.cell(Self::FIRST_CATEGORY + offset)))
    }
}

/// Reads a headerless, possibly ragged CSV dump of the extracted table.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        rows.push(RawRow::from_cells(record.iter()));
    }

    Ok(rows)
}
