use super::record::{ReconstructedRecord, Resolution};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate figures over a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub unique_colleges: usize,
    pub unique_programs: usize,
    pub total_seats: u64,
    pub seats_by_category: BTreeMap<String, u64>,
    pub approximate_records: usize,
    pub unresolved_records: usize,
}

impl RunSummary {
    pub fn from_records(records: &[ReconstructedRecord]) -> Self {
        let mut colleges = BTreeSet::new();
        let mut programs = BTreeSet::new();
        let mut summary = RunSummary {
            records: records.len(),
            ..RunSummary::default()
        };

        for record in records {
            colleges.insert(record.college_name.as_str());
            programs.insert(record.program_name.as_str());

            for (category, seats) in record.seats.iter() {
                *summary
                    .seats_by_category
                    .entry(category.to_string())
                    .or_default() += u64::from(seats);
                summary.total_seats += u64::from(seats);
            }

            if record.resolution.is_approximate() {
                summary.approximate_records += 1;
            }
            if record.resolution == Resolution::Unresolved {
                summary.unresolved_records += 1;
            }
        }

        summary.unique_colleges = colleges.len();
        summary.unique_programs = programs.len();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::SeatCounts;

    fn record(serial: u32, college: &str, program: &str, ur: u32, resolution: Resolution) -> ReconstructedRecord {
        let mut seats = SeatCounts::default();
        seats.push("UR", ur);
        seats.push("SC", 1);
        ReconstructedRecord {
            serial_number: serial,
            row_index: serial as usize,
            college_name: college.to_string(),
            program_name: program.to_string(),
            seats,
            resolution,
        }
    }

    #[test]
    fn summary_counts_distinct_names_and_seats() {
        let records = vec![
            record(1, "Hindu College", "B.A. (Hons.) English", 10, Resolution::Verbatim),
            record(2, "Hindu College", "B.A. (Hons.) History", 5, Resolution::Inherited),
            record(
                3,
                "Miranda House for Women (W)",
                "B.A. (Hons.) English",
                7,
                Resolution::Inferred {
                    keyword: "English".to_string(),
                },
            ),
            record(4, "(W)", "B.Com.", 2, Resolution::Unresolved),
        ];

        let summary = RunSummary::from_records(&records);
        assert_eq!(summary.records, 4);
        assert_eq!(summary.unique_colleges, 3);
        assert_eq!(summary.unique_programs, 3);
        assert_eq!(summary.total_seats, 28);
        assert_eq!(summary.seats_by_category["UR"], 24);
        assert_eq!(summary.seats_by_category["SC"], 4);
        assert_eq!(summary.approximate_records, 2);
        assert_eq!(summary.unresolved_records, 1);
    }

    #[test]
    fn empty_run_has_an_empty_summary() {
        assert_eq!(RunSummary::from_records(&[]), RunSummary::default());
    }
}
