use chrono::{DateTime, Utc};
use seat_matrix::pipeline::{
    CleanOutput, QualityWarning, ReconstructedRecord, RunStats, RunSummary, StructuralError,
};
use serde::Serialize;
use std::io::Write;

/// Everything an operator needs to audit one cleaning run.
#[derive(Debug, Serialize)]
pub(crate) struct CleanReport<'a> {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) input: String,
    pub(crate) rules_version: &'a str,
    pub(crate) stats: RunStats,
    pub(crate) summary: RunSummary,
    pub(crate) unresolved_names: usize,
    pub(crate) warnings: &'a [QualityWarning],
    pub(crate) structural_errors: &'a [StructuralError],
    pub(crate) records: &'a [ReconstructedRecord],
}

impl<'a> CleanReport<'a> {
    pub(crate) fn new(
        output: &'a CleanOutput,
        rules_version: &'a str,
        input: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            input: input.into(),
            rules_version,
            stats: output.stats,
            summary: output.summary(),
            unresolved_names: output.unresolved_warnings().count(),
            warnings: &output.warnings,
            structural_errors: &output.structural_errors,
            records: &output.records,
        }
    }

    pub(crate) fn write_json<W: Write>(&self, mut writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)
    }
}

/// Writes records in the raw column layout, header row included, so the file
/// can be cleaned again.
pub(crate) fn write_clean_csv<W: Write>(
    writer: W,
    categories: &[String],
    records: &[ReconstructedRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![
        "S.NO.".to_string(),
        "NAME OF THE COLLEGE".to_string(),
        "NAME OF THE PROGRAM".to_string(),
    ];
    header.extend(categories.iter().cloned());
    csv_writer.write_record(&header)?;

    for record in records {
        csv_writer.write_record(record.to_raw_row().cells())?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use seat_matrix::pipeline::{RawRow, SeatMatrixPipeline};
    use seat_matrix::rules::ReconstructionRules;
    use std::sync::Arc;

    const RULES: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../crates/seat-matrix/rules/du-admissions.json"
    );

    fn cleaned() -> (Arc<ReconstructionRules>, CleanOutput) {
        let rules = Arc::new(ReconstructionRules::from_path(RULES).expect("rules load"));
        let rows = vec![
            RawRow::from_cells(["1", "Lady Irwin College", "B.Sc. Home Science", "5", "2", "1", "1", "1", "0", "0"]),
            RawRow::from_cells(["2", "(W)", "B.Sc. Food Technology", "4", "2", "1", "0", "1", "0", "0"]),
            RawRow::from_cells(["3", "For Women (W)", "B.A. (Hons.) Sanskrit", "3", "1", "1", "0", "1", "0", "0"]),
        ];
        let output = SeatMatrixPipeline::new(rules.clone()).run(&rows);
        (rules, output)
    }

    #[test]
    fn json_report_carries_summary_and_diagnostics() {
        let (rules, output) = cleaned();
        let generated_at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let report = CleanReport::new(&output, rules.version(), "raw.csv", generated_at);

        let mut buffer = Vec::new();
        report.write_json(&mut buffer).expect("report serializes");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");

        assert_eq!(value["generated_at"], "2025-06-01T09:30:00Z");
        assert_eq!(value["rules_version"], rules.version());
        assert_eq!(value["stats"]["candidates"], 3);
        assert_eq!(value["summary"]["records"], 3);
        assert_eq!(value["unresolved_names"], 1);
        assert_eq!(value["warnings"][0]["kind"], "unresolved_placeholder");
        assert_eq!(value["records"][1]["college_name"], "Lady Irwin College (W)");
        assert_eq!(value["records"][1]["resolution"]["method"], "suffixed");
        assert_eq!(value["records"][0]["seats"]["UR"], 5);
    }

    #[test]
    fn clean_csv_uses_the_raw_column_layout() {
        let (rules, output) = cleaned();
        let mut buffer = Vec::new();
        write_clean_csv(&mut buffer, rules.categories(), &output.records).expect("csv writes");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "S.NO.,NAME OF THE COLLEGE,NAME OF THE PROGRAM,UR,OBC,SC,ST,EWS,SIKH,PwBD"
        );
        assert_eq!(lines[2], "2,Lady Irwin College (W),B.Sc. Food Technology,4,2,1,0,1,0,0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn clean_csv_feeds_back_into_the_pipeline() {
        let (rules, output) = cleaned();
        let mut buffer = Vec::new();
        write_clean_csv(&mut buffer, rules.categories(), &output.records).expect("csv writes");

        let again = SeatMatrixPipeline::new(rules)
            .run_reader(&buffer[..])
            .expect("csv reads");
        assert_eq!(again.stats.header_repeats, 1);
        assert!(again.structural_errors.is_empty());
        let names: Vec<_> = again.records.iter().map(|r| r.college_name.as_str()).collect();
        let before: Vec<_> = output.records.iter().map(|r| r.college_name.as_str()).collect();
        assert_eq!(names, before);
    }
}
