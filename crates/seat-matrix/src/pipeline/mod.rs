//! Seat-matrix reconstruction: validate rows, rebuild college names, then
//! normalize into typed records.

mod classify;
mod diagnostics;
mod normalizer;
mod placeholder;
mod record;
mod resolver;
mod summary;
mod table;
pub(crate) mod text;
mod validator;

pub use classify::{classify, CellClass};
pub use diagnostics::{QualityWarning, StructuralError, WarningKind};
pub use normalizer::Normalizer;
pub use placeholder::{KeywordPolicy, PlaceholderDecision, PlaceholderPolicy};
pub use record::{ReconstructedRecord, Resolution, SeatCounts};
pub use resolver::{NameReconstructor, ResolvedName};
pub use summary::RunSummary;
pub use table::{read_rows, ColumnSchema, RawRow};
pub use validator::{parse_serial, validate, CandidateRow, Validation};

use crate::config::{RulesConfig, DEFAULT_CONTEXT_LOOKBACK};
use crate::rules::ReconstructionRules;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open raw table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid raw table CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-run knobs that are not part of the rule file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Expected candidate total; a mismatch is reported as a warning.
    pub expected_records: Option<usize>,
    /// Raw rows searched backwards for fragment context hints.
    pub context_lookback: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            expected_records: None,
            context_lookback: DEFAULT_CONTEXT_LOOKBACK,
        }
    }
}

impl From<&RulesConfig> for PipelineOptions {
    fn from(config: &RulesConfig) -> Self {
        Self {
            expected_records: config.expected_records,
            context_lookback: config.context_lookback,
        }
    }
}

/// Row counts seen by the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub raw_rows: usize,
    pub candidates: usize,
    pub header_repeats: usize,
    pub noise_rows: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanOutput {
    pub records: Vec<ReconstructedRecord>,
    pub warnings: Vec<QualityWarning>,
    pub structural_errors: Vec<StructuralError>,
    pub stats: RunStats,
}

impl CleanOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_records(&self.records)
    }

    /// Warnings that leave a record without a trustworthy college name.
    pub fn unresolved_warnings(&self) -> impl Iterator<Item = &QualityWarning> {
        self.warnings
            .iter()
            .filter(|warning| warning.kind.is_unresolved_name())
    }
}

/// The three-stage cleaning pipeline. Holds only immutable rule tables, so a
/// single value can serve any number of runs.
pub struct SeatMatrixPipeline<P: PlaceholderPolicy = KeywordPolicy> {
    rules: Arc<ReconstructionRules>,
    schema: ColumnSchema,
    policy: P,
    options: PipelineOptions,
}

impl SeatMatrixPipeline<KeywordPolicy> {
    pub fn new(rules: Arc<ReconstructionRules>) -> Self {
        let policy = KeywordPolicy::new(rules.clone());
        Self::with_policy(rules, policy)
    }
}

impl<P: PlaceholderPolicy> SeatMatrixPipeline<P> {
    pub fn with_policy(rules: Arc<ReconstructionRules>, policy: P) -> Self {
        let schema = rules.schema();
        Self {
            rules,
            schema,
            policy,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn rules(&self) -> &ReconstructionRules {
        &self.rules
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn run_path<Q: AsRef<Path>>(&self, path: Q) -> Result<CleanOutput, PipelineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.run_reader(file)
    }

    pub fn run_reader<R: Read>(&self, reader: R) -> Result<CleanOutput, PipelineError> {
        let rows = read_rows(reader)?;
        Ok(self.run(&rows))
    }

    /// Runs all three stages over `rows`. Row-level problems end up in the
    /// output's warnings and structural errors; nothing here fails.
    pub fn run(&self, rows: &[RawRow]) -> CleanOutput {
        let validation = validate(rows, &self.schema, &self.rules);
        let stats = RunStats {
            raw_rows: rows.len(),
            candidates: validation.candidates.len(),
            header_repeats: validation.header_repeats,
            noise_rows: validation.noise_rows,
        };
        info!(
            raw_rows = stats.raw_rows,
            candidates = stats.candidates,
            structural_errors = validation.structural_errors.len(),
            "rows validated"
        );

        let mut warnings = Vec::new();
        if let Some(expected) = self.options.expected_records {
            if expected != stats.candidates {
                warn!(expected, found = stats.candidates, "candidate count mismatch");
                warnings.push(QualityWarning::for_run(WarningKind::CandidateCountMismatch {
                    expected,
                    found: stats.candidates,
                }));
            }
        }

        let reconstructor =
            NameReconstructor::new(&self.rules, &self.policy, self.options.context_lookback);
        let names = reconstructor.reconstruct(rows, &validation.candidates, &mut warnings);
        info!(names = names.len(), warnings = warnings.len(), "college names reconstructed");

        let normalizer = Normalizer::new(&self.rules, &self.schema);
        let records = normalizer.normalize(&validation.candidates, names, &mut warnings);
        info!(records = records.len(), warnings = warnings.len(), "records normalized");

        CleanOutput {
            records,
            warnings,
            structural_errors: validation.structural_errors,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::bundled_rules_for_tests;
    use std::io::Cursor;

    fn pipeline() -> SeatMatrixPipeline {
        SeatMatrixPipeline::new(Arc::new(bundled_rules_for_tests()))
    }

    struct FixedPolicy;

    impl PlaceholderPolicy for FixedPolicy {
        fn disambiguate(&self, _placeholder: &str, _program: &str) -> PlaceholderDecision {
            PlaceholderDecision::Assigned {
                college: "Gargi College for Women (W)".to_string(),
                keyword: "fixed".to_string(),
            }
        }
    }

    const RAW: &str = "S.NO.,NAME OF THE COLLEGE,NAME OF THE PROGRAM,UR,OBC,SC,ST,EWS,SIKH,PwBD\n\
1,Bhaskaracharya College of Applied,B.Sc. (Hons.) Physics,10,5,3,2,1,0,1\n\
2,Sciences,B.Sc. (Hons.) Chemistry,8,4,nan,1,1,0,0\n\
S.NO.,NAME OF THE COLLEGE,NAME OF THE PROGRAM,UR,OBC,SC,ST,EWS,SIKH,PwBD\n\
3,Lady Irwin College (W),B.Sc. Home Science,12,6,4,2,2,0,1\n\
4,(W),B.Sc. Food Technology,6,-1,2,1,1,0,0\n\
5,For Women (W),B.A. (Hons.) English,9,4,3,1,1,0,0\n\
6,Hindu College,B.A.\n";

    #[test]
    fn run_reader_cleans_a_small_table() {
        let output = pipeline().run_reader(Cursor::new(RAW)).expect("csv parses");

        assert_eq!(output.stats.raw_rows, 8);
        assert_eq!(output.stats.candidates, 5);
        assert_eq!(output.stats.header_repeats, 2);
        assert_eq!(output.structural_errors.len(), 1);
        assert_eq!(output.structural_errors[0].row_index, 7);

        let colleges: Vec<_> = output.records.iter().map(|r| r.college_name.as_str()).collect();
        assert_eq!(
            colleges,
            vec![
                "Bhaskaracharya College of Applied Sciences",
                "Bhaskaracharya College of Applied Sciences",
                "Lady Irwin College (W)",
                "Lady Irwin College (W)",
                "Miranda House for Women (W)",
            ]
        );
        assert_eq!(output.records[1].seats.get("SC"), Some(0));
        assert_eq!(output.records[3].seats.get("OBC"), Some(0));

        let kinds: Vec<_> = output.warnings.iter().map(|w| w.kind.clone()).collect();
        assert!(kinds
            .iter()
            .any(|kind| matches!(kind, WarningKind::NegativeSeatValue { .. })));
        assert!(kinds
            .iter()
            .any(|kind| matches!(kind, WarningKind::InferredPlaceholder { .. })));
        assert_eq!(output.unresolved_warnings().count(), 0);

        let summary = output.summary();
        assert_eq!(summary.records, 5);
        assert_eq!(summary.unique_colleges, 3);
        assert_eq!(summary.approximate_records, 1);
    }

    #[test]
    fn expected_total_mismatch_is_a_warning_not_a_failure() {
        let pipeline = pipeline().with_options(PipelineOptions {
            expected_records: Some(6),
            ..PipelineOptions::default()
        });
        let output = pipeline.run_reader(Cursor::new(RAW)).expect("csv parses");
        assert_eq!(output.records.len(), 5);
        assert_eq!(
            output.warnings[0],
            QualityWarning {
                row_index: None,
                raw: Vec::new(),
                kind: WarningKind::CandidateCountMismatch {
                    expected: 6,
                    found: 5
                },
            }
        );
    }

    #[test]
    fn custom_policy_replaces_keyword_matching() {
        let rules = Arc::new(bundled_rules_for_tests());
        let pipeline = SeatMatrixPipeline::with_policy(rules, FixedPolicy);
        let output = pipeline.run_reader(Cursor::new(RAW)).expect("csv parses");
        assert_eq!(output.records[4].college_name, "Gargi College for Women (W)");
        assert_eq!(
            output.records[4].resolution,
            Resolution::Inferred {
                keyword: "fixed".to_string()
            }
        );
    }

    #[test]
    fn run_path_reports_missing_files() {
        let error = pipeline()
            .run_path("/definitely/not/here.csv")
            .expect_err("missing file");
        assert!(matches!(error, PipelineError::Io { .. }));
        assert!(error.to_string().contains("/definitely/not/here.csv"));
    }
}
