use crate::commands::{run_clean, run_rules_check};
use clap::{Args, Parser, Subcommand};
use seat_matrix::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "seat-matrix",
    about = "Rebuild clean admission seat records from extracted PDF tables",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean an extracted seat-matrix CSV and write a JSON report
    Clean(CleanArgs),
    /// Inspect reconstruction rule files
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Load and validate a rule file, then print its table sizes
    Check(RulesCheckArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CleanArgs {
    /// Raw CSV produced by the table extractor (no header row required)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured rule file
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Expected number of records; a mismatch is reported as a warning
    #[arg(long)]
    pub(crate) expected: Option<usize>,
    /// Raw rows searched backwards for fragment context hints
    #[arg(long)]
    pub(crate) context_lookback: Option<usize>,
    /// Write the JSON report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Also write the cleaned table as CSV
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesCheckArgs {
    /// Override the configured rule file
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Clean(args) => run_clean(args),
        Command::Rules {
            command: RulesCommand::Check(args),
        } => run_rules_check(args),
    }
}
