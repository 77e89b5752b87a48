use crate::config::ConfigError;
use crate::pipeline::PipelineError;
use crate::rules::RulesError;
use crate::telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("rule file error: {0}")]
    Rules(#[from] RulesError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json output error: {0}")]
    Json(#[from] serde_json::Error),
}
