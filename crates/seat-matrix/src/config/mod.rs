use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_RULES_PATH: &str = "rules/du-admissions.json";
pub const DEFAULT_CONTEXT_LOOKBACK: usize = 50;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the cleaner.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub rules: RulesConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads `APP_*` variables, after loading a `.env` file when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = env::var("APP_ENV")
            .map(|value| AppEnvironment::from_env_value(&value))
            .unwrap_or(AppEnvironment::Development);

        let rules = RulesConfig {
            path: env::var_os("APP_RULES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_PATH)),
            expected_records: count_var("APP_EXPECTED_RECORDS")
                .map_err(|value| ConfigError::InvalidExpectedRecords { value })?,
            context_lookback: count_var("APP_CONTEXT_LOOKBACK")
                .map_err(|value| ConfigError::InvalidContextLookback { value })?
                .unwrap_or(DEFAULT_CONTEXT_LOOKBACK),
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            rules,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Unset or blank is `None`; anything but a non-negative integer hands back
/// the raw value.
fn count_var(name: &str) -> Result<Option<usize>, String> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| raw),
        Err(_) => Ok(None),
    }
}

/// Where the reconstruction tables live and how the pipeline applies them.
#[derive(Debug, Clone)]
pub struct RulesConfig {
    pub path: PathBuf,
    pub expected_records: Option<usize>,
    pub context_lookback: usize,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_EXPECTED_RECORDS must be a non-negative integer, got '{value}'")]
    InvalidExpectedRecords { value: String },
    #[error("APP_CONTEXT_LOOKBACK must be a non-negative integer, got '{value}'")]
    InvalidContextLookback { value: String },
}
