//! Configuration management for Library Desk

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use validator::Validate;

use crate::models::DEFAULT_SCORE;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the CSV files
    pub data_dir: PathBuf,
}

/// Loan rules applied by the borrow/return workflow
#[derive(Debug, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct LoanConfig {
    /// Days a copy may be kept before a return counts as late
    #[validate(range(min = 0, message = "max_days must not be negative"))]
    pub max_days: i64,
    /// Points removed from a student's score on a late return
    #[validate(range(min = 0, message = "late_penalty must not be negative"))]
    pub late_penalty: i32,
    /// Score given to newly registered students
    pub initial_score: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// One of `pretty`, `compact` or `json`
    pub format: String,
    /// When set, logs go to a daily rolling file named after this path
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub loans: LoanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally layering an explicit file on top of the
    /// default sources
    pub fn load_from(extra_file: Option<&str>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(File::with_name(path));
        }

        let config = builder
            // Environment variables (with prefix LIBRARY_), e.g. LIBRARY_LOANS__MAX_DAYS
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Shorthand for the data directory
            .set_override_option("storage.data_dir", env::var("LIBRARY_DATA_DIR").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config
            .loans
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid [loans] settings: {}", e)))?;
        Ok(config)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
        }
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            max_days: 15,
            late_penalty: 10,
            initial_score: DEFAULT_SCORE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
