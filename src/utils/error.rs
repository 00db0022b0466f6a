//! Error handling for the report generator
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, ReportError>;

/// Main error type for report generation
#[derive(Error, Debug)]
pub enum ReportError {
    /// A required CSV column is absent; report generation never starts
    #[error("missing required column: `{column}`")]
    MissingColumn { column: String },

    /// The experiment filter matched no rows. Expected and non-fatal:
    /// callers warn and skip report generation instead of failing.
    #[error("no data found for experiment `{experiment}`")]
    NoDataForExperiment { experiment: String },

    /// The model identifier is not in the pricing table
    #[error("unknown model `{model}`; valid models: {}", .valid.join(", "))]
    UnknownModel { model: String, valid: Vec<String> },

    /// No model column value was detected and none was supplied
    #[error("no model detected in the data; pass one with --model")]
    MissingModel,

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart rendering errors
    #[error("render error: {0}")]
    Render(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Whether this condition is expected during normal operation and
    /// should be surfaced as a warning rather than a failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, ReportError::NoDataForExperiment { .. })
    }
}
