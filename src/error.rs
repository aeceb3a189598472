//! Error taxonomy for the trendline pipeline.

use thiserror::Error;

/// Result type for trendline operations
pub type Result<T> = std::result::Result<T, TrendlineError>;

/// Pipeline stage that rejected its input.
/// Only series validation fails; later stages yield empty results instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Stage {
    #[strum(serialize = "series validation")]
    SeriesValidation,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendlineError {
    /// Input data broke an invariant before any computation ran
    #[error("Validation failed during {stage}: {reason}")]
    Validation { stage: Stage, reason: String },

    /// A parameter is out of range
    #[error("Invalid parameter '{field}': {reason}")]
    Config { field: &'static str, reason: String },
}

impl TrendlineError {
    pub fn validation(stage: Stage, reason: impl Into<String>) -> Self {
        TrendlineError::Validation {
            stage,
            reason: reason.into(),
        }
    }

    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        TrendlineError::Config {
            field,
            reason: reason.into(),
        }
    }
}
