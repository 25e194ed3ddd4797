//! Error types for the forecasting engine

use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors produced while validating logs or computing a forecast
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Input is missing a required field, has an unparseable value, or is empty.
    /// Fatal for the call.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A strategy was invoked directly with fewer records than it needs
    #[error("insufficient history for {strategy}: need {required} records, got {actual}")]
    InsufficientHistory {
        strategy: &'static str,
        required: usize,
        actual: usize,
    },

    /// A regression model could not be fitted on the given training set
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Strategy name did not match any known forecasting strategy
    #[error("unknown strategy `{0}` (expected trend, ensemble or linear)")]
    UnknownStrategy(String),
}

impl ForecastError {
    /// Build a `MalformedInput` error pointing at a record field
    pub fn malformed_field(index: usize, field: &str, reason: impl std::fmt::Display) -> Self {
        ForecastError::MalformedInput(format!("record {index}: field `{field}` {reason}"))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ForecastError::MalformedInput(_))
    }
}
