//! Error types for the conditional parser core
//!
//! Parsing, path generation and expansion are total and never return these.
//! They are produced by configuration loading and the strict analysis facade.

use thiserror::Error;

/// Main error type for the conditional parser core
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid token pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Input too large: {actual} bytes (max {max})")]
    InputTooLarge { max: usize, actual: usize },

    #[error("Expression nesting too deep: depth {actual} (max {max})")]
    NestingTooDeep { max: usize, actual: usize },

    #[error("Too many XOR operands: {actual} (max {max})")]
    TooManyXorOperands { max: usize, actual: usize },

    /// `actual` saturates at `usize::MAX` when the count overflows
    #[error("Too many truth table rows: {actual} (max {max})")]
    TooManyRows { max: usize, actual: usize },

    #[error("Expression mixes AND with OR/XOR at one nesting level")]
    MixedOperators,

    #[error("Expression contains no conditions")]
    EmptyExpression,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config not initialized")]
    ConfigNotInitialized,
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<AnalysisError> for pyo3::PyErr {
    fn from(err: AnalysisError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};

        match err {
            AnalysisError::ConfigNotInitialized => PyRuntimeError::new_err(
                "Config not initialized. Call init_config() first.".to_string(),
            ),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the conditional parser core
pub type Result<T> = std::result::Result<T, AnalysisError>;
