//! Error types for the doc-analytics library.
//!
//! This module provides custom error types using `thiserror`. The only
//! domain-level failure is [`AnalyticsError::NoRelevantData`]; everything else
//! wraps I/O, CSV or data-shape failures that are propagated unmodified.

use thiserror::Error;

/// Errors that can occur while writing, loading or aggregating analysis tables.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// An aggregation was requested from a dataset whose backing table is absent
    #[error("No relevant data: {0}")]
    NoRelevantData(String),

    /// A raw analysis fragment did not have the expected shape
    #[error("Malformed analysis result: {0}")]
    DataShape(#[from] serde_json::Error),

    /// Reading or writing a delimited table file failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied argument cannot be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl AnalyticsError {
    /// Shorthand for a missing backing table.
    pub(crate) fn missing(what: &str) -> Self {
        Self::NoRelevantData(format!("{what} table was not supplied"))
    }

    /// True for the "no relevant data" domain error.
    #[must_use]
    pub const fn is_no_relevant_data(&self) -> bool {
        matches!(self, Self::NoRelevantData(_))
    }
}

/// Convenience type alias for Result with `AnalyticsError`
pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
