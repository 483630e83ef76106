//! Error types for catalog retrieval and selection

use thiserror::Error;

use crate::corrections::Thresholds;
use crate::selection::HostBounds;

/// Result type for catalog operations
pub type ExoResult<T> = Result<T, ExoError>;

/// Errors that can occur between the archive request and the filtered dataset
#[derive(Error, Debug)]
pub enum ExoError {
    /// Network failure, timeout, non-success status or a body that is not a table
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Every row was filtered out; carries the bounds that were applied
    #[error("No planets left after filtering ({})", describe_filters(.thresholds, .host))]
    EmptyResult {
        thresholds: Thresholds,
        host: Option<HostBounds>,
    },

    /// Conflicting or unrecognized selector options
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_filters(thresholds: &Thresholds, host: &Option<HostBounds>) -> String {
    match host {
        Some(host) => format!("{}, {}", host, thresholds),
        None => thresholds.to_string(),
    }
}

impl From<reqwest::Error> for ExoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExoError::Retrieval(format!("request timed out: {}", err))
        } else {
            ExoError::Retrieval(err.to_string())
        }
    }
}
