//! Error types for the order-flow engine.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the order-flow engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A raw trade record is missing a required column or carries an
    /// unrecognized value.
    #[error("Malformed trade at row {index} (id {id:?}): {reason}")]
    MalformedTrade {
        index: usize,
        id: Option<String>,
        reason: String,
    },

    /// Candles or trades are not sorted ascending by time.
    #[error("Ordering violation in {series} at index {index}: {reason}")]
    OrderingViolation {
        series: &'static str,
        index: usize,
        reason: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a malformed trade error.
    pub fn malformed_trade(index: usize, id: Option<&str>, reason: impl Into<String>) -> Self {
        Error::MalformedTrade {
            index,
            id: id.map(str::to_owned),
            reason: reason.into(),
        }
    }

    /// Create an ordering violation error.
    pub fn ordering(series: &'static str, index: usize, reason: impl Into<String>) -> Self {
        Error::OrderingViolation {
            series,
            index,
            reason: reason.into(),
        }
    }
}
