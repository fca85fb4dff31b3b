//! # Hub Error Types
//!
//! Failures a caller of the hub can observe.
//!
//! A subscriber being too slow is NOT one of them: the hub drops it, logs a
//! warning and carries on. Broadcasters only ever see the hub itself going
//! away or an event that could not be encoded.

use thiserror::Error;

/// Result type alias for hub operations.
pub type HubResult<T> = Result<T, HubError>;

#[derive(Debug, Error)]
pub enum HubError {
    /// The coordination loop has stopped.
    #[error("Broadcast hub is shutting down")]
    ShuttingDown,

    /// Event could not be encoded as JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Hub configuration rejected at startup.
    #[error("Invalid hub configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::Serialization(err.to_string())
    }
}
