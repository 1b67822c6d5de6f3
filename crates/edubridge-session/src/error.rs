//! Error types for session cache operations.

/// Error type for session cache operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No entry was ever stored under this key, or it was evicted.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The entry existed but its time window has elapsed.
    #[error("Session expired: {0}")]
    Expired(String),
}

/// Result type for session cache operations.
pub type Result<T> = std::result::Result<T, Error>;
