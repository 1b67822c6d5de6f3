//! Error types for portal operations.

/// Error type for portal operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortalError {
    /// Username, password or school subdomain were rejected.
    #[error("Invalid credentials")]
    BadCredentials,

    /// The portal has no data for the request (unknown person, no lessons on that day).
    #[error("{0}")]
    MissingData(String),

    /// The handle has been logged out on the portal side.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The portal refused the request as malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The portal could not be reached or answered garbage.
    #[error("Portal transport error: {0}")]
    Transport(String),

    /// A fixture dataset could not be loaded.
    #[error("Fixture error: {0}")]
    Fixture(String),
}

/// Result type for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;
