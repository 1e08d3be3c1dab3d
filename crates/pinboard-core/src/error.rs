//! Error types for pinboard-core

use thiserror::Error;

/// Result type alias using pinboard-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pinboard-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote service could not be reached
    #[error("Remote service unreachable: {0}")]
    Unreachable(String),

    /// Acting user may not modify the target
    #[error("Not authorized to perform this operation")]
    Unauthorized,

    /// Operation target missing
    #[error("Pin not found: {0}")]
    NotFound(String),

    /// Registration against an already-used email
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// Login with an unknown email/password pair
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Invalid input (refused before any network/store call)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local store error
    #[error("Store error: {0}")]
    Store(String),

    /// Remote API rejected the request
    #[error("API error: {0}")]
    Api(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
