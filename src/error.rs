//! Error types for the cloudauth client.
//!
//! The public request operations on [`crate::AuthSessionClient`] never return
//! these; they fold every failure into the flat response shape. Config
//! loading, credential storage and client construction do return them.

use thiserror::Error;

/// Errors raised below the response-normalization boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection refused, DNS failure, TLS failure or timeout.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or unreadable configuration.
    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Credential store failed to load, save or clear.
    #[error("credentials: {0}")]
    Credentials(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
