//! Error types for RVM client operations
//!
//! Errors embedded in decoded response bodies are data, not faults: every
//! non-login command returns its decoded message unconditionally and leaves
//! failure interpretation to the caller. Only transport-level failures,
//! codec failures, and an error-bearing login response surface as `Err`.

use thiserror::Error;

use rvm_core::CodecError;

/// Result type alias for RVM client operations
pub type Result<T> = std::result::Result<T, RvmClientError>;

/// Errors that can occur during RVM client operations
#[derive(Debug, Error)]
pub enum RvmClientError {
    /// HTTP request failed (connectivity or non-2xx status); always fatal to
    /// the in-progress call
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Wire codec failure
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Login response carried an error payload; fatal to the whole session
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Server rejected a configuration command
    #[error("Command rejected: {0}")]
    Command(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
