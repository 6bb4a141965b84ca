//! Error types for the VSS protocol core

use thiserror::Error;

/// Result type alias for VSS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during VSS protocol execution
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid protocol or algebraic configuration; fatal, not recoverable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Too few revealed shares to interpolate the secret
    #[error("Insufficient shares: required {required}, got {actual}")]
    InsufficientShares { required: usize, actual: usize },

    /// Interpolated secret contradicts the public commitment
    #[error("Recovery failed verification: {0}")]
    RecoveryFailed(String),

    /// Share or commitment consistency check failed
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid party ID
    #[error("Invalid party ID: {0}")]
    InvalidPartyId(usize),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Channel failure surfaced from the transport layer
    #[error("Transport error: {0}")]
    Transport(String),

    /// Bounded wait expired before enough messages arrived
    #[error("Timeout waiting for {0}")]
    Timeout(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
