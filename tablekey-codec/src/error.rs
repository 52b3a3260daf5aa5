//! Error types for the opaque id codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding opaque ids.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No secret has been configured.
    #[error("opaque id codec is not configured: set a secret before using hash ids")]
    NotConfigured,

    /// The secret cannot key the selected cipher.
    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    /// The configuration file or environment is unusable.
    #[error("invalid codec configuration: {0}")]
    Config(String),

    /// The opaque id is malformed, forged, or was produced under another secret.
    #[error("malformed opaque id: {0}")]
    Decode(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Whether the error stems from missing or invalid configuration rather
    /// than from the input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured | Self::InvalidSecret(_) | Self::Config(_) | Self::Io(_)
        )
    }
}
