//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Text was not valid Base64.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Public/private key is missing, unparsable, or unusable for wrapping.
    #[error("key error: {0}")]
    Key(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
