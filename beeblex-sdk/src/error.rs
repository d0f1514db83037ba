//! Error types for the SDK.

use beeblex_crypto::CryptoError;
use beeblex_types::BeeblexErrorCode;
use thiserror::Error;

/// Errors surfaced by initialization and transactions.
#[derive(Debug, Error)]
pub enum BeeblexError {
    /// API key is empty, malformed, or was rejected during the handshake.
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    /// A transaction was started before the session was initialized.
    #[error("session not initialized; call initialize_with_api_key first")]
    NotInitialized,

    /// A transaction instance was processed more than once.
    #[error("cannot recycle transaction; create a new one for each request")]
    CannotRecycleTransaction,

    /// Text that should have been Base64 was not.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The server public key is missing or unusable.
    #[error("key error: {0}")]
    Key(String),

    /// Payload exceeds the configured limit; nothing was sent.
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Sealing the payload failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The reply could not be opened with the session key.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status and no error envelope.
    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },

    /// The reply was not in the expected envelope shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server reported a failure for this transaction.
    #[error("{domain}: {code} ({}): {message}", .code.code())]
    Server {
        domain: String,
        code: BeeblexErrorCode,
        message: String,
    },

    /// Receipt verification was asked to send an unusable receipt.
    #[error("invalid payment transaction: {0}")]
    InvalidPaymentTransaction(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No async runtime was available to run the transaction on.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BeeblexError {
    /// Returns true for errors caused by misuse of the API rather than by
    /// the network or the server.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::CannotRecycleTransaction | Self::NotInitialized)
    }

    /// Returns the server error code, if the server reported this failure.
    #[must_use]
    pub fn server_code(&self) -> Option<BeeblexErrorCode> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the caller's error domain for server-reported failures.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Server { domain, .. } => Some(domain),
            _ => None,
        }
    }
}

impl From<CryptoError> for BeeblexError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::MalformedEncoding(msg) => Self::MalformedEncoding(msg),
            CryptoError::Key(msg) => Self::Key(msg),
            CryptoError::Encryption(msg) => Self::Encryption(msg),
            CryptoError::Decryption(msg) => Self::Decryption(msg),
            e @ CryptoError::InvalidKeyLength { .. } => Self::Decryption(e.to_string()),
            CryptoError::Serialization(e) => Self::Serialization(e),
        }
    }
}

impl From<beeblex_types::Error> for BeeblexError {
    fn from(err: beeblex_types::Error) -> Self {
        match err {
            beeblex_types::Error::InvalidApiKey(msg) => Self::InvalidApiKey(msg),
            beeblex_types::Error::Serialization(e) => Self::Serialization(e),
        }
    }
}

/// Result type for SDK operations.
pub type BeeblexResult<T> = Result<T, BeeblexError>;
