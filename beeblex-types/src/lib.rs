//! Wire-level type definitions for the Beeblex licensing protocol.
//!
//! This crate holds the types both ends of an encrypted transaction agree on:
//! - The application's API key
//! - The JSON request/response envelopes carried over HTTP
//! - The decrypted reply frame and the server error enumeration
//! - Receipt verification request and result bodies
//!
//! Nothing in here touches key material; encryption lives in `beeblex-crypto`.

mod api_key;
mod envelope;
mod error_code;
mod receipt;

pub use api_key::{ApiKey, MAX_API_KEY_LEN};
pub use envelope::{
    HandshakeRequest, HandshakeResponse, ReplyFrame, ResponseEnvelope, TransactionRequest,
};
pub use error_code::BeeblexErrorCode;
pub use receipt::{ReceiptRequest, ReceiptValidation};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
