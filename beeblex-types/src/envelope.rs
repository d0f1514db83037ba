//! JSON envelopes exchanged over HTTP.
//!
//! Binary fields (ciphertext, wrapped keys, reply bodies) are carried as
//! standard padded Base64 text. This module only moves the text around;
//! encoding and decoding the bytes is the codec's job.

use crate::{ApiKey, BeeblexErrorCode, Result};
use serde::{Deserialize, Serialize};

/// Body of the initial handshake that fetches the server's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    pub api_key: ApiKey,
}

/// Handshake reply: either the public key or an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResponse {
    /// Base64 of the DER-encoded RSA public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outgoing encrypted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub api_key: ApiKey,
    /// Caller-supplied tag that scopes error codes.
    pub error_domain: String,
    /// Session key wrapped with the server's public key.
    pub encrypted_key: String,
    /// Payload sealed with the session key (`nonce || ciphertext || tag`).
    pub ciphertext: String,
}

impl TransactionRequest {
    /// Serializes the request to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Plaintext HTTP response envelope.
///
/// A successful exchange carries `ciphertext`; a request the server could not
/// even open carries `error_code` and `message` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciphertext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// Envelope carrying an encrypted reply.
    #[must_use]
    pub fn sealed(ciphertext: String) -> Self {
        Self {
            ciphertext: Some(ciphertext),
            ..Self::default()
        }
    }

    /// Envelope carrying a plaintext error.
    #[must_use]
    pub fn error(code: BeeblexErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.code()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Parses an envelope from raw response bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The decrypted reply carried inside [`ResponseEnvelope::ciphertext`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64 of the result bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ReplyFrame {
    /// A successful reply with an encoded body.
    #[must_use]
    pub fn ok(body: String) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    /// A server-reported failure.
    #[must_use]
    pub fn error(code: BeeblexErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.code()),
            message: Some(message.into()),
            body: None,
        }
    }

    /// Serializes the frame to JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parses a frame from decrypted bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
