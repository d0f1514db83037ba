//! Binary-to-text codec for embedding ciphertext and keys in JSON.
//!
//! Standard alphabet with padding. Decoding is strict: anything that is not
//! canonical Base64 is rejected instead of being truncated.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Encodes bytes as padded standard Base64.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes padded standard Base64.
///
/// Surrounding whitespace is ignored; anything else that is not part of the
/// alphabet fails with [`CryptoError::MalformedEncoding`].
pub fn decode(text: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::MalformedEncoding(e.to_string()))
}
