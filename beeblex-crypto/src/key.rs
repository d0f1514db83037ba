//! Ephemeral session keys.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of session keys in bytes (256 bits, for either supported cipher).
pub const KEY_SIZE: usize = 32;

/// A per-transaction symmetric key, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_SIZE],
}

impl SessionKey {
    /// Generates a fresh random key from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a key from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
