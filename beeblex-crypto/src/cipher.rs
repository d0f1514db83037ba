//! Authenticated session encryption.
//!
//! Two AEAD suites are supported; which one a deployment uses must match the
//! server, so it is chosen by configuration rather than fixed here. Both use
//! a 256-bit key, a 96-bit random nonce and a 128-bit tag.

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use crate::key::SessionKey;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of nonce in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Symmetric cipher used for payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CipherSuite {
    /// ChaCha20-Poly1305 (RFC 8439).
    #[default]
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
    /// AES-256 in Galois/Counter Mode.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChaCha20Poly1305 => f.write_str("chacha20-poly1305"),
            Self::Aes256Gcm => f.write_str("aes-256-gcm"),
        }
    }
}

/// Encrypted data with the nonce needed for decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Returns the total size of the encrypted data.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Flattens to `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Splits `nonce || ciphertext`.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption("data too short".to_string()));
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);

        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }

    /// Encodes to Base64 for transmission.
    pub fn to_base64(&self) -> String {
        codec::encode(&self.to_bytes())
    }

    /// Decodes from Base64.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        Self::from_bytes(&codec::decode(encoded)?)
    }
}

/// Encrypts plaintext with the session key under `suite`.
pub fn encrypt(
    suite: CipherSuite,
    key: &SessionKey,
    plaintext: &[u8],
) -> CryptoResult<EncryptedData> {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = match suite {
        CipherSuite::ChaCha20Poly1305 => chacha_seal(key, &nonce, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?,
        CipherSuite::Aes256Gcm => aes_seal(key, &nonce, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?,
    };

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypts data sealed by [`encrypt`] with the same key and suite.
pub fn decrypt(
    suite: CipherSuite,
    key: &SessionKey,
    encrypted: &EncryptedData,
) -> CryptoResult<Vec<u8>> {
    let plaintext = match suite {
        CipherSuite::ChaCha20Poly1305 => {
            chacha_open(key, &encrypted.nonce, &encrypted.ciphertext).ok()
        }
        CipherSuite::Aes256Gcm => aes_open(key, &encrypted.nonce, &encrypted.ciphertext).ok(),
    };

    plaintext.ok_or_else(|| {
        CryptoError::Decryption("decryption failed (wrong key or tampered data)".to_string())
    })
}

fn chacha_seal(
    key: &SessionKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, chacha20poly1305::aead::Error> {
    use chacha20poly1305::{
        aead::{Aead, KeyInit},
        ChaCha20Poly1305, Nonce,
    };

    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher.encrypt(Nonce::from_slice(nonce), plaintext)
}

fn chacha_open(
    key: &SessionKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, chacha20poly1305::aead::Error> {
    use chacha20poly1305::{
        aead::{Aead, KeyInit},
        ChaCha20Poly1305, Nonce,
    };

    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher.decrypt(Nonce::from_slice(nonce), ciphertext)
}

fn aes_seal(
    key: &SessionKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, aes_gcm::aead::Error> {
    use aes_gcm::{
        aead::{consts::U12, Aead, KeyInit},
        Aes256Gcm, Nonce,
    };

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher.encrypt(Nonce::<U12>::from_slice(nonce), plaintext)
}

fn aes_open(
    key: &SessionKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, aes_gcm::aead::Error> {
    use aes_gcm::{
        aead::{consts::U12, Aead, KeyInit},
        Aes256Gcm, Nonce,
    };

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher.decrypt(Nonce::<U12>::from_slice(nonce), ciphertext)
}
