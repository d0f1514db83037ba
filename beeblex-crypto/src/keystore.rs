//! Asymmetric key store.
//!
//! The server's RSA public key is only ever used to wrap a session key, never
//! to encrypt payloads directly. [`KeyWrapper`] is the seam the transaction
//! engine depends on, so the RSA backend can be swapped (or faked in tests)
//! without touching the engine.

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

/// RSA padding used to wrap session keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapPadding {
    /// OAEP with SHA-256 for both the digest and MGF1.
    #[default]
    #[serde(rename = "oaep-sha256")]
    OaepSha256,
    /// PKCS#1 v1.5 encryption padding, for older servers.
    #[serde(rename = "pkcs1v15")]
    Pkcs1v15,
}

impl WrapPadding {
    /// Largest message this padding can wrap under a modulus of `modulus_len` bytes.
    #[must_use]
    pub fn max_message_len(self, modulus_len: usize) -> usize {
        let overhead = match self {
            Self::OaepSha256 => 2 * 32 + 2,
            Self::Pkcs1v15 => 11,
        };
        modulus_len.saturating_sub(overhead)
    }
}

impl fmt::Display for WrapPadding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OaepSha256 => f.write_str("oaep-sha256"),
            Self::Pkcs1v15 => f.write_str("pkcs1v15"),
        }
    }
}

/// Wraps short secrets for the server.
pub trait KeyWrapper: Send + Sync {
    /// Encrypts `key_bytes` so that only the server can recover them.
    fn wrap(&self, key_bytes: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// The server's RSA public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Parses a DER key, accepting SubjectPublicKeyInfo or bare PKCS#1.
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        RsaPublicKey::from_public_key_der(der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(der))
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::Key(format!("invalid DER public key: {e}")))
    }

    /// Parses a PEM key (`PUBLIC KEY` or `RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let pem = pem.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::Key(format!("invalid PEM public key: {e}")))
    }

    /// Parses the human-readable form: PEM, or Base64 of the DER bytes.
    pub fn parse(text: &str) -> CryptoResult<Self> {
        if text.trim_start().starts_with("-----BEGIN") {
            return Self::from_pem(text);
        }

        let der = codec::decode(text)
            .map_err(|e| CryptoError::Key(format!("public key is not base64: {e}")))?;
        Self::from_der(&der)
    }

    /// Returns the SubjectPublicKeyInfo DER encoding.
    pub fn to_der(&self) -> CryptoResult<Vec<u8>> {
        self.inner
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::Key(e.to_string()))
    }

    /// Returns Base64 of the DER encoding, as carried in the handshake.
    pub fn to_base64(&self) -> CryptoResult<String> {
        Ok(codec::encode(&self.to_der()?))
    }

    /// Modulus size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    /// Encrypts a short message under this key.
    pub fn encrypt(&self, padding: WrapPadding, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let limit = padding.max_message_len(self.size());
        if message.len() > limit {
            return Err(CryptoError::Key(format!(
                "{}-bit key cannot wrap {} bytes with {padding} (limit {limit})",
                self.size() * 8,
                message.len()
            )));
        }

        let mut rng = rand::rngs::OsRng;
        let result = match padding {
            WrapPadding::OaepSha256 => self.inner.encrypt(&mut rng, Oaep::new::<Sha256>(), message),
            WrapPadding::Pkcs1v15 => self.inner.encrypt(&mut rng, Pkcs1v15Encrypt, message),
        };
        result.map_err(|e| CryptoError::Key(format!("key wrap failed: {e}")))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &(self.size() * 8))
            .finish()
    }
}

/// Holds the server's public key for the current API key.
///
/// An empty store is valid to construct; wrapping with it fails with
/// [`CryptoError::Key`].
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    public_key: Option<PublicKey>,
    padding: WrapPadding,
}

impl KeyStore {
    /// Creates a store holding `public_key`.
    #[must_use]
    pub fn new(public_key: PublicKey, padding: WrapPadding) -> Self {
        Self {
            public_key: Some(public_key),
            padding,
        }
    }

    /// Creates a store with no key loaded.
    #[must_use]
    pub fn empty(padding: WrapPadding) -> Self {
        Self {
            public_key: None,
            padding,
        }
    }

    /// Returns the stored public key, if any.
    #[must_use]
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// Returns the configured padding.
    #[must_use]
    pub fn padding(&self) -> WrapPadding {
        self.padding
    }
}

impl KeyWrapper for KeyStore {
    fn wrap(&self, key_bytes: &[u8]) -> CryptoResult<Vec<u8>> {
        let public_key = self
            .public_key
            .as_ref()
            .ok_or_else(|| CryptoError::Key("no public key loaded".to_string()))?;
        public_key.encrypt(self.padding, key_bytes)
    }
}

/// The server-side RSA private key.
///
/// Clients never hold one; this exists for the reference server and tests.
#[derive(Clone)]
pub struct PrivateKey {
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Generates a new key pair with a modulus of `bits`.
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        RsaPrivateKey::new(&mut rand::rngs::OsRng, bits)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::Key(format!("key generation failed: {e}")))
    }

    /// Parses a PKCS#8 PEM private key.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        RsaPrivateKey::from_pkcs8_pem(pem.trim())
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::Key(format!("invalid PEM private key: {e}")))
    }

    /// Serializes to PKCS#8 PEM.
    pub fn to_pem(&self) -> CryptoResult<String> {
        self.inner
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.as_str().to_owned())
            .map_err(|e| CryptoError::Key(e.to_string()))
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.inner.to_public_key(),
        }
    }

    /// Recovers a secret wrapped with the matching public key.
    pub fn unwrap_key(&self, padding: WrapPadding, wrapped: &[u8]) -> CryptoResult<Vec<u8>> {
        let result = match padding {
            WrapPadding::OaepSha256 => self.inner.decrypt(Oaep::new::<Sha256>(), wrapped),
            WrapPadding::Pkcs1v15 => self.inner.decrypt(Pkcs1v15Encrypt, wrapped),
        };
        result.map_err(|e| CryptoError::Key(format!("key unwrap failed: {e}")))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &(self.inner.size() * 8))
            .field("material", &"[REDACTED]")
            .finish()
    }
}
