//! Encryption layer for the Beeblex transaction protocol.
//!
//! Every transaction is protected with a two-tier scheme:
//!
//! 1. Session key: 256 random bits generated per transaction, used with an
//!    AEAD cipher to seal the payload (and the server's reply)
//! 2. Server key: an RSA public key that wraps the session key
//!
//! The codec turns the resulting binary blobs into text for the JSON wire
//! format.

pub mod codec;
mod cipher;
mod error;
mod key;
mod keystore;

pub use cipher::{decrypt, encrypt, CipherSuite, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{SessionKey, KEY_SIZE};
pub use keystore::{KeyStore, KeyWrapper, PrivateKey, PublicKey, WrapPadding};
