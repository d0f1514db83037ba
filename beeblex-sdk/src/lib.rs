//! Client SDK for the Beeblex licensing service.
//!
//! This crate handles:
//! - API key initialization and the public key handshake
//! - Encrypted, single-use request/response transactions
//! - In-app-purchase receipt verification on top of transactions
//! - Transport selection between the https and http base URLs
//!
//! # Protocol
//!
//! Each transaction seals its payload with a fresh 256-bit session key,
//! wraps that key with the server's RSA public key, and expects the reply
//! sealed with the same session key. See [`Transaction`] for the state
//! machine and [`SdkConfig`] for the cipher and padding choices.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> beeblex_sdk::BeeblexResult<()> {
//! use beeblex_sdk::{Beeblex, SdkConfig};
//!
//! let beeblex = Beeblex::new(SdkConfig::default())?;
//! beeblex.try_initialize_with_api_key("ABC123").await?;
//!
//! let reply = beeblex.send(b"ping".to_vec(), "com.example.app").await?;
//! println!("{}", reply.text()?);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod receipt;
mod session;
mod transaction;
mod transport;

pub use client::{version_number, Beeblex};
pub use config::{SdkConfig, DEFAULT_BASE_URL, DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_SECURE_BASE_URL};
pub use error::{BeeblexError, BeeblexResult};
pub use receipt::{ReceiptVerification, IAP_ERROR_DOMAIN};
pub use session::{Credentials, Session};
pub use transaction::{Transaction, TransactionResponse, TransactionResult, TransactionState};
pub use transport::{HttpResponse, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

pub use beeblex_crypto::{CipherSuite, PublicKey, WrapPadding};
pub use beeblex_types::{ApiKey, BeeblexErrorCode, ReceiptValidation};
