//! SDK configuration.
//!
//! Defaults point at the production Beeblex service. Every field can be
//! overridden from JSON, which is how tests and staging builds redirect the
//! SDK at another server.

use crate::error::{BeeblexError, BeeblexResult};
use beeblex_crypto::{CipherSuite, WrapPadding};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default plaintext base address.
pub const DEFAULT_BASE_URL: &str = "http://api.beeblex.com";

/// Default TLS base address.
pub const DEFAULT_SECURE_BASE_URL: &str = "https://api.beeblex.com";

/// Default payload limit (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// SDK configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdkConfig {
    /// Base URL used when SSL is disabled.
    pub base_url: String,
    /// Base URL used when SSL is enabled.
    pub secure_base_url: String,
    /// Endpoint that exchanges an API key for the server public key.
    pub handshake_path: String,
    /// Endpoint for generic encrypted transactions.
    pub transaction_path: String,
    /// Endpoint for receipt verification transactions.
    pub receipt_path: String,
    /// Initial transport preference.
    pub use_ssl: bool,
    /// Payload cipher; must match the server.
    pub cipher_suite: CipherSuite,
    /// RSA padding for session key wrapping; must match the server.
    pub key_wrap_padding: WrapPadding,
    /// Largest payload a transaction will send.
    pub max_payload_bytes: usize,
    /// Per-request timeout applied by the built-in HTTP transport.
    pub request_timeout_secs: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secure_base_url: DEFAULT_SECURE_BASE_URL.to_string(),
            handshake_path: "/api/v1/handshake".to_string(),
            transaction_path: "/api/v1/transaction".to_string(),
            receipt_path: "/api/v1/receipt".to_string(),
            use_ssl: true,
            cipher_suite: CipherSuite::default(),
            key_wrap_padding: WrapPadding::default(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            request_timeout_secs: 30,
        }
    }
}

impl SdkConfig {
    /// Builds a config that sends both variants to the same base address.
    ///
    /// Handy for local servers that only listen on one scheme.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            secure_base_url: base_url.clone(),
            base_url,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> BeeblexResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> BeeblexResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BeeblexError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Checks that the config is usable.
    pub fn validate(&self) -> BeeblexResult<()> {
        check_url("baseUrl", &self.base_url)?;
        check_url("secureBaseUrl", &self.secure_base_url)?;

        for (name, path) in [
            ("handshakePath", &self.handshake_path),
            ("transactionPath", &self.transaction_path),
            ("receiptPath", &self.receipt_path),
        ] {
            if !path.starts_with('/') {
                return Err(BeeblexError::Config(format!("{name} must start with '/'")));
            }
        }

        if self.max_payload_bytes == 0 {
            return Err(BeeblexError::Config(
                "maxPayloadBytes must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(BeeblexError::Config(
                "requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn check_url(name: &str, url: &str) -> BeeblexResult<()> {
    if url.is_empty() {
        return Err(BeeblexError::Config(format!("{name} is empty")));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(BeeblexError::Config(format!(
            "{name} must be an http:// or https:// URL"
        )));
    }
    Ok(())
}
