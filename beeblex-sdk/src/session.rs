//! Session state: API key, server public key and transport preference.
//!
//! A [`Session`] is an explicit context object. It is created at startup,
//! shared by `Arc` with every transaction, and can be re-initialized; a
//! transaction snapshots the credentials when it starts, so a concurrent
//! re-initialization never changes the key material of an in-flight request.

use crate::config::SdkConfig;
use crate::error::{BeeblexError, BeeblexResult};
use crate::transport::Transport;
use beeblex_crypto::{KeyStore, PublicKey};
use beeblex_types::{ApiKey, HandshakeRequest, HandshakeResponse};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// The API key together with the server key it maps to.
#[derive(Debug)]
pub struct Credentials {
    api_key: ApiKey,
    key_store: KeyStore,
}

impl Credentials {
    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the key store holding the server's public key.
    #[must_use]
    pub fn key_store(&self) -> &KeyStore {
        &self.key_store
    }
}

/// Process-lifetime session context.
#[derive(Debug)]
pub struct Session {
    config: SdkConfig,
    use_ssl: AtomicBool,
    credentials: RwLock<Option<Arc<Credentials>>>,
}

impl Session {
    /// Creates an uninitialized session.
    #[must_use]
    pub fn new(config: SdkConfig) -> Self {
        let use_ssl = AtomicBool::new(config.use_ssl);
        Self {
            config,
            use_ssl,
            credentials: RwLock::new(None),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Validates `api_key` and fetches the matching public key from the server.
    ///
    /// Replaces any previously stored credentials on success. A malformed
    /// key or a server rejection yields [`BeeblexError::InvalidApiKey`];
    /// failing to reach the server yields [`BeeblexError::Transport`].
    pub async fn initialize(&self, api_key: &str, transport: &dyn Transport) -> BeeblexResult<()> {
        let api_key = ApiKey::parse(api_key)?;

        let body = serde_json::to_vec(&HandshakeRequest {
            api_key: api_key.clone(),
        })?;
        let url = self.url_for(&self.config.handshake_path);
        let response = transport.post(&url, body).await?;

        let reply: HandshakeResponse = serde_json::from_slice(&response.body).map_err(|e| {
            if response.is_success() {
                BeeblexError::Protocol(format!("unreadable handshake reply: {e}"))
            } else {
                BeeblexError::Http {
                    status: response.status,
                }
            }
        })?;

        if let Some(code) = reply.error_code {
            let message = reply.message.unwrap_or_default();
            warn!(code, status = response.status, "API key rejected by server");
            return Err(BeeblexError::InvalidApiKey(format!(
                "rejected by server (code {code}): {message}"
            )));
        }

        if !response.is_success() {
            return Err(BeeblexError::Http {
                status: response.status,
            });
        }

        let encoded = reply.public_key.ok_or_else(|| {
            BeeblexError::Protocol("handshake reply carries no public key".to_string())
        })?;
        let public_key = PublicKey::parse(&encoded)
            .map_err(|e| BeeblexError::InvalidApiKey(format!("server returned {e}")))?;

        self.install(api_key, public_key);
        Ok(())
    }

    /// Installs credentials for a public key shipped with the application,
    /// skipping the handshake.
    pub fn initialize_with_public_key(
        &self,
        api_key: &str,
        public_key: PublicKey,
    ) -> BeeblexResult<()> {
        let api_key = ApiKey::parse(api_key)?;
        self.install(api_key, public_key);
        Ok(())
    }

    fn install(&self, api_key: ApiKey, public_key: PublicKey) {
        let bits = public_key.size() * 8;
        let credentials = Arc::new(Credentials {
            api_key,
            key_store: KeyStore::new(public_key, self.config.key_wrap_padding),
        });
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
        info!(key_bits = bits, "Session initialized");
    }

    /// Returns true once credentials are installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a snapshot of the current credentials.
    pub fn credentials(&self) -> BeeblexResult<Arc<Credentials>> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(BeeblexError::NotInitialized)
    }

    /// Returns the API key, if initialized.
    #[must_use]
    pub fn api_key(&self) -> Option<ApiKey> {
        self.credentials().ok().map(|c| c.api_key.clone())
    }

    /// Returns the server public key, if initialized.
    #[must_use]
    pub fn public_key(&self) -> Option<PublicKey> {
        self.credentials()
            .ok()
            .and_then(|c| c.key_store.public_key().cloned())
    }

    /// Switches between the https and http base URL for later transactions.
    pub fn set_use_ssl(&self, use_ssl: bool) {
        self.use_ssl.store(use_ssl, Ordering::Relaxed);
    }

    /// Returns the current transport preference.
    #[must_use]
    pub fn use_ssl(&self) -> bool {
        self.use_ssl.load(Ordering::Relaxed)
    }

    /// Returns the base URL for the current transport preference.
    #[must_use]
    pub fn current_base_url(&self) -> &str {
        if self.use_ssl() {
            &self.config.secure_base_url
        } else {
            &self.config.base_url
        }
    }

    /// Joins `path` onto the current base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.current_base_url().trim_end_matches('/'), path)
    }
}
