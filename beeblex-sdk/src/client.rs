//! The host-facing entry point.

use crate::config::SdkConfig;
use crate::error::{BeeblexError, BeeblexResult};
use crate::receipt::ReceiptVerification;
use crate::session::Session;
use crate::transaction::{Transaction, TransactionResult};
use crate::transport::Transport;
use beeblex_crypto::PublicKey;
use beeblex_types::ApiKey;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Returns the SDK version.
#[must_use]
pub fn version_number() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Beeblex client: owns the session and the transport.
///
/// Create one at startup and keep it for the life of the process. Cloning
/// is cheap and every clone shares the same session.
#[derive(Clone)]
pub struct Beeblex {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
}

impl Beeblex {
    /// Creates a client using the built-in HTTP transport.
    #[cfg(feature = "http")]
    pub fn new(config: SdkConfig) -> BeeblexResult<Self> {
        let transport = crate::transport::HttpTransport::new(config.request_timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client using a caller-supplied transport.
    pub fn with_transport(config: SdkConfig, transport: Arc<dyn Transport>) -> BeeblexResult<Self> {
        config.validate()?;
        Ok(Self {
            session: Arc::new(Session::new(config)),
            transport,
        })
    }

    /// Returns the SDK version.
    #[must_use]
    pub fn version_number() -> &'static str {
        version_number()
    }

    /// Initializes the session, returning whether it succeeded.
    ///
    /// See [`Self::try_initialize_with_api_key`] for the failure reason.
    pub async fn initialize_with_api_key(&self, api_key: &str) -> bool {
        match self.try_initialize_with_api_key(api_key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Initialization failed");
                false
            }
        }
    }

    /// Initializes the session via the server handshake.
    pub async fn try_initialize_with_api_key(&self, api_key: &str) -> BeeblexResult<()> {
        self.session.initialize(api_key, self.transport.as_ref()).await
    }

    /// Initializes the session with a public key bundled in the application.
    pub fn initialize_with_public_key(
        &self,
        api_key: &str,
        public_key: PublicKey,
    ) -> BeeblexResult<()> {
        self.session.initialize_with_public_key(api_key, public_key)
    }

    /// Returns true once initialized.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.session.is_initialized()
    }

    /// Returns the API key, if initialized.
    #[must_use]
    pub fn api_key(&self) -> Option<ApiKey> {
        self.session.api_key()
    }

    /// Returns the server public key, if initialized.
    #[must_use]
    pub fn public_key(&self) -> Option<PublicKey> {
        self.session.public_key()
    }

    /// Chooses https (`true`) or http for transactions started afterwards.
    pub fn set_use_ssl(&self, use_ssl: bool) {
        self.session.set_use_ssl(use_ssl);
    }

    /// Returns the current transport preference.
    #[must_use]
    pub fn use_ssl(&self) -> bool {
        self.session.use_ssl()
    }

    /// Returns the base URL transactions will use.
    #[must_use]
    pub fn current_base_url(&self) -> &str {
        self.session.current_base_url()
    }

    /// Returns the shared session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Creates a fresh transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BeeblexError::NotInitialized`] before initialization.
    pub fn transaction(
        &self,
        payload: impl Into<Vec<u8>>,
        error_domain: impl Into<String>,
    ) -> BeeblexResult<Transaction> {
        self.ensure_initialized()?;
        Ok(Transaction::new(
            Arc::clone(&self.session),
            Arc::clone(&self.transport),
            payload,
            error_domain,
        ))
    }

    /// Runs a transaction to completion.
    pub async fn send(
        &self,
        payload: impl Into<Vec<u8>>,
        error_domain: impl Into<String>,
    ) -> TransactionResult {
        self.transaction(payload, error_domain)?.process().await
    }

    /// Starts a transaction on the current Tokio runtime and invokes
    /// `callback` with its outcome, exactly once, from that runtime.
    ///
    /// Misuse is reported synchronously: calling this before initialization
    /// or outside a runtime returns an error and never invokes `callback`.
    pub fn process_transaction<F>(
        &self,
        payload: impl Into<Vec<u8>>,
        error_domain: impl Into<String>,
        callback: F,
    ) -> BeeblexResult<JoinHandle<()>>
    where
        F: FnOnce(TransactionResult) + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|e| BeeblexError::Runtime(e.to_string()))?;
        let transaction = self.transaction(payload, error_domain)?;
        Ok(handle.spawn(transaction.process_with(callback)))
    }

    /// Prepares a receipt verification.
    pub fn verify_receipt(&self, receipt: &[u8], sandbox: bool) -> BeeblexResult<ReceiptVerification> {
        self.ensure_initialized()?;
        ReceiptVerification::new(
            Arc::clone(&self.session),
            Arc::clone(&self.transport),
            receipt,
            sandbox,
        )
    }

    fn ensure_initialized(&self) -> BeeblexResult<()> {
        if self.session.is_initialized() {
            Ok(())
        } else {
            Err(BeeblexError::NotInitialized)
        }
    }
}

impl std::fmt::Debug for Beeblex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beeblex")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
