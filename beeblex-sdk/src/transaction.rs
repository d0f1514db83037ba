//! The encrypted transaction engine.
//!
//! One [`Transaction`] is one request/response exchange:
//!
//! 1. Generate a random session key
//! 2. Seal the payload with it
//! 3. Wrap the session key with the server's RSA public key
//! 4. POST the Base64-encoded bundle as JSON
//! 5. Open the reply with the same session key and map server errors
//!
//! Transactions are single-use. Processing one a second time fails with
//! [`BeeblexError::CannotRecycleTransaction`] without touching the network.

use crate::error::{BeeblexError, BeeblexResult};
use crate::session::Session;
use crate::transport::{HttpResponse, Transport};
use beeblex_crypto::{codec, decrypt, encrypt, EncryptedData, KeyWrapper, SessionKey};
use beeblex_types::{BeeblexErrorCode, ReplyFrame, ResponseEnvelope, TransactionRequest};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Created, not yet processed.
    Fresh,
    /// Sealing the payload and wrapping the session key.
    Encrypting,
    /// Request handed to the transport.
    Sent,
    /// HTTP response received, envelope being inspected.
    AwaitingResponse,
    /// Opening the sealed reply.
    Decrypting,
    /// Result delivered.
    Completed,
    /// Error delivered.
    Failed,
}

impl TransactionState {
    /// Returns true once the transaction has delivered its outcome.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fresh => "fresh",
            Self::Encrypting => "encrypting",
            Self::Sent => "sent",
            Self::AwaitingResponse => "awaiting-response",
            Self::Decrypting => "decrypting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The decrypted result of a successful transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResponse {
    body: Vec<u8>,
}

impl TransactionResponse {
    /// Wraps raw result bytes.
    #[must_use]
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// Returns the result bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning the result bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Interprets the result as UTF-8 text.
    pub fn text(&self) -> BeeblexResult<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| BeeblexError::Protocol(format!("reply is not UTF-8: {e}")))
    }

    /// Deserializes the result as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> BeeblexResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Outcome delivered for a transaction.
pub type TransactionResult = BeeblexResult<TransactionResponse>;

/// A single encrypted request/response exchange.
pub struct Transaction {
    id: Uuid,
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    path: String,
    payload: Vec<u8>,
    error_domain: String,
    state: TransactionState,
}

impl Transaction {
    /// Creates a transaction against the session's transaction endpoint.
    pub fn new(
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        payload: impl Into<Vec<u8>>,
        error_domain: impl Into<String>,
    ) -> Self {
        let path = session.config().transaction_path.clone();
        Self {
            id: Uuid::new_v4(),
            session,
            transport,
            path,
            payload: payload.into(),
            error_domain: error_domain.into(),
            state: TransactionState::Fresh,
        }
    }

    /// Targets a different endpoint path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Replaces the error domain.
    #[must_use]
    pub fn with_error_domain(mut self, error_domain: impl Into<String>) -> Self {
        self.error_domain = error_domain.into();
        self
    }

    /// Returns the transaction id used in logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns the caller's error domain.
    #[must_use]
    pub fn error_domain(&self) -> &str {
        &self.error_domain
    }

    /// Marks a completed exchange as failed when a layer above rejects
    /// its result.
    pub(crate) fn fail(&mut self) {
        if self.state == TransactionState::Completed {
            self.state = TransactionState::Failed;
        }
    }

    /// Runs the exchange.
    ///
    /// # Errors
    ///
    /// Fails immediately with [`BeeblexError::CannotRecycleTransaction`] if
    /// this transaction has already been processed. Every other failure
    /// leaves the transaction in [`TransactionState::Failed`].
    pub async fn process(&mut self) -> TransactionResult {
        if self.state != TransactionState::Fresh {
            warn!(transaction_id = %self.id, state = %self.state, "Attempt to recycle transaction");
            return Err(BeeblexError::CannotRecycleTransaction);
        }

        let result = self.run().await;
        self.state = match &result {
            Ok(_) => TransactionState::Completed,
            Err(e) => {
                debug!(transaction_id = %self.id, error = %e, "Transaction failed");
                TransactionState::Failed
            }
        };
        result
    }

    /// Runs the exchange and hands the outcome to `callback`, exactly once.
    pub async fn process_with<F>(mut self, callback: F)
    where
        F: FnOnce(TransactionResult),
    {
        let result = self.process().await;
        callback(result);
    }

    async fn run(&mut self) -> TransactionResult {
        self.state = TransactionState::Encrypting;

        let limit = self.session.config().max_payload_bytes;
        if self.payload.len() > limit {
            return Err(BeeblexError::PayloadTooLarge {
                size: self.payload.len(),
                limit,
            });
        }

        let credentials = self.session.credentials()?;
        let suite = self.session.config().cipher_suite;

        let session_key = SessionKey::generate();
        let sealed = encrypt(suite, &session_key, &self.payload)?;
        let wrapped = credentials.key_store().wrap(session_key.as_bytes())?;

        let request = TransactionRequest {
            api_key: credentials.api_key().clone(),
            error_domain: self.error_domain.clone(),
            encrypted_key: codec::encode(&wrapped),
            ciphertext: sealed.to_base64(),
        };
        let body = request.to_json()?.into_bytes();
        let url = self.session.url_for(&self.path);

        self.state = TransactionState::Sent;
        debug!(
            transaction_id = %self.id,
            error_domain = %self.error_domain,
            %suite,
            bytes = body.len(),
            url = %url,
            "Sending encrypted transaction"
        );

        let response = self.transport.post(&url, body).await.inspect_err(|e| {
            warn!(transaction_id = %self.id, error = %e, "Transport failure");
        })?;

        self.state = TransactionState::AwaitingResponse;
        let ciphertext = self.open_envelope(&response)?;

        self.state = TransactionState::Decrypting;
        let sealed_reply = EncryptedData::from_base64(&ciphertext)?;
        let plaintext = decrypt(suite, &session_key, &sealed_reply)?;
        let frame = ReplyFrame::from_slice(&plaintext)
            .map_err(|e| BeeblexError::Protocol(format!("undecodable reply frame: {e}")))?;

        if let Some(code) = frame.error_code {
            return Err(self.server_error(code, frame.message));
        }

        let body = match frame.body {
            Some(encoded) => codec::decode(&encoded)?,
            None => Vec::new(),
        };

        debug!(transaction_id = %self.id, bytes = body.len(), "Transaction completed");
        Ok(TransactionResponse::new(body))
    }

    /// Extracts the sealed reply from the HTTP response, or the error the
    /// server reported in plaintext.
    fn open_envelope(&self, response: &HttpResponse) -> BeeblexResult<String> {
        let envelope = match ResponseEnvelope::from_slice(&response.body) {
            Ok(envelope) => envelope,
            Err(_) if !response.is_success() => {
                return Err(BeeblexError::Http {
                    status: response.status,
                });
            }
            Err(e) => {
                return Err(BeeblexError::Protocol(format!(
                    "undecodable response envelope: {e}"
                )));
            }
        };

        if let Some(code) = envelope.error_code {
            return Err(self.server_error(code, envelope.message));
        }

        if !response.is_success() {
            return Err(BeeblexError::Http {
                status: response.status,
            });
        }

        envelope
            .ciphertext
            .ok_or_else(|| BeeblexError::Protocol("response carries no ciphertext".to_string()))
    }

    fn server_error(&self, code: u32, message: Option<String>) -> BeeblexError {
        let category = BeeblexErrorCode::from_code(code);
        let mut message = message.unwrap_or_default();
        if !BeeblexErrorCode::is_known(code) {
            message = format!("unrecognised server code {code}: {message}");
        }

        warn!(
            transaction_id = %self.id,
            error_domain = %self.error_domain,
            code = %category,
            "Server reported an error"
        );

        BeeblexError::Server {
            domain: self.error_domain.clone(),
            code: category,
            message,
        }
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("error_domain", &self.error_domain)
            .field("payload_len", &self.payload.len())
            .field("state", &self.state)
            .finish()
    }
}
