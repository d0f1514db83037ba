//! Reference Beeblex server and its HTTP API.
//!
//! Implements the server side of the handshake and of encrypted
//! transactions closely enough for local development and integration tests:
//! transactions are echoed back, and any non-empty receipt validates.

pub mod protocol;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use beeblex_crypto::{codec, CipherSuite, PrivateKey, WrapPadding};
use beeblex_types::{
    ApiKey, BeeblexErrorCode, HandshakeRequest, HandshakeResponse, ReceiptRequest,
    ReceiptValidation, ReplyFrame, ResponseEnvelope, TransactionRequest,
};
use protocol::{open_request, seal_reply, OpenedRequest};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Server key material and policy.
#[derive(Debug)]
pub struct ServerState {
    pub private_key: PrivateKey,
    pub padding: WrapPadding,
    pub suite: CipherSuite,
    /// Accepted API keys. Empty accepts every well-formed key.
    pub api_keys: HashSet<ApiKey>,
}

impl ServerState {
    /// Creates a state that accepts any API key with default algorithms.
    #[must_use]
    pub fn new(private_key: PrivateKey) -> Self {
        Self {
            private_key,
            padding: WrapPadding::default(),
            suite: CipherSuite::default(),
            api_keys: HashSet::new(),
        }
    }

    /// Restricts the server to `keys`.
    #[must_use]
    pub fn with_api_keys(mut self, keys: impl IntoIterator<Item = ApiKey>) -> Self {
        self.api_keys = keys.into_iter().collect();
        self
    }

    fn accepts(&self, key: &ApiKey) -> bool {
        self.api_keys.is_empty() || self.api_keys.contains(key)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VersionResponse {
    pub version: String,
}

type Reply = (StatusCode, Json<ResponseEnvelope>);

fn reject(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(ResponseEnvelope::error(BeeblexErrorCode::ServerError, message)),
    )
}

async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handshake_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> (StatusCode, Json<HandshakeResponse>) {
    let denied = |message: &str| {
        (
            StatusCode::FORBIDDEN,
            Json(HandshakeResponse {
                error_code: Some(BeeblexErrorCode::ServerError.code()),
                message: Some(message.to_string()),
                ..HandshakeResponse::default()
            }),
        )
    };

    let request: HandshakeRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Malformed handshake: {}", e);
            return denied("malformed handshake request");
        }
    };

    if !state.accepts(&request.api_key) {
        warn!("Handshake with unknown API key");
        return denied("unknown API key");
    }

    match state.private_key.public_key().to_base64() {
        Ok(public_key) => {
            info!("Handshake accepted");
            (
                StatusCode::OK,
                Json(HandshakeResponse {
                    public_key: Some(public_key),
                    ..HandshakeResponse::default()
                }),
            )
        }
        Err(e) => {
            warn!("Failed to encode public key: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HandshakeResponse {
                    error_code: Some(BeeblexErrorCode::ServerError.code()),
                    message: Some("internal error".to_string()),
                    ..HandshakeResponse::default()
                }),
            )
        }
    }
}

/// Parses, authorizes and decrypts an incoming transaction.
fn open(state: &ServerState, body: &[u8]) -> Result<OpenedRequest, Reply> {
    let request: TransactionRequest = serde_json::from_slice(body)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, format!("malformed request: {e}")))?;

    if !state.accepts(&request.api_key) {
        warn!(error_domain = %request.error_domain, "Transaction with unknown API key");
        return Err(reject(StatusCode::FORBIDDEN, "unknown API key"));
    }

    open_request(&state.private_key, state.padding, state.suite, &request).map_err(|e| {
        debug!("Cannot open transaction: {}", e);
        reject(StatusCode::BAD_REQUEST, "cannot decrypt request")
    })
}

fn seal(state: &ServerState, opened: &OpenedRequest, frame: &ReplyFrame) -> Reply {
    match seal_reply(state.suite, &opened.session_key, frame) {
        Ok(envelope) => (StatusCode::OK, Json(envelope)),
        Err(e) => {
            warn!("Failed to seal reply: {}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

async fn transaction_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Reply {
    let opened = match open(&state, &body) {
        Ok(opened) => opened,
        Err(reply) => return reply,
    };

    debug!(bytes = opened.payload.len(), "Echoing transaction");
    let frame = ReplyFrame::ok(codec::encode(&opened.payload));
    seal(&state, &opened, &frame)
}

async fn receipt_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Reply {
    let opened = match open(&state, &body) {
        Ok(opened) => opened,
        Err(reply) => return reply,
    };

    let frame = match verify_receipt(&opened.payload) {
        Ok(validation) => match serde_json::to_vec(&validation) {
            Ok(json) => ReplyFrame::ok(codec::encode(&json)),
            Err(e) => ReplyFrame::error(BeeblexErrorCode::ServerError, e.to_string()),
        },
        Err(message) => ReplyFrame::error(BeeblexErrorCode::IapValidationError, message),
    };
    seal(&state, &opened, &frame)
}

/// Development policy: any non-empty receipt validates.
fn verify_receipt(payload: &[u8]) -> Result<ReceiptValidation, String> {
    let request: ReceiptRequest =
        serde_json::from_slice(payload).map_err(|e| format!("malformed receipt request: {e}"))?;
    let receipt = codec::decode(&request.receipt).map_err(|e| e.to_string())?;
    if receipt.is_empty() {
        return Err("empty receipt".to_string());
    }

    let digest = Sha256::digest(&receipt);
    let transaction_id: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    info!(sandbox = request.sandbox, %transaction_id, "Receipt accepted");

    Ok(ReceiptValidation {
        valid: true,
        product_id: None,
        transaction_id: Some(transaction_id),
        purchase_date: Some(chrono::Utc::now()),
    })
}

/// Build the HTTP API router with the given server state.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/v1/version", get(version_handler))
        .route("/api/v1/handshake", post(handshake_handler))
        .route("/api/v1/transaction", post(transaction_handler))
        .route("/api/v1/receipt", post(receipt_handler))
        .with_state(state)
}
