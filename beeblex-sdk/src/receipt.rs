//! In-app-purchase receipt verification.
//!
//! A thin layer over [`Transaction`]: the receipt is Base64-encoded into a
//! [`ReceiptRequest`], sent encrypted to the receipt endpoint, and the reply
//! is parsed as a [`ReceiptValidation`]. The receipt format itself is never
//! inspected.

use crate::error::{BeeblexError, BeeblexResult};
use crate::session::Session;
use crate::transaction::{Transaction, TransactionState};
use crate::transport::Transport;
use beeblex_crypto::codec;
use beeblex_types::{BeeblexErrorCode, ReceiptRequest, ReceiptValidation};
use std::sync::Arc;
use tracing::info;

/// Error domain used for receipt verification failures.
pub const IAP_ERROR_DOMAIN: &str = "com.beeblex.iap";

/// A single-use receipt verification request.
#[derive(Debug)]
pub struct ReceiptVerification {
    transaction: Transaction,
}

impl ReceiptVerification {
    /// Prepares a verification for `receipt`.
    ///
    /// # Errors
    ///
    /// Returns [`BeeblexError::InvalidPaymentTransaction`] for an empty receipt.
    pub fn new(
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        receipt: &[u8],
        sandbox: bool,
    ) -> BeeblexResult<Self> {
        if receipt.is_empty() {
            return Err(BeeblexError::InvalidPaymentTransaction(
                "receipt is empty".to_string(),
            ));
        }

        let payload = serde_json::to_vec(&ReceiptRequest {
            receipt: codec::encode(receipt),
            sandbox,
        })?;
        let path = session.config().receipt_path.clone();
        let transaction =
            Transaction::new(session, transport, payload, IAP_ERROR_DOMAIN).with_path(path);

        Ok(Self { transaction })
    }

    /// Overrides the error domain reported with failures.
    #[must_use]
    pub fn with_error_domain(self, error_domain: impl Into<String>) -> Self {
        Self {
            transaction: self.transaction.with_error_domain(error_domain),
        }
    }

    /// Returns the underlying transaction state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.transaction.state()
    }

    /// Sends the receipt and returns the server's verdict.
    ///
    /// A receipt the server judges invalid is reported as a
    /// [`BeeblexError::Server`] with [`BeeblexErrorCode::IapValidationError`].
    pub async fn verify(&mut self) -> BeeblexResult<ReceiptValidation> {
        let response = self.transaction.process().await?;
        let validation: ReceiptValidation = match response.json() {
            Ok(validation) => validation,
            Err(e) => {
                self.transaction.fail();
                return Err(e);
            }
        };

        if !validation.valid {
            self.transaction.fail();
            return Err(BeeblexError::Server {
                domain: self.transaction.error_domain().to_string(),
                code: BeeblexErrorCode::IapValidationError,
                message: "receipt did not validate".to_string(),
            });
        }

        info!(
            transaction_id = %self.transaction.id(),
            product_id = validation.product_id.as_deref().unwrap_or("-"),
            "Receipt verified"
        );
        Ok(validation)
    }
}
