//! In-app-purchase receipt verification bodies.
//!
//! Both travel inside an encrypted transaction; the receipt itself is opaque
//! to this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plaintext payload of a receipt verification transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    /// Base64 of the receipt bytes as delivered by the store.
    pub receipt: String,
    /// Verify against the store's sandbox environment.
    #[serde(default)]
    pub sandbox: bool,
}

/// Server verdict on a receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
}
