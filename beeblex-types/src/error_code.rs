//! Error codes reported by the Beeblex server.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-reported failure categories.
///
/// These are the only two codes surfaced to callers as server errors.
/// Transport and local failures never use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum BeeblexErrorCode {
    /// Generic server-side failure (bad request, unknown key, internal error).
    ServerError,
    /// The in-app-purchase receipt did not validate.
    IapValidationError,
}

impl BeeblexErrorCode {
    /// Returns the numeric wire code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::ServerError => 1,
            Self::IapValidationError => 2,
        }
    }

    /// Maps a numeric wire code to a category.
    ///
    /// Codes this client does not know are reported as [`Self::ServerError`].
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            2 => Self::IapValidationError,
            _ => Self::ServerError,
        }
    }

    /// Returns true if `code` is one of the defined wire codes.
    #[must_use]
    pub const fn is_known(code: u32) -> bool {
        matches!(code, 1 | 2)
    }
}

impl From<BeeblexErrorCode> for u32 {
    fn from(code: BeeblexErrorCode) -> Self {
        code.code()
    }
}

impl From<u32> for BeeblexErrorCode {
    fn from(code: u32) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for BeeblexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerError => f.write_str("serverError"),
            Self::IapValidationError => f.write_str("iapValidationError"),
        }
    }
}
