//! The application API key.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest API key the server issues.
pub const MAX_API_KEY_LEN: usize = 128;

/// Client-identifying key issued per application.
///
/// Keys are opaque to the client beyond a basic shape check: non-empty,
/// at most [`MAX_API_KEY_LEN`] characters, drawn from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Parses and validates an API key, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self> {
        let key = s.trim();

        if key.is_empty() {
            return Err(Error::InvalidApiKey("key is empty".to_string()));
        }

        if key.len() > MAX_API_KEY_LEN {
            return Err(Error::InvalidApiKey(format!(
                "key is {} characters, maximum is {MAX_API_KEY_LEN}",
                key.len()
            )));
        }

        if let Some(c) = key
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::InvalidApiKey(format!("unexpected character {c:?}")));
        }

        Ok(Self(key.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ApiKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApiKey {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}
