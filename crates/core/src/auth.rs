use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, AppResult};

/// Local-storage key under which the sign-in flow persists its auth blob.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Bearer token attached to authenticated workflow engine calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken(String);

impl BearerToken {
    /// Creates a token, rejecting blank values.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "bearer token must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Debug for BearerToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("BearerToken(<redacted>)")
    }
}

/// Auth blob written by the sign-in flow, shaped `{ "state": { "token": ... } }`.
///
/// Only the token is read; every other field is owned by the writer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersistedAuthBlob {
    #[serde(default)]
    state: Option<PersistedAuthState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PersistedAuthState {
    #[serde(default)]
    token: Option<String>,
}

impl PersistedAuthBlob {
    /// Parses the raw local-storage value.
    ///
    /// Browser local storage keeps the blob as a JSON string, so a string
    /// value is decoded a second time.
    pub fn parse(raw: &Value) -> AppResult<Self> {
        let decoded = match raw {
            Value::String(encoded) => serde_json::from_str::<Value>(encoded).map_err(|error| {
                AppError::Validation(format!("auth blob is not valid JSON: {error}"))
            })?,
            other => other.clone(),
        };

        serde_json::from_value(decoded)
            .map_err(|error| AppError::Validation(format!("auth blob has unexpected shape: {error}")))
    }

    /// Returns the bearer token when the blob holds a non-blank one.
    #[must_use]
    pub fn bearer_token(&self) -> Option<BearerToken> {
        self.state
            .as_ref()
            .and_then(|state| state.token.as_deref())
            .and_then(|token| BearerToken::new(token).ok())
    }
}
