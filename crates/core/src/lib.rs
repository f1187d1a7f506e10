//! Shared primitives for all Rust crates in Atelier.

#![forbid(unsafe_code)]

/// Authentication primitives read from the persisted auth blob.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AUTH_STORAGE_KEY, BearerToken, PersistedAuthBlob};

/// Result type used across Atelier crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Tenant identifier owning remote resources such as message templates.
///
/// Kept opaque: the template API issues slugs as well as UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wraps a tenant identifier as issued by the server.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TenantId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// No bearer token is available for an authenticated call.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Remote endpoint answered with a non-success status.
    #[error("upstream returned status {status}: {}", message.as_deref().unwrap_or("<no error message>"))]
    Upstream {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Error message taken from the response body, when present.
        message: Option<String>,
    },

    /// Internal unexpected error, including transport and parse failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the user-facing message, falling back when the remote sent none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Internal(message) => message.clone(),
            Self::Upstream {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Upstream { .. } => fallback.to_owned(),
        }
    }
}
