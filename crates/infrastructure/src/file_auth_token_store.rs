use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use atelier_application::AuthTokenStore;
use atelier_core::{AUTH_STORAGE_KEY, AppError, AppResult, BearerToken, PersistedAuthBlob};
use serde_json::Value;
use tracing::warn;

/// Token store backed by a JSON file mirroring browser local storage.
///
/// The file is a JSON object keyed like local storage. It is read again on
/// every call so a token refreshed by the sign-in flow is picked up.
pub struct FileAuthTokenStore {
    path: PathBuf,
}

impl FileAuthTokenStore {
    /// Creates a store reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuthTokenStore for FileAuthTokenStore {
    async fn read_token(&self) -> AppResult<Option<BearerToken>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read auth storage '{}': {error}",
                    self.path.display()
                )));
            }
        };

        let storage = serde_json::from_str::<Value>(contents.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "auth storage '{}' is not valid JSON: {error}",
                self.path.display()
            ))
        })?;

        let Some(raw_blob) = storage.get(AUTH_STORAGE_KEY) else {
            return Ok(None);
        };

        match PersistedAuthBlob::parse(raw_blob) {
            Ok(blob) => Ok(blob.bearer_token()),
            Err(error) => {
                warn!(error = %error, "ignoring malformed persisted auth blob");
                Ok(None)
            }
        }
    }
}
