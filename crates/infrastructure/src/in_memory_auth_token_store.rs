use async_trait::async_trait;
use atelier_application::AuthTokenStore;
use atelier_core::{AppResult, BearerToken};
use tokio::sync::RwLock;

/// In-memory token store, used when the token comes from configuration.
#[derive(Default)]
pub struct InMemoryAuthTokenStore {
    token: RwLock<Option<BearerToken>>,
}

impl InMemoryAuthTokenStore {
    /// Creates a store holding `token`.
    #[must_use]
    pub fn new(token: Option<BearerToken>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    /// Replaces the stored token.
    pub async fn set_token(&self, token: BearerToken) {
        *self.token.write().await = Some(token);
    }

    /// Forgets the stored token.
    pub async fn clear(&self) {
        *self.token.write().await = None;
    }
}

#[async_trait]
impl AuthTokenStore for InMemoryAuthTokenStore {
    async fn read_token(&self) -> AppResult<Option<BearerToken>> {
        Ok(self.token.read().await.clone())
    }
}
