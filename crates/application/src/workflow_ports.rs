use async_trait::async_trait;
use atelier_core::{AppResult, BearerToken};
use serde_json::Value;

/// Port for the remote workflow engine.
#[async_trait]
pub trait WorkflowEngineGateway: Send + Sync {
    /// Lists workflow codes deployed on the engine.
    async fn list_workflow_codes(&self, token: &BearerToken) -> AppResult<Vec<String>>;

    /// Requests one manual run of a workflow and returns the engine response body.
    async fn trigger_workflow(&self, token: &BearerToken, code: &str) -> AppResult<Value>;
}

/// Port reading the bearer token persisted by the sign-in flow.
///
/// Implementations read the backing storage on every call so a token
/// refreshed elsewhere is picked up by the next request.
#[async_trait]
pub trait AuthTokenStore: Send + Sync {
    /// Returns the current token, if one is stored.
    async fn read_token(&self) -> AppResult<Option<BearerToken>>;
}
