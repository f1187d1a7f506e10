use async_trait::async_trait;
use atelier_application::WorkflowEngineGateway;
use atelier_core::{AppResult, BearerToken};
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http_response::{parse_json, transport_error, upstream_error};

#[derive(Debug, Deserialize)]
struct WorkflowCodeListResponse {
    #[serde(default)]
    list: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TriggerWorkflowRequest<'a> {
    code: &'a str,
    mode: &'static str,
    payload: Value,
}

/// reqwest adapter for the n8n-backed workflow engine.
pub struct HttpWorkflowEngineGateway {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpWorkflowEngineGateway {
    /// Creates a gateway targeting `base_url`, without trailing slash.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl WorkflowEngineGateway for HttpWorkflowEngineGateway {
    async fn list_workflow_codes(&self, token: &BearerToken) -> AppResult<Vec<String>> {
        let endpoint = format!("{}/n8n/workflows", self.base_url);
        let response = self
            .http_client
            .get(endpoint.as_str())
            .header(header::AUTHORIZATION, token.authorization_header())
            .send()
            .await
            .map_err(|error| transport_error("workflow list endpoint", &error))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body =
            parse_json::<WorkflowCodeListResponse>(response, "workflow list endpoint").await?;
        debug!(count = body.list.len(), "workflow codes fetched");
        Ok(body.list)
    }

    async fn trigger_workflow(&self, token: &BearerToken, code: &str) -> AppResult<Value> {
        let endpoint = format!("{}/n8n/trigger", self.base_url);
        let response = self
            .http_client
            .post(endpoint.as_str())
            .header(header::AUTHORIZATION, token.authorization_header())
            .header("X-Preview", "false")
            .json(&TriggerWorkflowRequest {
                code,
                mode: "manual",
                payload: Value::Object(serde_json::Map::new()),
            })
            .send()
            .await
            .map_err(|error| transport_error("workflow trigger endpoint", &error))?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|error| transport_error("workflow trigger endpoint", &error))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(body.as_str()).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use atelier_application::WorkflowEngineGateway;
    use atelier_core::{AppError, BearerToken};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    use super::HttpWorkflowEngineGateway;

    #[derive(Default)]
    struct Recorded {
        authorization: Vec<String>,
        preview: Vec<String>,
        bodies: Vec<Value>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn list_handler(State(recorded): State<Shared>, headers: HeaderMap) -> Json<Value> {
        let authorization = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        recorded.lock().await.authorization.push(authorization);
        Json(json!({"list": ["wf-tag-chaud", "wf-relance-j3"]}))
    }

    async fn trigger_handler(
        State(recorded): State<Shared>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let preview = headers
            .get("x-preview")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let mut recorded = recorded.lock().await;
        recorded.preview.push(preview);
        recorded.bodies.push(body.clone());

        if body["code"] == "wf-missing" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Workflow introuvable"})),
            );
        }
        (StatusCode::OK, Json(json!({"executionId": "exec-9"})))
    }

    async fn serve(recorded: Shared) -> String {
        let router = Router::new()
            .route("/n8n/workflows", get(list_handler))
            .route("/n8n/trigger", post(trigger_handler))
            .with_state(recorded);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{address}/")
    }

    fn token() -> BearerToken {
        BearerToken::new("abc").unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn lists_codes_with_bearer_token() {
        let recorded = Shared::default();
        let base_url = serve(recorded.clone()).await;
        let gateway = HttpWorkflowEngineGateway::new(reqwest::Client::new(), base_url);

        let codes = gateway.list_workflow_codes(&token()).await;

        assert_eq!(
            codes.unwrap_or_default(),
            vec!["wf-tag-chaud".to_owned(), "wf-relance-j3".to_owned()]
        );
        assert_eq!(recorded.lock().await.authorization, vec!["Bearer abc"]);
    }

    #[tokio::test]
    async fn trigger_posts_manual_mode_without_preview() {
        let recorded = Shared::default();
        let base_url = serve(recorded.clone()).await;
        let gateway = HttpWorkflowEngineGateway::new(reqwest::Client::new(), base_url);

        let response = gateway.trigger_workflow(&token(), "wf-tag-chaud").await;

        assert_eq!(
            response.unwrap_or_default(),
            json!({"executionId": "exec-9"})
        );
        let recorded = recorded.lock().await;
        assert_eq!(recorded.preview, vec!["false"]);
        assert_eq!(
            recorded.bodies,
            vec![json!({"code": "wf-tag-chaud", "mode": "manual", "payload": {}})]
        );
    }

    #[tokio::test]
    async fn trigger_failure_carries_server_error_message() {
        let recorded = Shared::default();
        let base_url = serve(recorded).await;
        let gateway = HttpWorkflowEngineGateway::new(reqwest::Client::new(), base_url);

        let response = gateway.trigger_workflow(&token(), "wf-missing").await;

        assert!(matches!(
            response,
            Err(AppError::Upstream {
                status: 404,
                message: Some(ref message),
            }) if message == "Workflow introuvable"
        ));
    }
}
