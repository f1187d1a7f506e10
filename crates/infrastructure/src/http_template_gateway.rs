use async_trait::async_trait;
use atelier_application::{TemplateGateway, TemplateListing};
use atelier_core::{AppError, AppResult};
use atelier_domain::{
    CreateTemplateInput, MessageTemplate, TemplateCounts, TemplateFilters, TemplateGroups,
    UpdateTemplateInput,
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::http_response::{error_field, parse_json, transport_error, upstream_error};

const TEMPLATE_NOT_FOUND: &str = "Template introuvable";

#[derive(Debug, Deserialize)]
struct TemplateListEnvelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    templates: Vec<MessageTemplate>,
    #[serde(default)]
    grouped: Option<TemplateGroups>,
    #[serde(default)]
    counts: Option<TemplateCounts>,
    #[serde(default)]
    total: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemplateEnvelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    template: Option<MessageTemplate>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// reqwest adapter for the template API.
pub struct HttpTemplateGateway {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpTemplateGateway {
    /// Creates a gateway whose endpoints live under `{base_url}/templates`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "template API base URL '{}' cannot hold a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push("templates")
            .extend(segments);
        Ok(url)
    }

    async fn send_for_template(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> AppResult<MessageTemplate> {
        let response = request
            .send()
            .await
            .map_err(|error| transport_error(endpoint, &error))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NotFound(
                error_field(body.as_str()).unwrap_or_else(|| TEMPLATE_NOT_FOUND.to_owned()),
            ));
        }
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let envelope = parse_json::<TemplateEnvelope>(response, endpoint).await?;
        match envelope {
            TemplateEnvelope {
                ok: true,
                template: Some(template),
                ..
            } => Ok(template),
            TemplateEnvelope { error, .. } => Err(AppError::Upstream {
                status: status.as_u16(),
                message: error,
            }),
        }
    }
}

#[async_trait]
impl TemplateGateway for HttpTemplateGateway {
    async fn list_templates(&self, filters: &TemplateFilters) -> AppResult<TemplateListing> {
        let mut url = self.endpoint(&[])?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value.as_str());
            }
        }

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|error| transport_error("template list endpoint", &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let envelope =
            parse_json::<TemplateListEnvelope>(response, "template list endpoint").await?;
        if !envelope.ok {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: envelope.error,
            });
        }

        let grouped = envelope
            .grouped
            .unwrap_or_else(|| TemplateGroups::from_templates(&envelope.templates));
        let counts = envelope
            .counts
            .unwrap_or_else(|| TemplateCounts::from_templates(&envelope.templates));
        let total = envelope
            .total
            .unwrap_or_else(|| u32::try_from(envelope.templates.len()).unwrap_or(u32::MAX));
        debug!(count = envelope.templates.len(), total, "templates fetched");

        Ok(TemplateListing {
            templates: envelope.templates,
            grouped,
            counts,
            total,
        })
    }

    async fn find_template(&self, template_id: &str) -> AppResult<MessageTemplate> {
        let url = self.endpoint(&[template_id])?;
        self.send_for_template(self.http_client.get(url), "template endpoint")
            .await
            .map_err(|error| match error {
                AppError::Upstream {
                    message: None,
                    ..
                } => AppError::NotFound(TEMPLATE_NOT_FOUND.to_owned()),
                other => other,
            })
    }

    async fn create_template(&self, input: &CreateTemplateInput) -> AppResult<MessageTemplate> {
        let url = self.endpoint(&[])?;
        self.send_for_template(
            self.http_client.post(url).json(input),
            "template create endpoint",
        )
        .await
    }

    async fn update_template(
        &self,
        template_id: &str,
        input: &UpdateTemplateInput,
    ) -> AppResult<MessageTemplate> {
        let url = self.endpoint(&[template_id])?;
        self.send_for_template(
            self.http_client.patch(url).json(input),
            "template update endpoint",
        )
        .await
    }

    async fn delete_template(&self, template_id: &str) -> AppResult<()> {
        let url = self.endpoint(&[template_id])?;
        let response = self
            .http_client
            .delete(url)
            .send()
            .await
            .map_err(|error| transport_error("template delete endpoint", &error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let envelope = parse_json::<AckEnvelope>(response, "template delete endpoint").await?;
        if !envelope.ok {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: envelope.error,
            });
        }

        Ok(())
    }

    async fn activate_template(&self, template_id: &str) -> AppResult<MessageTemplate> {
        let url = self.endpoint(&[template_id, "activate"])?;
        self.send_for_template(self.http_client.post(url), "template activate endpoint")
            .await
    }
}
