use async_trait::async_trait;
use atelier_core::AppResult;
use atelier_domain::{
    CreateTemplateInput, MessageTemplate, TemplateCounts, TemplateFilters, TemplateGroups,
    UpdateTemplateInput,
};

/// One page of templates as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateListing {
    /// Templates matching the filters.
    pub templates: Vec<MessageTemplate>,
    /// Same templates partitioned by channel on the server.
    pub grouped: TemplateGroups,
    /// Per-channel counts.
    pub counts: TemplateCounts,
    /// Total number of templates.
    pub total: u32,
}

/// Port for the remote template API.
#[async_trait]
pub trait TemplateGateway: Send + Sync {
    /// Lists templates matching the filters.
    async fn list_templates(&self, filters: &TemplateFilters) -> AppResult<TemplateListing>;

    /// Returns one template.
    async fn find_template(&self, template_id: &str) -> AppResult<MessageTemplate>;

    /// Creates a template.
    async fn create_template(&self, input: &CreateTemplateInput) -> AppResult<MessageTemplate>;

    /// Applies a partial update.
    async fn update_template(
        &self,
        template_id: &str,
        input: &UpdateTemplateInput,
    ) -> AppResult<MessageTemplate>;

    /// Deletes (archives) a template.
    async fn delete_template(&self, template_id: &str) -> AppResult<()>;

    /// Moves a draft template to active.
    async fn activate_template(&self, template_id: &str) -> AppResult<MessageTemplate>;
}
