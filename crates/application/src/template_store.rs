use std::sync::Arc;

use atelier_domain::{
    Channel, CreateTemplateInput, MessageTemplate, TemplateCounts, TemplateFilters,
    TemplateGroups, TemplateStatus, UpdateTemplateInput,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::request_sequence::RequestSequence;
use crate::template_ports::TemplateGateway;

const LOAD_TEMPLATES_FAILED: &str = "Erreur lors du chargement des templates";
const TEMPLATE_NOT_FOUND: &str = "Template introuvable";
const CREATE_TEMPLATE_FAILED: &str = "Erreur lors de la création du template";
const UPDATE_TEMPLATE_FAILED: &str = "Erreur lors de la mise à jour du template";
const DELETE_TEMPLATE_FAILED: &str = "Erreur lors de la suppression du template";
const ACTIVATE_TEMPLATE_FAILED: &str = "Erreur lors de l'activation du template";

/// Observable template state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStoreState {
    /// Templates from the last successful list load, patched locally since.
    pub templates: Vec<MessageTemplate>,
    /// Templates partitioned by channel.
    pub grouped: TemplateGroups,
    /// Per-channel counts from the last list load.
    pub counts: TemplateCounts,
    /// Total from the last list load.
    pub total: u32,
    /// Template opened for preview or edition.
    pub selected_template: Option<MessageTemplate>,
    /// Filters sent with the next list load.
    pub filters: TemplateFilters,
    /// List load in flight.
    pub is_loading: bool,
    /// Single template load in flight.
    pub is_loading_template: bool,
    /// Create, update, delete or activate in flight.
    pub is_saving: bool,
    /// Last recorded failure.
    pub error: Option<String>,
}

impl TemplateStoreState {
    fn patch_template(&mut self, updated: &MessageTemplate) {
        if let Some(existing) = self
            .templates
            .iter_mut()
            .find(|template| template.id == updated.id)
        {
            *existing = updated.clone();
        }
        self.grouped.replace(updated);
        if self
            .selected_template
            .as_ref()
            .is_some_and(|selected| selected.id == updated.id)
        {
            self.selected_template = Some(updated.clone());
        }
    }
}

/// Client-side store synchronizing the template API into observable state.
///
/// Action methods absorb every failure into `error` and report success
/// through their return value only.
pub struct TemplateStore {
    gateway: Arc<dyn TemplateGateway>,
    state: watch::Sender<TemplateStoreState>,
    list_requests: RequestSequence,
    detail_requests: RequestSequence,
}

impl TemplateStore {
    /// Creates a store with empty state and no filters.
    #[must_use]
    pub fn new(gateway: Arc<dyn TemplateGateway>) -> Self {
        Self {
            gateway,
            state: watch::Sender::new(TemplateStoreState::default()),
            list_requests: RequestSequence::new(),
            detail_requests: RequestSequence::new(),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> TemplateStoreState {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TemplateStoreState> {
        self.state.subscribe()
    }

    /// Reloads templates with the current filters.
    ///
    /// A failed load keeps the previously loaded templates.
    pub async fn load_templates(&self) {
        let ticket = self.list_requests.issue();
        let filters = self.state.borrow().filters.clone();
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.gateway.list_templates(&filters).await;

        if !self.list_requests.is_current(ticket) {
            debug!("discarding stale template list response");
            return;
        }

        match result {
            Ok(listing) => {
                info!(
                    count = listing.templates.len(),
                    total = listing.total,
                    "templates loaded"
                );
                self.state.send_modify(|state| {
                    state.templates = listing.templates;
                    state.grouped = listing.grouped;
                    state.counts = listing.counts;
                    state.total = listing.total;
                    state.is_loading = false;
                });
            }
            Err(error) => {
                warn!(error = %error, "failed to load templates");
                self.state.send_modify(|state| {
                    state.error = Some(error.user_message(LOAD_TEMPLATES_FAILED));
                    state.is_loading = false;
                });
            }
        }
    }

    /// Loads one template into `selected_template`.
    pub async fn load_template_by_id(&self, template_id: &str) {
        let ticket = self.detail_requests.issue();
        self.state.send_modify(|state| {
            state.is_loading_template = true;
            state.error = None;
        });

        let result = self.gateway.find_template(template_id).await;

        if !self.detail_requests.is_current(ticket) {
            debug!(template_id, "discarding stale template response");
            return;
        }

        match result {
            Ok(template) => {
                self.state.send_modify(|state| {
                    state.selected_template = Some(template);
                    state.is_loading_template = false;
                });
            }
            Err(error) => {
                warn!(template_id, error = %error, "failed to load template");
                self.state.send_modify(|state| {
                    state.error = Some(error.user_message(TEMPLATE_NOT_FOUND));
                    state.is_loading_template = false;
                });
            }
        }
    }

    /// Creates a template then reloads the whole list.
    pub async fn create_template(&self, input: CreateTemplateInput) -> Option<MessageTemplate> {
        let input = match input.validated() {
            Ok(input) => input,
            Err(error) => {
                self.record_error(error.user_message(CREATE_TEMPLATE_FAILED));
                return None;
            }
        };

        self.begin_saving();
        let result = self.gateway.create_template(&input).await;
        self.state.send_modify(|state| state.is_saving = false);

        match result {
            Ok(template) => {
                info!(template_id = %template.id, channel = template.channel.as_str(), "template created");
                self.load_templates().await;
                Some(template)
            }
            Err(error) => {
                warn!(error = %error, "failed to create template");
                self.record_error(error.user_message(CREATE_TEMPLATE_FAILED));
                None
            }
        }
    }

    /// Applies a partial update and patches the local copies in place.
    pub async fn update_template(
        &self,
        template_id: &str,
        input: UpdateTemplateInput,
    ) -> Option<MessageTemplate> {
        self.begin_saving();
        let result = self.gateway.update_template(template_id, &input).await;

        match result {
            Ok(template) => {
                info!(template_id, "template updated");
                self.state.send_modify(|state| {
                    state.patch_template(&template);
                    state.is_saving = false;
                });
                Some(template)
            }
            Err(error) => {
                warn!(template_id, error = %error, "failed to update template");
                self.state.send_modify(|state| {
                    state.error = Some(error.user_message(UPDATE_TEMPLATE_FAILED));
                    state.is_saving = false;
                });
                None
            }
        }
    }

    /// Deletes a template, drops it locally at once, then reloads to resync counts.
    pub async fn delete_template(&self, template_id: &str) -> bool {
        self.begin_saving();
        let result = self.gateway.delete_template(template_id).await;

        match result {
            Ok(()) => {
                info!(template_id, "template deleted");
                self.state.send_modify(|state| {
                    state.templates.retain(|template| template.id != template_id);
                    state.grouped.remove(template_id);
                    if state
                        .selected_template
                        .as_ref()
                        .is_some_and(|selected| selected.id == template_id)
                    {
                        state.selected_template = None;
                    }
                    state.is_saving = false;
                });
                self.load_templates().await;
                true
            }
            Err(error) => {
                warn!(template_id, error = %error, "failed to delete template");
                self.state.send_modify(|state| {
                    state.error = Some(error.user_message(DELETE_TEMPLATE_FAILED));
                    state.is_saving = false;
                });
                false
            }
        }
    }

    /// Activates a draft template and marks it active locally, without refetching.
    pub async fn activate_template(&self, template_id: &str) -> bool {
        self.begin_saving();
        let result = self.gateway.activate_template(template_id).await;

        match result {
            Ok(template) => {
                info!(template_id, "template activated");
                self.state.send_modify(|state| {
                    let mut activated = state
                        .templates
                        .iter()
                        .find(|existing| existing.id == template_id)
                        .cloned()
                        .unwrap_or(template);
                    activated.status = TemplateStatus::Active;
                    state.patch_template(&activated);
                    state.is_saving = false;
                });
                true
            }
            Err(error) => {
                warn!(template_id, error = %error, "failed to activate template");
                self.state.send_modify(|state| {
                    state.error = Some(error.user_message(ACTIVATE_TEMPLATE_FAILED));
                    state.is_saving = false;
                });
                false
            }
        }
    }

    /// Sets the channel filter and reloads.
    pub async fn set_channel_filter(&self, channel: Option<Channel>) {
        self.state.send_modify(|state| state.filters.channel = channel);
        self.load_templates().await;
    }

    /// Sets the status filter and reloads.
    pub async fn set_status_filter(&self, status: Option<TemplateStatus>) {
        self.state.send_modify(|state| state.filters.status = status);
        self.load_templates().await;
    }

    /// Sets the search term without reloading; callers debounce and call
    /// [`TemplateStore::load_templates`] themselves.
    pub fn set_search_term(&self, search: impl Into<String>) {
        let search = search.into();
        self.state.send_modify(|state| state.filters.search = search);
    }

    /// Closes the selected template.
    pub fn clear_selected_template(&self) {
        self.state.send_modify(|state| state.selected_template = None);
    }

    /// Dismisses the recorded error.
    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    fn begin_saving(&self) {
        self.state.send_modify(|state| {
            state.is_saving = true;
            state.error = None;
        });
    }

    fn record_error(&self, message: String) {
        self.state.send_modify(|state| state.error = Some(message));
    }
}
