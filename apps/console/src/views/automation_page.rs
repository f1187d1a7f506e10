use std::sync::Arc;

use atelier_application::{TemplateStore, WorkflowOperation, WorkflowStore};
use atelier_domain::{
    AutomationFilters, Channel, TemplateStatus, WorkflowStatus, WorkflowTriggerType,
};
use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use super::auto_guard_config::AutoGuardConfigView;
use super::templates_section::{TemplatesSectionState, TemplatesSectionView};
use super::workflow_card::{WorkflowCardView, format_timestamp};
use super::workflow_detail::WorkflowDetailView;

/// Filter fields being edited, applied on "Apply".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/filter-draft-view.ts"
)]
pub struct FilterDraftView {
    pub statuses: Vec<String>,
    pub trigger_types: Vec<String>,
    pub search: String,
    pub has_pending_changes: bool,
    pub applied_filter_count: u32,
}

/// Dismissible banner for a workflow failure; only list failures offer a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/error-banner-view.ts"
)]
pub struct ErrorBannerView {
    pub message: String,
    pub can_retry: bool,
}

/// Confirmation of the last accepted manual run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/trigger-notice-view.ts"
)]
pub struct TriggerNoticeView {
    pub code: String,
    pub triggered_at: String,
}

/// Whole automation page.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/automation-page-view.ts"
)]
pub struct AutomationPageView {
    pub workflows: Vec<WorkflowCardView>,
    pub total: u32,
    pub visible_count: u32,
    pub is_loading: bool,
    pub filters: FilterDraftView,
    pub error_banner: Option<ErrorBannerView>,
    pub auto_guard: Option<AutoGuardConfigView>,
    pub detail: Option<WorkflowDetailView>,
    pub is_loading_detail: bool,
    pub last_trigger: Option<TriggerNoticeView>,
    pub templates: TemplatesSectionView,
}

/// Automation page controller: both stores plus local UI state.
pub struct AutomationPage {
    workflows: Arc<WorkflowStore>,
    templates: Arc<TemplateStore>,
    draft_filters: AutomationFilters,
    templates_section: TemplatesSectionState,
}

impl AutomationPage {
    pub fn new(workflows: Arc<WorkflowStore>, templates: Arc<TemplateStore>) -> Self {
        Self {
            workflows,
            templates,
            draft_filters: AutomationFilters::default(),
            templates_section: TemplatesSectionState::default(),
        }
    }

    /// Initial loads when the page opens.
    pub async fn mount(&self) {
        self.workflows.load_auto_guard_config();
        tokio::join!(
            self.workflows.load_workflows(),
            self.templates.load_templates()
        );
    }

    pub fn draft_filters(&self) -> &AutomationFilters {
        &self.draft_filters
    }

    pub fn toggle_draft_status(&mut self, status: WorkflowStatus) {
        toggle_member(&mut self.draft_filters.status, status);
    }

    pub fn toggle_draft_trigger_type(&mut self, trigger_type: WorkflowTriggerType) {
        toggle_member(&mut self.draft_filters.trigger_type, trigger_type);
    }

    pub fn set_draft_search(&mut self, search: &str) {
        let search = search.trim();
        self.draft_filters.search = (!search.is_empty()).then(|| search.to_owned());
    }

    /// Sends the draft filters to the store, which reloads the list.
    pub async fn apply_filters(&self) {
        info!(filters = ?self.draft_filters, "applying workflow filters");
        self.workflows.set_filters(self.draft_filters.clone()).await;
    }

    pub async fn reset_filters(&mut self) {
        self.draft_filters = AutomationFilters::default();
        self.workflows.clear_filters().await;
    }

    pub fn dismiss_error(&self) {
        self.workflows.clear_error();
    }

    pub async fn retry(&self) {
        self.workflows.clear_error();
        self.workflows.load_workflows().await;
    }

    pub fn select_workflow(&self, workflow_id: &str) {
        self.workflows.load_workflow_detail(workflow_id);
    }

    pub fn close_detail(&self) {
        self.workflows.clear_selected_workflow();
    }

    pub async fn trigger_workflow(&self, workflow_id: &str) -> bool {
        self.workflows.toggle_workflow_status(workflow_id).await
    }

    pub async fn set_template_channel(&self, channel: Option<Channel>) {
        self.templates.set_channel_filter(channel).await;
    }

    pub async fn set_template_status(&self, status: Option<TemplateStatus>) {
        self.templates.set_status_filter(status).await;
    }

    /// Stores the search term and reloads; the store itself never reloads on search.
    pub async fn search_templates(&self, search: &str) {
        self.templates.set_search_term(search.trim());
        self.templates.load_templates().await;
    }

    pub async fn open_template(&self, template_id: &str) {
        self.templates.load_template_by_id(template_id).await;
    }

    pub fn close_template(&self) {
        self.templates.clear_selected_template();
    }

    pub async fn activate_template(&self, template_id: &str) -> bool {
        self.templates.activate_template(template_id).await
    }

    pub async fn delete_template(&self, template_id: &str) -> bool {
        self.templates.delete_template(template_id).await
    }

    pub fn toggle_template_channel(&mut self, channel: Channel) {
        self.templates_section.toggle(channel);
    }

    pub fn view(&self) -> AutomationPageView {
        let workflow_state = self.workflows.snapshot();
        let template_state = self.templates.snapshot();
        let selected_id = workflow_state
            .selected_workflow
            .as_ref()
            .map(|workflow| workflow.id.as_str());

        let cards = workflow_state
            .visible_workflows()
            .into_iter()
            .map(|workflow| {
                WorkflowCardView::build(
                    workflow,
                    workflow_state.triggering.contains(&workflow.id),
                    selected_id == Some(workflow.id.as_str()),
                )
            })
            .collect::<Vec<_>>();

        let applied_filter_count = [
            workflow_state.filters.status.is_some(),
            workflow_state.filters.trigger_type.is_some(),
            workflow_state.filters.search.is_some(),
        ]
        .into_iter()
        .filter(|is_set| *is_set)
        .count();

        AutomationPageView {
            total: u32::try_from(workflow_state.total).unwrap_or(u32::MAX),
            visible_count: u32::try_from(cards.len()).unwrap_or(u32::MAX),
            workflows: cards,
            is_loading: workflow_state.is_loading,
            filters: FilterDraftView {
                statuses: self
                    .draft_filters
                    .status
                    .iter()
                    .flatten()
                    .map(|status| status.as_str().to_owned())
                    .collect(),
                trigger_types: self
                    .draft_filters
                    .trigger_type
                    .iter()
                    .flatten()
                    .map(|trigger_type| trigger_type.as_str().to_owned())
                    .collect(),
                search: self.draft_filters.search.clone().unwrap_or_default(),
                has_pending_changes: self.draft_filters != workflow_state.filters,
                applied_filter_count: u32::try_from(applied_filter_count).unwrap_or(u32::MAX),
            },
            error_banner: workflow_state.error.as_ref().map(|message| ErrorBannerView {
                message: message.clone(),
                can_retry: workflow_state.failed_operation == Some(WorkflowOperation::LoadList),
            }),
            auto_guard: workflow_state
                .auto_guard
                .as_ref()
                .map(AutoGuardConfigView::build),
            detail: workflow_state
                .selected_workflow
                .as_ref()
                .map(|workflow| WorkflowDetailView::build(workflow, &template_state)),
            is_loading_detail: workflow_state.is_loading_detail,
            last_trigger: workflow_state
                .last_trigger
                .as_ref()
                .map(|record| TriggerNoticeView {
                    code: record.code.clone(),
                    triggered_at: format_timestamp(&record.triggered_at),
                }),
            templates: self.templates_section.build(&template_state),
        }
    }
}

fn toggle_member<T: PartialEq + Ord>(set: &mut Option<Vec<T>>, value: T) {
    let members = set.get_or_insert_with(Vec::new);
    match members.iter().position(|member| *member == value) {
        Some(index) => {
            members.remove(index);
        }
        None => {
            members.push(value);
            members.sort();
        }
    }

    if members.is_empty() {
        *set = None;
    }
}

#[cfg(test)]
mod tests;
