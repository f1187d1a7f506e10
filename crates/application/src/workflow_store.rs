use std::collections::BTreeSet;
use std::sync::Arc;

use atelier_core::{AppError, AppResult, BearerToken};
use atelier_domain::{
    AutoGuardConfig, AutomationFilters, Workflow, materialize_detail, materialize_summary,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::request_sequence::RequestSequence;
use crate::workflow_ports::{AuthTokenStore, WorkflowEngineGateway};

/// Error recorded when no bearer token is stored.
pub const NOT_AUTHENTICATED: &str = "Non authentifié";

const LOAD_WORKFLOWS_FAILED: &str = "Erreur lors du chargement des workflows";
const TRIGGER_WORKFLOW_FAILED: &str = "Erreur lors du déclenchement du workflow";
const MISSING_WORKFLOW_ID: &str = "Identifiant de workflow manquant";

/// Last successful manual trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTriggerRecord {
    /// Triggered workflow code.
    pub code: String,
    /// Local time the engine accepted the request.
    pub triggered_at: DateTime<Utc>,
    /// Engine response body.
    pub response: Value,
}

/// Store action whose failure is recorded in `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOperation {
    /// Workflow list load.
    LoadList,
    /// Detail panel load.
    LoadDetail,
    /// Manual trigger.
    Trigger,
}

/// Observable workflow state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowStoreState {
    /// Workflows from the last successful list load.
    pub workflows: Vec<Workflow>,
    /// Number of workflows returned by the engine.
    pub total: usize,
    /// Workflow opened in the detail panel.
    pub selected_workflow: Option<Workflow>,
    /// Current list filters.
    pub filters: AutomationFilters,
    /// Displayed guard policy.
    pub auto_guard: Option<AutoGuardConfig>,
    /// List load in flight.
    pub is_loading: bool,
    /// Detail load in flight.
    pub is_loading_detail: bool,
    /// Workflow codes with a trigger request in flight.
    pub triggering: BTreeSet<String>,
    /// Last successful manual trigger.
    pub last_trigger: Option<WorkflowTriggerRecord>,
    /// Last recorded failure.
    pub error: Option<String>,
    /// Action that recorded `error`.
    pub failed_operation: Option<WorkflowOperation>,
}

impl WorkflowStoreState {
    /// Returns workflows passing the current filters.
    #[must_use]
    pub fn visible_workflows(&self) -> Vec<&Workflow> {
        self.workflows
            .iter()
            .filter(|workflow| self.filters.matches(workflow))
            .collect()
    }

    fn record_failure(&mut self, operation: WorkflowOperation, message: String) {
        self.error = Some(message);
        self.failed_operation = Some(operation);
    }

    fn clear_failure(&mut self) {
        self.error = None;
        self.failed_operation = None;
    }
}

/// Client-side store synchronizing engine workflows into observable state.
///
/// Action methods absorb every failure into `error`; none of them returns an
/// error to the caller.
pub struct WorkflowStore {
    engine: Arc<dyn WorkflowEngineGateway>,
    token_store: Arc<dyn AuthTokenStore>,
    state: watch::Sender<WorkflowStoreState>,
    list_requests: RequestSequence,
}

impl WorkflowStore {
    /// Creates a store with empty state.
    #[must_use]
    pub fn new(
        engine: Arc<dyn WorkflowEngineGateway>,
        token_store: Arc<dyn AuthTokenStore>,
    ) -> Self {
        Self {
            engine,
            token_store,
            state: watch::Sender::new(WorkflowStoreState::default()),
            list_requests: RequestSequence::new(),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorkflowStoreState {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkflowStoreState> {
        self.state.subscribe()
    }

    /// Reloads the workflow list from the engine, replacing the current list.
    pub async fn load_workflows(&self) {
        let ticket = self.list_requests.issue();
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.clear_failure();
        });

        let result = self.fetch_workflows().await;

        if !self.list_requests.is_current(ticket) {
            debug!("discarding stale workflow list response");
            return;
        }

        match result {
            Ok(workflows) => {
                info!(count = workflows.len(), "workflows loaded");
                self.state.send_modify(|state| {
                    state.total = workflows.len();
                    state.workflows = workflows;
                    state.is_loading = false;
                });
            }
            Err(error) => {
                warn!(error = %error, "failed to load workflows");
                let message = match error {
                    AppError::Upstream { .. } => LOAD_WORKFLOWS_FAILED.to_owned(),
                    other => other.user_message(LOAD_WORKFLOWS_FAILED),
                };
                self.state.send_modify(|state| {
                    state.record_failure(WorkflowOperation::LoadList, message);
                    state.is_loading = false;
                });
            }
        }
    }

    /// Stores the guard policy shown by the panel.
    pub fn load_auto_guard_config(&self) {
        self.state.send_modify(|state| {
            state.auto_guard = Some(AutoGuardConfig::placeholder());
        });
    }

    /// Opens the full workflow record for one code.
    pub fn load_workflow_detail(&self, workflow_id: &str) {
        self.state.send_modify(|state| {
            state.is_loading_detail = true;
            state.clear_failure();
        });

        let workflow_id = workflow_id.trim();
        if workflow_id.is_empty() {
            self.state.send_modify(|state| {
                state.record_failure(
                    WorkflowOperation::LoadDetail,
                    MISSING_WORKFLOW_ID.to_owned(),
                );
                state.is_loading_detail = false;
            });
            return;
        }

        let workflow = materialize_detail(workflow_id);
        debug!(workflow_id, actions = workflow.actions.len(), "workflow detail loaded");
        self.state.send_modify(|state| {
            state.selected_workflow = Some(workflow);
            state.is_loading_detail = false;
        });
    }

    /// Asks the engine for one manual run of the workflow.
    ///
    /// The engine has no enable/disable operation, so the local `status`
    /// field is left untouched. Returns whether the engine accepted the run.
    pub async fn toggle_workflow_status(&self, workflow_id: &str) -> bool {
        let token = match self.require_token().await {
            Ok(token) => token,
            Err(error) => {
                warn!(workflow_id, error = %error, "workflow trigger skipped");
                self.state.send_modify(|state| {
                    state.record_failure(
                        WorkflowOperation::Trigger,
                        error.user_message(TRIGGER_WORKFLOW_FAILED),
                    );
                });
                return false;
            }
        };

        let mut already_running = false;
        self.state.send_if_modified(|state| {
            if !state.triggering.insert(workflow_id.to_owned()) {
                already_running = true;
                return false;
            }
            state.clear_failure();
            true
        });
        if already_running {
            debug!(workflow_id, "workflow trigger already in flight");
            return false;
        }

        let result = self.engine.trigger_workflow(&token, workflow_id).await;

        match result {
            Ok(response) => {
                info!(workflow_id, "workflow triggered");
                self.state.send_modify(|state| {
                    state.triggering.remove(workflow_id);
                    state.last_trigger = Some(WorkflowTriggerRecord {
                        code: workflow_id.to_owned(),
                        triggered_at: Utc::now(),
                        response,
                    });
                });
                true
            }
            Err(error) => {
                warn!(workflow_id, error = %error, "failed to trigger workflow");
                self.state.send_modify(|state| {
                    state.triggering.remove(workflow_id);
                    state.record_failure(
                        WorkflowOperation::Trigger,
                        error.user_message(TRIGGER_WORKFLOW_FAILED),
                    );
                });
                false
            }
        }
    }

    /// Replaces the filters and reloads the list.
    pub async fn set_filters(&self, filters: AutomationFilters) {
        self.state.send_modify(|state| state.filters = filters);
        self.load_workflows().await;
    }

    /// Clears the filters and reloads the list.
    pub async fn clear_filters(&self) {
        self.set_filters(AutomationFilters::default()).await;
    }

    /// Closes the detail panel.
    pub fn clear_selected_workflow(&self) {
        self.state.send_modify(|state| state.selected_workflow = None);
    }

    /// Dismisses the recorded error.
    pub fn clear_error(&self) {
        self.state.send_modify(WorkflowStoreState::clear_failure);
    }

    async fn fetch_workflows(&self) -> AppResult<Vec<Workflow>> {
        let token = self.require_token().await?;
        let codes = self.engine.list_workflow_codes(&token).await?;

        Ok(codes
            .iter()
            .map(|code| materialize_summary(code.as_str()))
            .collect())
    }

    async fn require_token(&self) -> AppResult<BearerToken> {
        self.token_store
            .read_token()
            .await?
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_owned()))
    }
}

#[cfg(test)]
mod tests;
