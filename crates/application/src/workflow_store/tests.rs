use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::{Mutex, oneshot};

use atelier_core::{AppError, AppResult, BearerToken};
use atelier_domain::{
    AutomationFilters, GENERIC_WORKFLOW_DESCRIPTION, WorkflowStatus, WorkflowTriggerType,
};

use crate::workflow_ports::{AuthTokenStore, WorkflowEngineGateway};

use super::{NOT_AUTHENTICATED, WorkflowOperation, WorkflowStore};

struct ScriptedList {
    gate: Option<oneshot::Receiver<()>>,
    codes: Option<Vec<String>>,
}

#[derive(Default)]
struct FakeWorkflowEngine {
    list_scripts: Mutex<VecDeque<ScriptedList>>,
    list_calls: Mutex<usize>,
    trigger_calls: Mutex<Vec<String>>,
    trigger_gates: Mutex<VecDeque<Option<oneshot::Receiver<()>>>>,
    trigger_error: Option<String>,
}

impl FakeWorkflowEngine {
    fn with_codes(codes: &[&str]) -> Self {
        let engine = Self::default();
        engine.push_list(None, Some(codes));
        engine
    }

    fn push_list(&self, gate: Option<oneshot::Receiver<()>>, codes: Option<&[&str]>) {
        let script = ScriptedList {
            gate,
            codes: codes.map(|codes| codes.iter().map(|code| (*code).to_owned()).collect()),
        };
        if let Ok(mut scripts) = self.list_scripts.try_lock() {
            scripts.push_back(script);
        }
    }
}

#[async_trait]
impl WorkflowEngineGateway for FakeWorkflowEngine {
    async fn list_workflow_codes(&self, token: &BearerToken) -> AppResult<Vec<String>> {
        assert_eq!(token.as_str(), "token-123");
        *self.list_calls.lock().await += 1;

        let script = self.list_scripts.lock().await.pop_front();
        let Some(script) = script else {
            return Ok(Vec::new());
        };

        if let Some(gate) = script.gate {
            let _ = gate.await;
        }

        script.codes.ok_or(AppError::Upstream {
            status: 500,
            message: Some("engine exploded".to_owned()),
        })
    }

    async fn trigger_workflow(&self, _token: &BearerToken, code: &str) -> AppResult<Value> {
        self.trigger_calls.lock().await.push(code.to_owned());
        let gate = self.trigger_gates.lock().await.pop_front().flatten();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match &self.trigger_error {
            Some(message) => Err(AppError::Upstream {
                status: 422,
                message: Some(message.clone()),
            }),
            None => Ok(json!({"executionId": "exec-1"})),
        }
    }
}

struct FakeTokenStore {
    token: Option<BearerToken>,
}

#[async_trait]
impl AuthTokenStore for FakeTokenStore {
    async fn read_token(&self) -> AppResult<Option<BearerToken>> {
        Ok(self.token.clone())
    }
}

fn signed_in() -> Arc<FakeTokenStore> {
    Arc::new(FakeTokenStore {
        token: BearerToken::new("token-123").ok(),
    })
}

fn signed_out() -> Arc<FakeTokenStore> {
    Arc::new(FakeTokenStore { token: None })
}

async fn wait_for_list_calls(engine: &FakeWorkflowEngine, expected: usize) {
    while *engine.list_calls.lock().await < expected {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn load_workflows_materializes_catalog_entries() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&["wf-tag-chaud"]));
    let store = WorkflowStore::new(engine, signed_in());

    store.load_workflows().await;

    let state = store.snapshot();
    assert_eq!(state.total, 1);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    let workflow = &state.workflows[0];
    assert_eq!(workflow.name, "Tag automatique leads chauds");
    assert_eq!(workflow.status, WorkflowStatus::Active);
    assert_eq!(workflow.trigger.trigger_type, WorkflowTriggerType::LeadScored);
}

#[tokio::test]
async fn load_workflows_falls_back_for_unknown_codes() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&["wf-inconnu"]));
    let store = WorkflowStore::new(engine, signed_in());

    store.load_workflows().await;
    store.load_workflow_detail("wf-inconnu");

    let state = store.snapshot();
    assert_eq!(state.workflows[0].name, "wf-inconnu");
    assert_eq!(state.workflows[0].description, GENERIC_WORKFLOW_DESCRIPTION);
    let detail = state.selected_workflow.unwrap_or_else(|| unreachable!());
    assert_eq!(detail.name, "wf-inconnu");
    assert_eq!(detail.description, GENERIC_WORKFLOW_DESCRIPTION);
}

#[tokio::test]
async fn load_workflows_replaces_instead_of_merging() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&[
        "wf-tag-chaud",
        "wf-relance-j3",
    ]));
    engine.push_list(None, Some(&["wf-rappel-rdv"]));
    let store = WorkflowStore::new(engine, signed_in());

    store.load_workflows().await;
    store.load_workflows().await;

    let state = store.snapshot();
    assert_eq!(state.total, 1);
    assert_eq!(state.workflows[0].id, "wf-rappel-rdv");
}

#[tokio::test]
async fn load_workflows_without_token_records_error_without_network_call() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&["wf-tag-chaud"]));
    let store = WorkflowStore::new(engine.clone(), signed_out());

    store.load_workflows().await;

    let state = store.snapshot();
    assert_eq!(state.error.as_deref(), Some(NOT_AUTHENTICATED));
    assert!(!state.is_loading);
    assert_eq!(*engine.list_calls.lock().await, 0);
}

#[tokio::test]
async fn failed_list_keeps_previous_workflows_and_reports_generic_error() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&["wf-tag-chaud"]));
    engine.push_list(None, None);
    let store = WorkflowStore::new(engine, signed_in());

    store.load_workflows().await;
    store.load_workflows().await;

    let state = store.snapshot();
    assert_eq!(
        state.error.as_deref(),
        Some("Erreur lors du chargement des workflows")
    );
    assert_eq!(state.workflows.len(), 1);
}

#[tokio::test]
async fn stale_list_response_is_discarded() {
    let engine = Arc::new(FakeWorkflowEngine::default());
    let (release_first, first_gate) = oneshot::channel();
    engine.push_list(Some(first_gate), Some(&["wf-changement-statut"]));
    engine.push_list(None, Some(&["wf-tag-chaud"]));
    let store = WorkflowStore::new(engine.clone(), signed_in());

    let first = store.load_workflows();
    let second = async {
        wait_for_list_calls(&engine, 1).await;
        store.load_workflows().await;
        let _ = release_first.send(());
    };
    tokio::join!(first, second);

    let state = store.snapshot();
    assert_eq!(state.workflows.len(), 1);
    assert_eq!(state.workflows[0].id, "wf-tag-chaud");
    assert!(!state.is_loading);
}

#[tokio::test]
async fn toggle_without_token_fails_before_any_network_call() {
    let engine = Arc::new(FakeWorkflowEngine::default());
    let store = WorkflowStore::new(engine.clone(), signed_out());

    let accepted = store.toggle_workflow_status("wf-tag-chaud").await;

    assert!(!accepted);
    assert_eq!(store.snapshot().error.as_deref(), Some(NOT_AUTHENTICATED));
    assert!(engine.trigger_calls.lock().await.is_empty());
}

#[tokio::test]
async fn toggle_triggers_engine_without_flipping_status() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&["wf-tag-chaud"]));
    let store = WorkflowStore::new(engine.clone(), signed_in());
    store.load_workflows().await;

    let accepted = store.toggle_workflow_status("wf-tag-chaud").await;

    assert!(accepted);
    assert_eq!(
        engine.trigger_calls.lock().await.as_slice(),
        ["wf-tag-chaud".to_owned()]
    );
    let state = store.snapshot();
    assert_eq!(state.workflows[0].status, WorkflowStatus::Active);
    assert!(state.triggering.is_empty());
    assert_eq!(
        state.last_trigger.map(|record| record.code),
        Some("wf-tag-chaud".to_owned())
    );
}

#[tokio::test]
async fn toggle_surfaces_server_error_message() {
    let engine = Arc::new(FakeWorkflowEngine {
        trigger_error: Some("Workflow inactif".to_owned()),
        ..FakeWorkflowEngine::default()
    });
    let store = WorkflowStore::new(engine, signed_in());

    let accepted = store.toggle_workflow_status("wf-changement-statut").await;

    assert!(!accepted);
    assert_eq!(store.snapshot().error.as_deref(), Some("Workflow inactif"));
}

#[tokio::test]
async fn set_filters_reloads_and_keeps_filters() {
    let engine = Arc::new(FakeWorkflowEngine::with_codes(&[
        "wf-tag-chaud",
        "wf-relance-j3",
    ]));
    engine.push_list(None, Some(&["wf-tag-chaud", "wf-relance-j3"]));
    let store = WorkflowStore::new(engine.clone(), signed_in());
    store.load_workflows().await;

    store
        .set_filters(AutomationFilters {
            trigger_type: Some(vec![WorkflowTriggerType::Schedule]),
            ..AutomationFilters::default()
        })
        .await;

    assert_eq!(*engine.list_calls.lock().await, 2);
    let state = store.snapshot();
    let visible = state
        .visible_workflows()
        .iter()
        .map(|workflow| workflow.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(visible, vec!["wf-relance-j3".to_owned()]);

    store.clear_filters().await;
    assert_eq!(*engine.list_calls.lock().await, 3);
    assert!(store.snapshot().filters.is_empty());
}

#[tokio::test]
async fn detail_and_local_resets() {
    let store = WorkflowStore::new(Arc::new(FakeWorkflowEngine::default()), signed_in());
    let mut receiver = store.subscribe();

    store.load_workflow_detail("wf-relance-j3");
    assert!(receiver.has_changed().unwrap_or(false));
    let detail = receiver
        .borrow_and_update()
        .selected_workflow
        .clone()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(detail.actions.len(), 4);

    store.load_workflow_detail("   ");
    assert!(store.snapshot().error.is_some());

    store.clear_error();
    store.clear_selected_workflow();
    store.load_auto_guard_config();
    let state = store.snapshot();
    assert!(state.error.is_none());
    assert!(state.selected_workflow.is_none());
    assert!(state.auto_guard.is_some_and(|config| config.enabled));
}

#[tokio::test]
async fn second_trigger_of_same_code_is_refused_while_first_runs() {
    let engine = Arc::new(FakeWorkflowEngine::default());
    let (release_first, first_gate) = oneshot::channel();
    engine.trigger_gates.lock().await.push_back(Some(first_gate));
    let store = WorkflowStore::new(engine.clone(), signed_in());

    let first = store.toggle_workflow_status("wf-tag-chaud");
    let second = async {
        while engine.trigger_calls.lock().await.is_empty() {
            tokio::task::yield_now().await;
        }
        let accepted = store.toggle_workflow_status("wf-tag-chaud").await;

        assert!(!accepted);
        assert!(store.snapshot().triggering.contains("wf-tag-chaud"));
        let _ = release_first.send(());
    };
    let (accepted, ()) = tokio::join!(first, second);

    assert!(accepted);
    assert_eq!(engine.trigger_calls.lock().await.len(), 1);
    let state = store.snapshot();
    assert!(state.triggering.is_empty());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn failures_record_the_operation_that_failed() {
    let engine = Arc::new(FakeWorkflowEngine {
        trigger_error: Some("Workflow inactif".to_owned()),
        ..FakeWorkflowEngine::default()
    });
    engine.push_list(None, None);
    let store = WorkflowStore::new(engine, signed_in());

    store.load_workflows().await;
    assert_eq!(
        store.snapshot().failed_operation,
        Some(WorkflowOperation::LoadList)
    );

    store.toggle_workflow_status("wf-tag-chaud").await;
    assert_eq!(
        store.snapshot().failed_operation,
        Some(WorkflowOperation::Trigger)
    );

    store.clear_error();
    let state = store.snapshot();
    assert!(state.error.is_none());
    assert!(state.failed_operation.is_none());
}
