use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use atelier_application::{
    TemplateGateway, TemplateListing, TemplateStore, WorkflowEngineGateway, WorkflowStore,
};
use atelier_core::{AppError, AppResult, BearerToken, TenantId};
use atelier_domain::{
    Channel, CreateTemplateInput, MessageTemplate, TemplateCategory, TemplateCounts,
    TemplateCreator, TemplateFilters, TemplateGroups, TemplateStatus, UpdateTemplateInput,
    WorkflowStatus, WorkflowTriggerType,
};
use atelier_infrastructure::InMemoryAuthTokenStore;

use crate::views::templates_section::TemplateSource;
use crate::views::workflow_detail::{TEMPLATE_NOT_FOUND_LABEL, TemplatePreview};

use super::AutomationPage;

#[derive(Default)]
struct FakeEngine {
    codes: Mutex<Vec<String>>,
    fail_list: Mutex<bool>,
    list_calls: Mutex<usize>,
    triggered: Mutex<Vec<String>>,
}

#[async_trait]
impl WorkflowEngineGateway for FakeEngine {
    async fn list_workflow_codes(&self, _token: &BearerToken) -> AppResult<Vec<String>> {
        *self.list_calls.lock().await += 1;
        if *self.fail_list.lock().await {
            return Err(AppError::Upstream {
                status: 502,
                message: None,
            });
        }
        Ok(self.codes.lock().await.clone())
    }

    async fn trigger_workflow(&self, _token: &BearerToken, code: &str) -> AppResult<Value> {
        self.triggered.lock().await.push(code.to_owned());
        Ok(json!({"executionId": "exec-1"}))
    }
}

#[derive(Default)]
struct FakeTemplates {
    templates: Mutex<Vec<MessageTemplate>>,
    fail_list: bool,
}

#[async_trait]
impl TemplateGateway for FakeTemplates {
    async fn list_templates(&self, _filters: &TemplateFilters) -> AppResult<TemplateListing> {
        if self.fail_list {
            return Err(AppError::Internal("connection refused".to_owned()));
        }
        let templates = self.templates.lock().await.clone();
        Ok(TemplateListing {
            grouped: TemplateGroups::from_templates(&templates),
            counts: TemplateCounts::from_templates(&templates),
            total: u32::try_from(templates.len()).unwrap_or(u32::MAX),
            templates,
        })
    }

    async fn find_template(&self, _template_id: &str) -> AppResult<MessageTemplate> {
        Err(AppError::NotFound("Template introuvable".to_owned()))
    }

    async fn create_template(&self, _input: &CreateTemplateInput) -> AppResult<MessageTemplate> {
        Err(AppError::Internal("unsupported".to_owned()))
    }

    async fn update_template(
        &self,
        _template_id: &str,
        _input: &UpdateTemplateInput,
    ) -> AppResult<MessageTemplate> {
        Err(AppError::Internal("unsupported".to_owned()))
    }

    async fn delete_template(&self, template_id: &str) -> AppResult<()> {
        self.templates
            .lock()
            .await
            .retain(|template| template.id != template_id);
        Ok(())
    }

    async fn activate_template(&self, template_id: &str) -> AppResult<MessageTemplate> {
        let mut templates = self.templates.lock().await;
        let template = templates
            .iter_mut()
            .find(|template| template.id == template_id)
            .ok_or_else(|| AppError::NotFound("Template introuvable".to_owned()))?;
        template.status = TemplateStatus::Active;
        Ok(template.clone())
    }
}

fn template(id: &str, name: &str, channel: Channel) -> MessageTemplate {
    MessageTemplate {
        id: id.to_owned(),
        tenant_id: TenantId::new("tenant-1"),
        channel,
        name: name.to_owned(),
        category: TemplateCategory::FollowUp,
        subject: None,
        content: format!("Contenu de {name}"),
        variables: Vec::new(),
        whatsapp_from: None,
        whatsapp_content_sid: None,
        status: TemplateStatus::Draft,
        created_by: TemplateCreator::System,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct Fixture {
    engine: Arc<FakeEngine>,
    token_store: Arc<InMemoryAuthTokenStore>,
    page: AutomationPage,
}

fn fixture(codes: &[&str], templates: FakeTemplates) -> Fixture {
    let engine = Arc::new(FakeEngine {
        codes: Mutex::new(codes.iter().map(|code| (*code).to_owned()).collect()),
        ..FakeEngine::default()
    });
    let token_store = Arc::new(InMemoryAuthTokenStore::new(
        BearerToken::new("token").ok(),
    ));
    let workflows = Arc::new(WorkflowStore::new(engine.clone(), token_store.clone()));
    let templates = Arc::new(TemplateStore::new(Arc::new(templates)));

    Fixture {
        engine,
        token_store,
        page: AutomationPage::new(workflows, templates),
    }
}

#[tokio::test]
async fn mount_loads_workflows_guard_and_templates() {
    let templates = FakeTemplates {
        templates: Mutex::new(vec![template("t1", "relance_j3_whatsapp", Channel::Whatsapp)]),
        ..FakeTemplates::default()
    };
    let fixture = fixture(&["wf-tag-chaud", "wf-relance-j3", "wf-perso"], templates);

    fixture.page.mount().await;
    let view = fixture.page.view();

    assert_eq!(view.total, 3);
    assert_eq!(view.visible_count, 3);
    assert_eq!(view.workflows[0].name, "Tag automatique leads chauds");
    assert_eq!(view.workflows[2].name, "wf-perso");
    assert!(view.auto_guard.is_some());
    assert!(view.error_banner.is_none());
    assert_eq!(view.templates.source, TemplateSource::Remote);
    assert_eq!(view.templates.total, 1);
}

#[tokio::test]
async fn draft_filters_apply_only_on_apply() {
    let mut fixture = fixture(
        &["wf-tag-chaud", "wf-changement-statut", "wf-reactivation-froids"],
        FakeTemplates::default(),
    );
    fixture.page.mount().await;

    fixture.page.toggle_draft_status(WorkflowStatus::Active);
    let pending = fixture.page.view();
    assert!(pending.filters.has_pending_changes);
    assert_eq!(pending.filters.statuses, vec!["active"]);
    assert_eq!(pending.visible_count, 3);
    assert_eq!(*fixture.engine.list_calls.lock().await, 1);

    fixture.page.apply_filters().await;
    let applied = fixture.page.view();
    assert!(!applied.filters.has_pending_changes);
    assert_eq!(applied.filters.applied_filter_count, 1);
    assert_eq!(applied.visible_count, 1);
    assert_eq!(applied.total, 3);
    assert_eq!(*fixture.engine.list_calls.lock().await, 2);

    fixture.page.reset_filters().await;
    let reset = fixture.page.view();
    assert_eq!(reset.visible_count, 3);
    assert!(fixture.page.draft_filters().is_empty());
}

#[tokio::test]
async fn toggling_a_draft_value_twice_clears_it() {
    let mut fixture = fixture(&[], FakeTemplates::default());

    fixture
        .page
        .toggle_draft_trigger_type(WorkflowTriggerType::Schedule);
    fixture
        .page
        .toggle_draft_trigger_type(WorkflowTriggerType::Schedule);
    fixture.page.set_draft_search("   ");

    assert!(fixture.page.draft_filters().trigger_type.is_none());
    assert!(fixture.page.draft_filters().search.is_none());
}

#[tokio::test]
async fn failed_list_shows_banner_then_retry_recovers() {
    let fixture = fixture(&["wf-tag-chaud"], FakeTemplates::default());
    *fixture.engine.fail_list.lock().await = true;

    fixture.page.mount().await;
    let banner = fixture.page.view().error_banner;
    assert_eq!(
        banner.map(|banner| (banner.message, banner.can_retry)),
        Some(("Erreur lors du chargement des workflows".to_owned(), true))
    );

    fixture.page.dismiss_error();
    assert!(fixture.page.view().error_banner.is_none());

    *fixture.engine.fail_list.lock().await = false;
    fixture.page.retry().await;
    let view = fixture.page.view();
    assert!(view.error_banner.is_none());
    assert_eq!(view.total, 1);
}

#[tokio::test]
async fn selecting_a_workflow_resolves_step_templates() {
    let templates = FakeTemplates {
        templates: Mutex::new(vec![template("t1", "relance_j3_whatsapp", Channel::Whatsapp)]),
        ..FakeTemplates::default()
    };
    let fixture = fixture(&["wf-relance-j3"], templates);
    fixture.page.mount().await;

    fixture.page.select_workflow("wf-relance-j3");
    let view = fixture.page.view();

    assert!(view.workflows[0].is_selected);
    let detail = view.detail.unwrap_or_else(|| unreachable!());
    let previews = detail
        .steps
        .iter()
        .filter_map(|step| step.template.clone())
        .collect::<Vec<_>>();
    assert!(previews.iter().any(|preview| matches!(
        preview,
        TemplatePreview::Found { content, .. } if content == "Contenu de relance_j3_whatsapp"
    )));
    assert!(previews.iter().any(|preview| matches!(
        preview,
        TemplatePreview::NotFound { message, .. } if message == TEMPLATE_NOT_FOUND_LABEL
    )));

    fixture.page.close_detail();
    assert!(fixture.page.view().detail.is_none());
}

#[tokio::test]
async fn trigger_records_notice_without_flipping_status() {
    let fixture = fixture(&["wf-changement-statut"], FakeTemplates::default());
    fixture.page.mount().await;

    assert!(fixture.page.trigger_workflow("wf-changement-statut").await);

    let view = fixture.page.view();
    assert_eq!(view.workflows[0].status, "inactive");
    assert_eq!(
        view.last_trigger.map(|notice| notice.code),
        Some("wf-changement-statut".to_owned())
    );
    assert_eq!(
        *fixture.engine.triggered.lock().await,
        vec!["wf-changement-statut".to_owned()]
    );
}

#[tokio::test]
async fn trigger_after_sign_out_reports_missing_authentication() {
    let fixture = fixture(&["wf-tag-chaud"], FakeTemplates::default());
    fixture.page.mount().await;
    fixture.token_store.clear().await;

    assert!(!fixture.page.trigger_workflow("wf-tag-chaud").await);

    assert_eq!(
        fixture
            .page
            .view()
            .error_banner
            .map(|banner| (banner.message, banner.can_retry)),
        Some(("Non authentifié".to_owned(), false))
    );
    assert!(fixture.engine.triggered.lock().await.is_empty());
}

#[tokio::test]
async fn template_list_failure_falls_back_to_bundled_templates() {
    let fixture = fixture(
        &[],
        FakeTemplates {
            fail_list: true,
            ..FakeTemplates::default()
        },
    );
    fixture.page.mount().await;

    let templates = fixture.page.view().templates;
    assert_eq!(templates.source, TemplateSource::OfflineFallback);
    assert_eq!(templates.error.as_deref(), Some("connection refused"));
}

#[tokio::test]
async fn template_actions_update_section() {
    let templates = FakeTemplates {
        templates: Mutex::new(vec![
            template("t1", "a", Channel::Sms),
            template("t2", "b", Channel::Sms),
        ]),
        ..FakeTemplates::default()
    };
    let mut fixture = fixture(&[], templates);
    fixture.page.mount().await;
    fixture.page.toggle_template_channel(Channel::Sms);

    assert!(fixture.page.activate_template("t1").await);
    assert!(fixture.page.delete_template("t2").await);

    let section = fixture.page.view().templates;
    let sms = &section.groups[1];
    assert!(sms.expanded);
    assert_eq!(sms.count, 1);
    assert_eq!(sms.templates[0].status, "active");
}

#[tokio::test]
async fn template_search_is_trimmed_and_missing_template_is_reported() {
    let fixture = fixture(&[], FakeTemplates::default());

    fixture.page.search_templates("  relance ").await;
    fixture.page.open_template("absent").await;

    let section = fixture.page.view().templates;
    assert_eq!(section.search, "relance");
    assert_eq!(section.error.as_deref(), Some("Template introuvable"));
    assert!(section.selected.is_none());
}
