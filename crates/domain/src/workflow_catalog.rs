//! Static presentation data for workflow codes exposed by the engine.
//!
//! The engine only lists codes; labels, triggers and steps shown by the panel
//! come from these tables.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::template::Channel;
use crate::workflow::{
    Workflow, WorkflowAction, WorkflowActionConfig, WorkflowExecutionStats, WorkflowStatus,
    WorkflowTrigger, WorkflowTriggerType,
};

/// Description used for codes missing from the catalog.
pub const GENERIC_WORKFLOW_DESCRIPTION: &str = "Workflow d'automatisation personnalisé";

const UNKNOWN_TRIGGER_LABEL: &str = "Déclenchement manuel";
const UNKNOWN_CREATOR: &str = "n8n";

struct CatalogEntry {
    code: &'static str,
    name: &'static str,
    description: &'static str,
    status: WorkflowStatus,
    trigger_type: WorkflowTriggerType,
    trigger_label: &'static str,
    trigger_config: fn() -> Value,
    actions: fn() -> Vec<WorkflowAction>,
    execution_count: u64,
    success_rate: f64,
    last_run_epoch: Option<i64>,
    average_duration_ms: u64,
    created_by: &'static str,
    created_epoch: i64,
    updated_epoch: i64,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: "wf-tag-chaud",
        name: "Tag automatique leads chauds",
        description: "Ajoute le tag « chaud » et alerte le commercial dès que le score dépasse 70",
        status: WorkflowStatus::Active,
        trigger_type: WorkflowTriggerType::LeadScored,
        trigger_label: "Score du lead ≥ 70",
        trigger_config: || json!({"threshold": 70}),
        actions: tag_chaud_actions,
        execution_count: 412,
        success_rate: 99.5,
        last_run_epoch: Some(1_790_150_400),
        average_duration_ms: 850,
        created_by: "Max",
        created_epoch: 1_767_225_600,
        updated_epoch: 1_785_542_400,
    },
    CatalogEntry {
        code: "wf-relance-j3",
        name: "Relance J+3 sans réponse",
        description: "Relance WhatsApp puis SMS des leads restés sans réponse trois jours",
        status: WorkflowStatus::Active,
        trigger_type: WorkflowTriggerType::Schedule,
        trigger_label: "Tous les jours à 10h",
        trigger_config: || json!({"cron": "0 10 * * *", "timezone": "Europe/Paris"}),
        actions: relance_actions,
        execution_count: 1_284,
        success_rate: 96.2,
        last_run_epoch: Some(1_790_157_600),
        average_duration_ms: 4_200,
        created_by: "Max",
        created_epoch: 1_767_225_600,
        updated_epoch: 1_788_220_800,
    },
    CatalogEntry {
        code: "wf-bienvenue-lead",
        name: "Bienvenue nouveau lead",
        description: "Envoie l'email de bienvenue et passe le lead au statut contacté",
        status: WorkflowStatus::Active,
        trigger_type: WorkflowTriggerType::LeadCreated,
        trigger_label: "Nouveau lead créé",
        trigger_config: || json!({"sources": ["site", "formulaire", "import"]}),
        actions: bienvenue_actions,
        execution_count: 2_051,
        success_rate: 98.7,
        last_run_epoch: Some(1_790_161_200),
        average_duration_ms: 1_300,
        created_by: "system",
        created_epoch: 1_764_547_200,
        updated_epoch: 1_785_542_400,
    },
    CatalogEntry {
        code: "wf-rappel-rdv",
        name: "Rappel de rendez-vous",
        description: "Envoie un SMS de rappel la veille du rendez-vous",
        status: WorkflowStatus::Active,
        trigger_type: WorkflowTriggerType::AppointmentBooked,
        trigger_label: "Rendez-vous planifié",
        trigger_config: || json!({"remind_before_hours": 24}),
        actions: rappel_rdv_actions,
        execution_count: 318,
        success_rate: 97.1,
        last_run_epoch: Some(1_790_100_000),
        average_duration_ms: 950,
        created_by: "system",
        created_epoch: 1_769_904_000,
        updated_epoch: 1_769_904_000,
    },
    CatalogEntry {
        code: "wf-changement-statut",
        name: "Suivi changement de statut",
        description: "Prévient le responsable quand un lead passe en négociation",
        status: WorkflowStatus::Inactive,
        trigger_type: WorkflowTriggerType::StatusChanged,
        trigger_label: "Statut → négociation",
        trigger_config: || json!({"to": "negotiation"}),
        actions: changement_statut_actions,
        execution_count: 57,
        success_rate: 100.0,
        last_run_epoch: Some(1_783_000_000),
        average_duration_ms: 400,
        created_by: "user",
        created_epoch: 1_772_323_200,
        updated_epoch: 1_783_000_000,
    },
    CatalogEntry {
        code: "wf-reactivation-froids",
        name: "Réactivation leads froids",
        description: "Campagne WhatsApp pour les leads sans activité depuis 60 jours",
        status: WorkflowStatus::Draft,
        trigger_type: WorkflowTriggerType::Manual,
        trigger_label: UNKNOWN_TRIGGER_LABEL,
        trigger_config: || json!({}),
        actions: reactivation_actions,
        execution_count: 0,
        success_rate: 0.0,
        last_run_epoch: None,
        average_duration_ms: 0,
        created_by: "Max",
        created_epoch: 1_788_220_800,
        updated_epoch: 1_788_220_800,
    },
];

/// Returns every code known to the catalog, in catalog order.
#[must_use]
pub fn catalog_codes() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.code).collect()
}

/// Returns whether the catalog has presentation data for the code.
#[must_use]
pub fn is_known_workflow_code(code: &str) -> bool {
    find_entry(code).is_some()
}

/// Builds the list form of a workflow: labels, trigger and stats, no steps.
#[must_use]
pub fn materialize_summary(code: &str) -> Workflow {
    let mut workflow = materialize_detail(code);
    workflow.actions.clear();
    workflow
}

/// Builds the full workflow record, steps included.
#[must_use]
pub fn materialize_detail(code: &str) -> Workflow {
    let Some(entry) = find_entry(code) else {
        return unknown_workflow(code);
    };

    Workflow {
        id: entry.code.to_owned(),
        name: entry.name.to_owned(),
        description: entry.description.to_owned(),
        status: entry.status,
        trigger: WorkflowTrigger {
            trigger_type: entry.trigger_type,
            label: entry.trigger_label.to_owned(),
            config: (entry.trigger_config)(),
        },
        actions: (entry.actions)(),
        stats: WorkflowExecutionStats {
            execution_count: entry.execution_count,
            success_rate: entry.success_rate,
            last_run_at: entry.last_run_epoch.map(timestamp),
            average_duration_ms: entry.average_duration_ms,
        },
        created_by: entry.created_by.to_owned(),
        created_at: timestamp(entry.created_epoch),
        updated_at: timestamp(entry.updated_epoch),
    }
}

fn find_entry(code: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.code == code)
}

fn unknown_workflow(code: &str) -> Workflow {
    Workflow {
        id: code.to_owned(),
        name: code.to_owned(),
        description: GENERIC_WORKFLOW_DESCRIPTION.to_owned(),
        status: WorkflowStatus::Active,
        trigger: WorkflowTrigger {
            trigger_type: WorkflowTriggerType::Manual,
            label: UNKNOWN_TRIGGER_LABEL.to_owned(),
            config: json!({}),
        },
        actions: Vec::new(),
        stats: WorkflowExecutionStats::default(),
        created_by: UNKNOWN_CREATOR.to_owned(),
        created_at: DateTime::<Utc>::default(),
        updated_at: DateTime::<Utc>::default(),
    }
}

fn timestamp(epoch_seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_seconds, 0).unwrap_or_default()
}

fn step(id: &str, order: u32, label: &str, config: WorkflowActionConfig) -> WorkflowAction {
    WorkflowAction {
        id: id.to_owned(),
        label: label.to_owned(),
        description: None,
        order,
        config,
    }
}

fn tag_chaud_actions() -> Vec<WorkflowAction> {
    vec![
        step(
            "notify-owner",
            3,
            "Alerter le commercial",
            WorkflowActionConfig::Notify {
                recipient: "owner".to_owned(),
                message: "Lead chaud à rappeler en priorité".to_owned(),
            },
        ),
        step(
            "tag-chaud",
            1,
            "Ajouter le tag chaud",
            WorkflowActionConfig::AddTag {
                tag: "chaud".to_owned(),
            },
        ),
        step(
            "assign-closer",
            2,
            "Assigner à l'équipe closing",
            WorkflowActionConfig::AssignTo {
                assignee: "equipe-closing".to_owned(),
            },
        ),
    ]
}

fn relance_actions() -> Vec<WorkflowAction> {
    vec![
        step(
            "send-whatsapp",
            1,
            "Relance WhatsApp",
            WorkflowActionConfig::SendEmail {
                channel: Channel::Whatsapp,
                template: Some("relance_j3_whatsapp".to_owned()),
                from: Some("whatsapp:+33756000000".to_owned()),
            },
        ),
        step(
            "create-call-task",
            4,
            "Tâche d'appel",
            WorkflowActionConfig::CreateTask {
                title: "Appeler le lead sans réponse".to_owned(),
                due_in_hours: Some(24),
            },
        ),
        step(
            "wait-one-day",
            2,
            "Attendre 24h",
            WorkflowActionConfig::Wait {
                duration_minutes: 1_440,
            },
        ),
        step(
            "send-sms",
            3,
            "Relance SMS",
            WorkflowActionConfig::SendEmail {
                channel: Channel::Sms,
                template: Some("relance_j4_sms".to_owned()),
                from: None,
            },
        ),
    ]
}

fn bienvenue_actions() -> Vec<WorkflowAction> {
    vec![
        step(
            "send-welcome",
            1,
            "Email de bienvenue",
            WorkflowActionConfig::SendEmail {
                channel: Channel::Email,
                template: Some("bienvenue_email".to_owned()),
                from: Some("contact@atelier.app".to_owned()),
            },
        ),
        step(
            "mark-contacted",
            2,
            "Statut contacté",
            WorkflowActionConfig::UpdateField {
                field: "status".to_owned(),
                value: json!("contacted"),
            },
        ),
    ]
}

fn rappel_rdv_actions() -> Vec<WorkflowAction> {
    vec![
        step(
            "send-reminder",
            2,
            "SMS de rappel",
            WorkflowActionConfig::SendEmail {
                channel: Channel::Sms,
                template: Some("rappel_rdv_sms".to_owned()),
                from: None,
            },
        ),
        step(
            "wait-until-eve",
            1,
            "Attendre la veille",
            WorkflowActionConfig::Wait {
                duration_minutes: 0,
            },
        ),
    ]
}

fn changement_statut_actions() -> Vec<WorkflowAction> {
    vec![step(
        "notify-manager",
        1,
        "Prévenir le responsable",
        WorkflowActionConfig::Notify {
            recipient: "manager".to_owned(),
            message: "Un lead est passé en négociation".to_owned(),
        },
    )]
}

fn reactivation_actions() -> Vec<WorkflowAction> {
    vec![
        step(
            "tag-reactivation",
            2,
            "Tag réactivation",
            WorkflowActionConfig::AddTag {
                tag: "reactivation".to_owned(),
            },
        ),
        step(
            "send-reactivation",
            1,
            "Message de réactivation",
            WorkflowActionConfig::SendEmail {
                channel: Channel::Whatsapp,
                template: Some("reactivation_whatsapp".to_owned()),
                from: None,
            },
        ),
    ]
}
