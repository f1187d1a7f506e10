use atelier_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::Channel;

/// Publication status of a workflow on the remote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Workflow runs on its trigger.
    Active,
    /// Workflow is deployed but paused.
    Inactive,
    /// Workflow is still being designed.
    Draft,
}

impl WorkflowStatus {
    /// Returns stable status value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Draft => "draft",
        }
    }

    /// Parses a stable status value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "draft" => Ok(Self::Draft),
            other => Err(AppError::Validation(format!(
                "unknown workflow status '{other}'"
            ))),
        }
    }
}

/// Condition class that starts a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowTriggerType {
    /// Cron-like schedule on the engine.
    Schedule,
    /// A lead was created in the CRM.
    LeadCreated,
    /// A lead score crossed a threshold.
    LeadScored,
    /// A lead pipeline status changed.
    StatusChanged,
    /// An appointment was booked.
    AppointmentBooked,
    /// Started by an operator.
    Manual,
}

impl WorkflowTriggerType {
    /// Returns stable trigger type value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::LeadCreated => "lead_created",
            Self::LeadScored => "lead_scored",
            Self::StatusChanged => "status_changed",
            Self::AppointmentBooked => "appointment_booked",
            Self::Manual => "manual",
        }
    }

    /// Parses a stable trigger type value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "schedule" => Ok(Self::Schedule),
            "lead_created" => Ok(Self::LeadCreated),
            "lead_scored" => Ok(Self::LeadScored),
            "status_changed" => Ok(Self::StatusChanged),
            "appointment_booked" => Ok(Self::AppointmentBooked),
            "manual" => Ok(Self::Manual),
            other => Err(AppError::Validation(format!(
                "unknown workflow trigger type '{other}'"
            ))),
        }
    }
}

/// Trigger descriptor displayed for a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTrigger {
    /// Trigger class.
    #[serde(rename = "type")]
    pub trigger_type: WorkflowTriggerType,
    /// Human label.
    pub label: String,
    /// Engine-specific configuration, displayed as-is.
    #[serde(default)]
    pub config: Value,
}

/// Stable action type values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowActionType {
    /// Sends a templated message over one channel.
    SendEmail,
    /// Writes one lead field.
    UpdateField,
    /// Creates a follow-up task.
    CreateTask,
    /// Adds a tag to the lead.
    AddTag,
    /// Assigns the lead to an owner.
    AssignTo,
    /// Pauses the workflow.
    Wait,
    /// Sends an internal notification.
    Notify,
}

impl WorkflowActionType {
    /// Returns stable action type value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendEmail => "send_email",
            Self::UpdateField => "update_field",
            Self::CreateTask => "create_task",
            Self::AddTag => "add_tag",
            Self::AssignTo => "assign_to",
            Self::Wait => "wait",
            Self::Notify => "notify",
        }
    }
}

/// Typed configuration of one workflow action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowActionConfig {
    /// Message sending step; the channel is not restricted to email.
    SendEmail {
        /// Delivery channel.
        channel: Channel,
        /// Template name or id to resolve against loaded templates.
        #[serde(default)]
        template: Option<String>,
        /// Sender identity override.
        #[serde(default)]
        from: Option<String>,
    },
    /// Field update step.
    UpdateField {
        /// Lead field name.
        field: String,
        /// Value written to the field.
        value: Value,
    },
    /// Task creation step.
    CreateTask {
        /// Task title.
        title: String,
        /// Task due delay in hours.
        #[serde(default)]
        due_in_hours: Option<u32>,
    },
    /// Tagging step.
    AddTag {
        /// Tag added to the lead.
        tag: String,
    },
    /// Assignment step.
    AssignTo {
        /// Owner receiving the lead.
        assignee: String,
    },
    /// Delay step.
    Wait {
        /// Delay in minutes.
        duration_minutes: u32,
    },
    /// Internal notification step.
    Notify {
        /// Notified user or team.
        recipient: String,
        /// Notification body.
        message: String,
    },
}

impl WorkflowActionConfig {
    /// Returns the action type for this configuration.
    #[must_use]
    pub fn action_type(&self) -> WorkflowActionType {
        match self {
            Self::SendEmail { .. } => WorkflowActionType::SendEmail,
            Self::UpdateField { .. } => WorkflowActionType::UpdateField,
            Self::CreateTask { .. } => WorkflowActionType::CreateTask,
            Self::AddTag { .. } => WorkflowActionType::AddTag,
            Self::AssignTo { .. } => WorkflowActionType::AssignTo,
            Self::Wait { .. } => WorkflowActionType::Wait,
            Self::Notify { .. } => WorkflowActionType::Notify,
        }
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAction {
    /// Step identifier.
    pub id: String,
    /// Human label.
    pub label: String,
    /// Optional human description.
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit position; array order carries no meaning.
    pub order: u32,
    /// Typed configuration.
    pub config: WorkflowActionConfig,
}

impl WorkflowAction {
    /// Returns the action type.
    #[must_use]
    pub fn action_type(&self) -> WorkflowActionType {
        self.config.action_type()
    }

    /// Returns the referenced message template, if this step sends one.
    #[must_use]
    pub fn template_reference(&self) -> Option<(Channel, &str)> {
        match &self.config {
            WorkflowActionConfig::SendEmail {
                channel,
                template: Some(template),
                ..
            } if !template.trim().is_empty() => Some((*channel, template.as_str())),
            _ => None,
        }
    }
}

/// Execution statistics reported for a workflow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowExecutionStats {
    /// Number of executions.
    pub execution_count: u64,
    /// Share of successful executions in percent.
    pub success_rate: f64,
    /// Last run timestamp.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Average execution duration in milliseconds.
    pub average_duration_ms: u64,
}

/// Automation workflow as displayed by the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Engine workflow code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Publication status.
    pub status: WorkflowStatus,
    /// Trigger descriptor.
    pub trigger: WorkflowTrigger,
    /// Steps, unordered until sorted by `order`.
    pub actions: Vec<WorkflowAction>,
    /// Execution statistics.
    pub stats: WorkflowExecutionStats,
    /// Creator display name.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Returns actions sorted by their explicit order, ties keeping list order.
    #[must_use]
    pub fn sorted_actions(&self) -> Vec<&WorkflowAction> {
        let mut actions = self.actions.iter().collect::<Vec<_>>();
        actions.sort_by_key(|action| action.order);
        actions
    }
}
