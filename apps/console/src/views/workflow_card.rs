use atelier_domain::{Workflow, WorkflowExecutionStats, WorkflowStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

/// Execution statistics formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/execution-stats-view.ts"
)]
pub struct ExecutionStatsView {
    #[ts(type = "number")]
    pub execution_count: u64,
    pub success_rate: f64,
    pub success_rate_label: String,
    pub last_run_label: Option<String>,
    pub average_duration_label: String,
}

impl ExecutionStatsView {
    pub fn from_stats(stats: &WorkflowExecutionStats) -> Self {
        Self {
            execution_count: stats.execution_count,
            success_rate: stats.success_rate,
            success_rate_label: format!("{:.1} %", stats.success_rate).replace('.', ","),
            last_run_label: stats.last_run_at.as_ref().map(format_timestamp),
            average_duration_label: format_duration(stats.average_duration_ms),
        }
    }
}

/// One workflow card of the automation list.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/workflow-card-view.ts"
)]
pub struct WorkflowCardView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub status_label: String,
    pub trigger_type: String,
    pub trigger_label: String,
    /// `None` while the list holds summaries without steps.
    pub action_count: Option<u32>,
    pub stats: ExecutionStatsView,
    pub is_selected: bool,
    pub is_triggering: bool,
    pub trigger_disabled: bool,
}

impl WorkflowCardView {
    pub fn build(workflow: &Workflow, is_triggering: bool, is_selected: bool) -> Self {
        let action_count = (!workflow.actions.is_empty())
            .then(|| u32::try_from(workflow.actions.len()).unwrap_or(u32::MAX));

        Self {
            id: workflow.id.clone(),
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            status: workflow.status.as_str().to_owned(),
            status_label: status_label(workflow.status).to_owned(),
            trigger_type: workflow.trigger.trigger_type.as_str().to_owned(),
            trigger_label: workflow.trigger.label.clone(),
            action_count,
            stats: ExecutionStatsView::from_stats(&workflow.stats),
            is_selected,
            is_triggering,
            trigger_disabled: is_triggering,
        }
    }
}

pub fn status_label(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Active => "Actif",
        WorkflowStatus::Inactive => "Inactif",
        WorkflowStatus::Draft => "Brouillon",
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y %H:%M UTC").to_string()
}

fn format_duration(duration_ms: u64) -> String {
    if duration_ms < 1_000 {
        return format!("{duration_ms} ms");
    }

    // Tenths of a second, rounded.
    let tenths = (duration_ms + 50) / 100;
    format!("{},{} s", tenths / 10, tenths % 10)
}
