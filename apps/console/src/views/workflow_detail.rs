use atelier_application::TemplateStoreState;
use atelier_domain::{Workflow, WorkflowAction, WorkflowActionConfig};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use super::workflow_card::{ExecutionStatsView, format_timestamp, status_label};

/// Label shown when a step references a template absent from the loaded list.
pub const TEMPLATE_NOT_FOUND_LABEL: &str = "Template not found";

/// Resolution state of the template referenced by a message step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/template-preview.ts"
)]
pub enum TemplatePreview {
    Loading {
        reference: String,
    },
    NotFound {
        reference: String,
        message: String,
    },
    Found {
        reference: String,
        template_id: String,
        name: String,
        channel: String,
        subject: Option<String>,
        content: String,
    },
}

impl TemplatePreview {
    /// Resolves `reference` by exact name or id against the loaded templates.
    pub fn resolve(reference: &str, templates: &TemplateStoreState) -> Self {
        if templates.is_loading {
            return Self::Loading {
                reference: reference.to_owned(),
            };
        }

        match templates
            .templates
            .iter()
            .find(|template| template.matches_reference(reference))
        {
            Some(template) => Self::Found {
                reference: reference.to_owned(),
                template_id: template.id.clone(),
                name: template.name.clone(),
                channel: template.channel.as_str().to_owned(),
                subject: template.subject.clone(),
                content: template.content.clone(),
            },
            None => Self::NotFound {
                reference: reference.to_owned(),
                message: TEMPLATE_NOT_FOUND_LABEL.to_owned(),
            },
        }
    }
}

/// One workflow step, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/workflow-step-view.ts"
)]
pub struct WorkflowStepView {
    pub id: String,
    pub order: u32,
    pub action_type: String,
    pub label: String,
    pub description: Option<String>,
    pub summary: String,
    pub channel: Option<String>,
    pub template: Option<TemplatePreview>,
}

/// Detail panel of one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/workflow-detail-view.ts"
)]
pub struct WorkflowDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub status_label: String,
    pub trigger_type: String,
    pub trigger_label: String,
    #[ts(type = "Record<string, unknown>")]
    pub trigger_config: Value,
    pub steps: Vec<WorkflowStepView>,
    pub stats: ExecutionStatsView,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkflowDetailView {
    pub fn build(workflow: &Workflow, templates: &TemplateStoreState) -> Self {
        let steps = workflow
            .sorted_actions()
            .into_iter()
            .map(|action| step_view(action, templates))
            .collect();

        Self {
            id: workflow.id.clone(),
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            status: workflow.status.as_str().to_owned(),
            status_label: status_label(workflow.status).to_owned(),
            trigger_type: workflow.trigger.trigger_type.as_str().to_owned(),
            trigger_label: workflow.trigger.label.clone(),
            trigger_config: workflow.trigger.config.clone(),
            steps,
            stats: ExecutionStatsView::from_stats(&workflow.stats),
            created_by: workflow.created_by.clone(),
            created_at: format_timestamp(&workflow.created_at),
            updated_at: format_timestamp(&workflow.updated_at),
        }
    }
}

fn step_view(action: &WorkflowAction, templates: &TemplateStoreState) -> WorkflowStepView {
    let reference = action.template_reference();

    WorkflowStepView {
        id: action.id.clone(),
        order: action.order,
        action_type: action.action_type().as_str().to_owned(),
        label: action.label.clone(),
        description: action.description.clone(),
        summary: summarize(&action.config),
        channel: reference.map(|(channel, _)| channel.as_str().to_owned()),
        template: reference.map(|(_, name)| TemplatePreview::resolve(name, templates)),
    }
}

fn summarize(config: &WorkflowActionConfig) -> String {
    match config {
        WorkflowActionConfig::SendEmail { channel, from, .. } => match from {
            Some(from) => format!("Envoi {} depuis {from}", channel.as_str()),
            None => format!("Envoi {}", channel.as_str()),
        },
        WorkflowActionConfig::UpdateField { field, value } => {
            format!("{field} = {value}")
        }
        WorkflowActionConfig::CreateTask {
            title,
            due_in_hours,
        } => match due_in_hours {
            Some(hours) => format!("Tâche « {title} » sous {hours} h"),
            None => format!("Tâche « {title} »"),
        },
        WorkflowActionConfig::AddTag { tag } => format!("Tag « {tag} »"),
        WorkflowActionConfig::AssignTo { assignee } => format!("Assigner à {assignee}"),
        WorkflowActionConfig::Wait { duration_minutes } => format_wait(*duration_minutes),
        WorkflowActionConfig::Notify { recipient, message } => {
            format!("Notifier {recipient} : {message}")
        }
    }
}

fn format_wait(minutes: u32) -> String {
    match minutes {
        0..60 => format!("Attendre {minutes} min"),
        _ if minutes % (24 * 60) == 0 => format!("Attendre {} j", minutes / (24 * 60)),
        _ if minutes % 60 == 0 => format!("Attendre {} h", minutes / 60),
        _ => format!("Attendre {} h {} min", minutes / 60, minutes % 60),
    }
}

#[cfg(test)]
mod tests {
    use atelier_application::TemplateStoreState;
    use atelier_core::TenantId;
    use atelier_domain::{
        Channel, MessageTemplate, TemplateCategory, TemplateCreator, TemplateStatus,
        materialize_detail,
    };
    use chrono::Utc;

    use super::{TEMPLATE_NOT_FOUND_LABEL, TemplatePreview, WorkflowDetailView, format_wait};

    fn template(id: &str, name: &str, content: &str) -> MessageTemplate {
        MessageTemplate {
            id: id.to_owned(),
            tenant_id: TenantId::new("tenant-1"),
            channel: Channel::Whatsapp,
            name: name.to_owned(),
            category: TemplateCategory::FollowUp,
            subject: None,
            content: content.to_owned(),
            variables: Vec::new(),
            whatsapp_from: None,
            whatsapp_content_sid: None,
            status: TemplateStatus::Active,
            created_by: TemplateCreator::Max,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn loaded(templates: Vec<MessageTemplate>) -> TemplateStoreState {
        TemplateStoreState {
            templates,
            ..TemplateStoreState::default()
        }
    }

    #[test]
    fn steps_are_rendered_in_order_field_sequence() {
        let workflow = materialize_detail("wf-relance-j3");
        let view = WorkflowDetailView::build(&workflow, &loaded(Vec::new()));

        let orders = view.steps.iter().map(|step| step.order).collect::<Vec<_>>();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
        assert_eq!(view.steps.len(), workflow.actions.len());
    }

    #[test]
    fn template_matches_by_exact_name_and_keeps_content_verbatim() {
        let content = "Bonjour {{prenom}},\n  toujours intéressé ?  ";
        let templates = loaded(vec![template("t9", "relance_j3_whatsapp", content)]);

        let preview = TemplatePreview::resolve("relance_j3_whatsapp", &templates);

        assert_eq!(
            preview,
            TemplatePreview::Found {
                reference: "relance_j3_whatsapp".to_owned(),
                template_id: "t9".to_owned(),
                name: "relance_j3_whatsapp".to_owned(),
                channel: "whatsapp".to_owned(),
                subject: None,
                content: content.to_owned(),
            }
        );
    }

    #[test]
    fn template_matches_by_id_but_not_by_partial_name() {
        let templates = loaded(vec![template("t1", "relance_j3_whatsapp", "x")]);

        assert!(matches!(
            TemplatePreview::resolve("t1", &templates),
            TemplatePreview::Found { .. }
        ));
        assert_eq!(
            TemplatePreview::resolve("relance_j3", &templates),
            TemplatePreview::NotFound {
                reference: "relance_j3".to_owned(),
                message: TEMPLATE_NOT_FOUND_LABEL.to_owned(),
            }
        );
    }

    #[test]
    fn template_is_loading_while_list_loads() {
        let templates = TemplateStoreState {
            is_loading: true,
            ..loaded(vec![template("t1", "relance_j3_whatsapp", "x")])
        };

        assert!(matches!(
            TemplatePreview::resolve("relance_j3_whatsapp", &templates),
            TemplatePreview::Loading { .. }
        ));
    }

    #[test]
    fn only_message_steps_carry_template_previews() {
        let workflow = materialize_detail("wf-tag-chaud");
        let view = WorkflowDetailView::build(&workflow, &loaded(Vec::new()));

        for (step, action) in view.steps.iter().zip(workflow.sorted_actions()) {
            assert_eq!(step.template.is_some(), action.template_reference().is_some());
        }
    }

    #[test]
    fn wait_durations_use_largest_whole_unit() {
        assert_eq!(format_wait(30), "Attendre 30 min");
        assert_eq!(format_wait(120), "Attendre 2 h");
        assert_eq!(format_wait(90), "Attendre 1 h 30 min");
        assert_eq!(format_wait(4_320), "Attendre 3 j");
    }
}
