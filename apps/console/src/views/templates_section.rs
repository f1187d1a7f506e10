use std::collections::BTreeSet;

use atelier_application::TemplateStoreState;
use atelier_domain::{
    Channel, MessageTemplate, TemplateCategory, TemplateStatus, extract_variables,
};
use serde::Serialize;
use ts_rs::TS;

/// Where the section's templates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/template-source.ts"
)]
pub enum TemplateSource {
    Remote,
    OfflineFallback,
}

/// One template row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/template-row-view.ts"
)]
pub struct TemplateRowView {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub status: String,
    pub status_label: String,
    pub subject: Option<String>,
    pub content: String,
    pub variables: Vec<String>,
    pub undeclared_variables: Vec<String>,
    pub can_activate: bool,
}

/// Templates of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/template-group-view.ts"
)]
pub struct TemplateGroupView {
    pub channel: String,
    pub label: String,
    pub count: u32,
    pub expanded: bool,
    pub templates: Vec<TemplateRowView>,
}

/// Templates panel grouped by channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/templates-section-view.ts"
)]
pub struct TemplatesSectionView {
    pub source: TemplateSource,
    pub is_loading: bool,
    pub error: Option<String>,
    pub total: u32,
    pub channel_filter: Option<String>,
    pub status_filter: Option<String>,
    pub search: String,
    pub groups: Vec<TemplateGroupView>,
    pub selected: Option<TemplateRowView>,
}

/// Local state of the templates panel: which channel groups are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatesSectionState {
    expanded: BTreeSet<Channel>,
}

impl TemplatesSectionState {
    pub fn toggle(&mut self, channel: Channel) {
        if !self.expanded.remove(&channel) {
            self.expanded.insert(channel);
        }
    }

    pub fn is_expanded(&self, channel: Channel) -> bool {
        self.expanded.contains(&channel)
    }

    pub fn build(&self, store: &TemplateStoreState) -> TemplatesSectionView {
        let use_fallback = store.templates.is_empty() && !store.is_loading && store.error.is_some();
        if use_fallback {
            return self.build_fallback(store);
        }

        let groups = Channel::ALL
            .into_iter()
            .map(|channel| TemplateGroupView {
                channel: channel.as_str().to_owned(),
                label: channel_label(channel).to_owned(),
                count: store.counts.channel(channel),
                expanded: self.is_expanded(channel),
                templates: store.grouped.channel(channel).iter().map(remote_row).collect(),
            })
            .collect();

        TemplatesSectionView {
            source: TemplateSource::Remote,
            is_loading: store.is_loading,
            error: store.error.clone(),
            total: store.total,
            channel_filter: store.filters.channel.map(|channel| channel.as_str().to_owned()),
            status_filter: store.filters.status.map(|status| status.as_str().to_owned()),
            search: store.filters.search.clone(),
            groups,
            selected: store.selected_template.as_ref().map(remote_row),
        }
    }

    fn build_fallback(&self, store: &TemplateStoreState) -> TemplatesSectionView {
        let bundled = bundled_templates();
        let groups = Channel::ALL
            .into_iter()
            .map(|channel| {
                let templates = bundled
                    .iter()
                    .filter(|template| template.channel == channel)
                    .map(bundled_row)
                    .collect::<Vec<_>>();
                TemplateGroupView {
                    channel: channel.as_str().to_owned(),
                    label: channel_label(channel).to_owned(),
                    count: u32::try_from(templates.len()).unwrap_or(u32::MAX),
                    expanded: self.is_expanded(channel),
                    templates,
                }
            })
            .collect();

        TemplatesSectionView {
            source: TemplateSource::OfflineFallback,
            is_loading: false,
            error: store.error.clone(),
            total: u32::try_from(bundled.len()).unwrap_or(u32::MAX),
            channel_filter: store.filters.channel.map(|channel| channel.as_str().to_owned()),
            status_filter: store.filters.status.map(|status| status.as_str().to_owned()),
            search: store.filters.search.clone(),
            groups,
            selected: None,
        }
    }
}

pub fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "Email",
        Channel::Sms => "SMS",
        Channel::Whatsapp => "WhatsApp",
    }
}

pub fn template_status_label(status: TemplateStatus) -> &'static str {
    match status {
        TemplateStatus::Draft => "Brouillon",
        TemplateStatus::Active => "Actif",
        TemplateStatus::Archived => "Archivé",
    }
}

fn remote_row(template: &MessageTemplate) -> TemplateRowView {
    TemplateRowView {
        id: Some(template.id.clone()),
        name: template.name.clone(),
        category: template.category.as_str().to_owned(),
        status: template.status.as_str().to_owned(),
        status_label: template_status_label(template.status).to_owned(),
        subject: template.subject.clone(),
        content: template.content.clone(),
        variables: template.variables.clone(),
        undeclared_variables: template.undeclared_variables(),
        can_activate: template.status == TemplateStatus::Draft,
    }
}

struct BundledTemplate {
    channel: Channel,
    name: &'static str,
    category: TemplateCategory,
    subject: Option<&'static str>,
    content: &'static str,
}

fn bundled_row(template: &BundledTemplate) -> TemplateRowView {
    TemplateRowView {
        id: None,
        name: template.name.to_owned(),
        category: template.category.as_str().to_owned(),
        status: TemplateStatus::Active.as_str().to_owned(),
        status_label: template_status_label(TemplateStatus::Active).to_owned(),
        subject: template.subject.map(str::to_owned),
        content: template.content.to_owned(),
        variables: extract_variables(template.content),
        undeclared_variables: Vec::new(),
        can_activate: false,
    }
}

/// Copy of the default templates shipped with the panel, shown offline only.
fn bundled_templates() -> Vec<BundledTemplate> {
    vec![
        BundledTemplate {
            channel: Channel::Email,
            name: "bienvenue_email",
            category: TemplateCategory::Welcome,
            subject: Some("Bienvenue {{prenom}} !"),
            content: "Bonjour {{prenom}},\n\nMerci pour votre intérêt. {{conseiller}} vous recontacte très vite pour échanger sur votre projet.\n\nÀ bientôt,\nL'équipe {{agence}}",
        },
        BundledTemplate {
            channel: Channel::Sms,
            name: "relance_j4_sms",
            category: TemplateCategory::FollowUp,
            subject: None,
            content: "Bonjour {{prenom}}, avez-vous pu consulter notre proposition ? Répondez à ce SMS pour en parler. {{agence}}",
        },
        BundledTemplate {
            channel: Channel::Sms,
            name: "rappel_rdv_sms",
            category: TemplateCategory::Reminder,
            subject: None,
            content: "Rappel : rendez-vous le {{date_rdv}} à {{heure_rdv}} avec {{conseiller}}. Répondez STOP pour annuler.",
        },
        BundledTemplate {
            channel: Channel::Whatsapp,
            name: "relance_j3_whatsapp",
            category: TemplateCategory::FollowUp,
            subject: None,
            content: "Bonjour {{prenom}} 👋 Je reviens vers vous suite à votre demande. Êtes-vous toujours intéressé(e) ?",
        },
        BundledTemplate {
            channel: Channel::Whatsapp,
            name: "reactivation_whatsapp",
            category: TemplateCategory::Promotional,
            subject: None,
            content: "Bonjour {{prenom}}, cela fait un moment ! Votre projet est-il toujours d'actualité ? {{conseiller}} reste disponible.",
        },
    ]
}
