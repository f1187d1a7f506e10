use atelier_core::{AppError, AppResult, NonEmptyString, TenantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Email.
    Email,
    /// SMS.
    Sms,
    /// WhatsApp.
    Whatsapp,
}

impl Channel {
    /// All channels in display order.
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Whatsapp];

    /// Returns stable channel value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Parses a stable channel value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "whatsapp" => Ok(Self::Whatsapp),
            other => Err(AppError::Validation(format!(
                "unknown channel '{other}'"
            ))),
        }
    }
}

/// Business category of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    /// First contact.
    Welcome,
    /// Follow-up after no answer.
    FollowUp,
    /// Reminder.
    Reminder,
    /// Appointment confirmation.
    Appointment,
    /// Marketing message.
    Promotional,
    /// Transactional message.
    Transactional,
    /// Anything else, including categories added server-side later.
    #[serde(other)]
    Other,
}

impl TemplateCategory {
    /// Returns stable category value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::FollowUp => "follow_up",
            Self::Reminder => "reminder",
            Self::Appointment => "appointment",
            Self::Promotional => "promotional",
            Self::Transactional => "transactional",
            Self::Other => "other",
        }
    }
}

/// Lifecycle status of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    /// Editable, not used by workflows yet.
    Draft,
    /// Usable by workflows.
    Active,
    /// Soft-deleted.
    Archived,
}

impl TemplateStatus {
    /// Returns stable status value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parses a stable status value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(AppError::Validation(format!(
                "unknown template status '{other}'"
            ))),
        }
    }
}

/// Who authored a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCreator {
    /// A CRM user.
    User,
    /// The Max assistant.
    #[serde(alias = "max_assistant", alias = "max-assistant")]
    Max,
    /// Seeded by the platform.
    System,
}

/// Reusable message body for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Template identifier.
    pub id: String,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Delivery channel.
    pub channel: Channel,
    /// Display name, also used as a reference by workflow steps.
    pub name: String,
    /// Business category.
    pub category: TemplateCategory,
    /// Subject line, email only.
    #[serde(default)]
    pub subject: Option<String>,
    /// Body with `{{variable}}` placeholders.
    pub content: String,
    /// Declared variable names.
    #[serde(default)]
    pub variables: Vec<String>,
    /// WhatsApp sender number.
    #[serde(default)]
    pub whatsapp_from: Option<String>,
    /// WhatsApp approved content SID.
    #[serde(default)]
    pub whatsapp_content_sid: Option<String>,
    /// Lifecycle status.
    pub status: TemplateStatus,
    /// Author kind.
    pub created_by: TemplateCreator,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MessageTemplate {
    /// Returns whether `reference` names this template by exact name or id.
    #[must_use]
    pub fn matches_reference(&self, reference: &str) -> bool {
        self.name == reference || self.id == reference
    }

    /// Returns placeholders used in the content but missing from `variables`.
    #[must_use]
    pub fn undeclared_variables(&self) -> Vec<String> {
        extract_variables(self.content.as_str())
            .into_iter()
            .filter(|name| !self.variables.contains(name))
            .collect()
    }
}

/// Returns `{{name}}` placeholders in first-appearance order, without duplicates.
#[must_use]
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };

        let name = after_open[..end].trim();
        if is_variable_name(name) && !names.iter().any(|existing| existing == name) {
            names.push(name.to_owned());
        }

        rest = &after_open[end + 2..];
    }

    names
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|character| character.is_alphanumeric() || matches!(character, '_' | '.'))
}

/// Payload used to create a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplateInput {
    /// Delivery channel.
    pub channel: Channel,
    /// Display name.
    pub name: String,
    /// Business category.
    pub category: TemplateCategory,
    /// Subject line, required for email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Body with placeholders.
    pub content: String,
    /// Declared variables; extracted from the content when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,
    /// WhatsApp sender number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_from: Option<String>,
    /// WhatsApp approved content SID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_content_sid: Option<String>,
}

impl CreateTemplateInput {
    /// Validates the payload and fills extracted variables when none were given.
    pub fn validated(self) -> AppResult<Self> {
        let name = NonEmptyString::new(self.name)
            .map_err(|_| AppError::Validation("Le nom du template est requis".to_owned()))?;
        let content = NonEmptyString::new(self.content)
            .map_err(|_| AppError::Validation("Le contenu du template est requis".to_owned()))?;

        let subject = self.subject.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });
        if self.channel == Channel::Email && subject.is_none() {
            return Err(AppError::Validation(
                "Un objet est requis pour un template email".to_owned(),
            ));
        }

        let content = String::from(content);
        let variables = self
            .variables
            .unwrap_or_else(|| extract_variables(content.as_str()));

        Ok(Self {
            channel: self.channel,
            name: String::from(name).trim().to_owned(),
            category: self.category,
            subject,
            content,
            variables: Some(variables),
            whatsapp_from: self.whatsapp_from,
            whatsapp_content_sid: self.whatsapp_content_sid,
        })
    }
}

/// Partial template update; absent fields are left unchanged remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTemplateInput {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TemplateCategory>,
    /// New subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New declared variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vec<String>>,
    /// New WhatsApp sender number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_from: Option<String>,
    /// New WhatsApp content SID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_content_sid: Option<String>,
}

/// Templates partitioned by channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGroups {
    /// Email templates.
    #[serde(default)]
    pub email: Vec<MessageTemplate>,
    /// SMS templates.
    #[serde(default)]
    pub sms: Vec<MessageTemplate>,
    /// WhatsApp templates.
    #[serde(default)]
    pub whatsapp: Vec<MessageTemplate>,
}

impl TemplateGroups {
    /// Partitions templates by channel, keeping their relative order.
    #[must_use]
    pub fn from_templates(templates: &[MessageTemplate]) -> Self {
        let mut groups = Self::default();
        for template in templates {
            groups.channel_mut(template.channel).push(template.clone());
        }
        groups
    }

    /// Returns templates of one channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &[MessageTemplate] {
        match channel {
            Channel::Email => self.email.as_slice(),
            Channel::Sms => self.sms.as_slice(),
            Channel::Whatsapp => self.whatsapp.as_slice(),
        }
    }

    /// Returns mutable templates of one channel.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut Vec<MessageTemplate> {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Sms => &mut self.sms,
            Channel::Whatsapp => &mut self.whatsapp,
        }
    }

    /// Removes a template from every channel group.
    pub fn remove(&mut self, template_id: &str) {
        for channel in Channel::ALL {
            self.channel_mut(channel)
                .retain(|template| template.id != template_id);
        }
    }

    /// Replaces a template in place, moving it when its channel changed.
    pub fn replace(&mut self, updated: &MessageTemplate) {
        let mut moved = false;
        for channel in Channel::ALL {
            if channel == updated.channel {
                continue;
            }
            let group = self.channel_mut(channel);
            let before = group.len();
            group.retain(|template| template.id != updated.id);
            moved |= group.len() != before;
        }

        let group = self.channel_mut(updated.channel);
        if let Some(existing) = group.iter_mut().find(|template| template.id == updated.id) {
            *existing = updated.clone();
        } else if moved {
            group.push(updated.clone());
        }
    }
}

/// Template counts per channel as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCounts {
    /// Email templates.
    #[serde(default)]
    pub email: u32,
    /// SMS templates.
    #[serde(default)]
    pub sms: u32,
    /// WhatsApp templates.
    #[serde(default)]
    pub whatsapp: u32,
}

impl TemplateCounts {
    /// Counts templates per channel locally.
    #[must_use]
    pub fn from_templates(templates: &[MessageTemplate]) -> Self {
        let mut counts = Self::default();
        for template in templates {
            match template.channel {
                Channel::Email => counts.email += 1,
                Channel::Sms => counts.sms += 1,
                Channel::Whatsapp => counts.whatsapp += 1,
            }
        }
        counts
    }

    /// Returns the count for one channel.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Email => self.email,
            Channel::Sms => self.sms,
            Channel::Whatsapp => self.whatsapp,
        }
    }
}
