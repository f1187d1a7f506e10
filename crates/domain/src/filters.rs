use serde::{Deserialize, Serialize};

use crate::template::{Channel, TemplateStatus};
use crate::workflow::{Workflow, WorkflowStatus, WorkflowTriggerType};

/// Workflow list filters. Absent fields do not restrict anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationFilters {
    /// Accepted statuses.
    #[serde(default)]
    pub status: Option<Vec<WorkflowStatus>>,
    /// Accepted trigger types.
    #[serde(default)]
    pub trigger_type: Option<Vec<WorkflowTriggerType>>,
    /// Case-insensitive search over name, description and code.
    #[serde(default)]
    pub search: Option<String>,
}

impl AutomationFilters {
    /// Returns whether no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.as_ref().is_none_or(Vec::is_empty)
            && self.trigger_type.as_ref().is_none_or(Vec::is_empty)
            && self
                .search
                .as_deref()
                .is_none_or(|search| search.trim().is_empty())
    }

    /// Returns whether the workflow passes every set filter.
    #[must_use]
    pub fn matches(&self, workflow: &Workflow) -> bool {
        let status_matches = self
            .status
            .as_ref()
            .filter(|statuses| !statuses.is_empty())
            .is_none_or(|statuses| statuses.contains(&workflow.status));

        let trigger_matches = self
            .trigger_type
            .as_ref()
            .filter(|trigger_types| !trigger_types.is_empty())
            .is_none_or(|trigger_types| trigger_types.contains(&workflow.trigger.trigger_type));

        let search_matches = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .is_none_or(|search| {
                let needle = search.to_lowercase();
                [
                    workflow.name.as_str(),
                    workflow.description.as_str(),
                    workflow.id.as_str(),
                ]
                .iter()
                .any(|haystack| haystack.to_lowercase().contains(needle.as_str()))
            });

        status_matches && trigger_matches && search_matches
    }
}

/// Template list filters sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFilters {
    /// Channel restriction.
    pub channel: Option<Channel>,
    /// Status restriction.
    pub status: Option<TemplateStatus>,
    /// Free-text search; blank means none.
    pub search: String,
}

impl TemplateFilters {
    /// Returns the query parameters for the set filters only.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(channel) = self.channel {
            pairs.push(("channel", channel.as_str().to_owned()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_owned()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_owned()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::{AutomationFilters, TemplateFilters};
    use crate::{Channel, TemplateStatus, WorkflowStatus, WorkflowTriggerType, materialize_summary};

    #[test]
    fn empty_filters_match_everything() {
        let workflow = materialize_summary("wf-tag-chaud");
        assert!(AutomationFilters::default().is_empty());
        assert!(AutomationFilters::default().matches(&workflow));
    }

    #[test]
    fn filters_combine_status_trigger_and_search() {
        let workflow = materialize_summary("wf-tag-chaud");

        let matching = AutomationFilters {
            status: Some(vec![WorkflowStatus::Active]),
            trigger_type: Some(vec![WorkflowTriggerType::LeadScored]),
            search: Some("CHAUD".to_owned()),
        };
        assert!(matching.matches(&workflow));

        let wrong_trigger = AutomationFilters {
            trigger_type: Some(vec![WorkflowTriggerType::Schedule]),
            ..AutomationFilters::default()
        };
        assert!(!wrong_trigger.matches(&workflow));
    }

    #[test]
    fn template_query_skips_unset_filters() {
        let filters = TemplateFilters {
            channel: Some(Channel::Whatsapp),
            status: None,
            search: "  ".to_owned(),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![("channel", "whatsapp".to_owned())]
        );

        let filters = TemplateFilters {
            channel: None,
            status: Some(TemplateStatus::Draft),
            search: " relance ".to_owned(),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("status", "draft".to_owned()),
                ("search", "relance".to_owned())
            ]
        );
    }
}
