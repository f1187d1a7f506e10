//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod auto_guard;
mod filters;
mod template;
mod workflow;
mod workflow_catalog;

pub use auto_guard::{AutoGuardConfig, RateLimits, SendingWindow};
pub use filters::{AutomationFilters, TemplateFilters};
pub use template::{
    Channel, CreateTemplateInput, MessageTemplate, TemplateCategory, TemplateCounts,
    TemplateCreator, TemplateGroups, TemplateStatus, UpdateTemplateInput, extract_variables,
};
pub use workflow::{
    Workflow, WorkflowAction, WorkflowActionConfig, WorkflowActionType, WorkflowExecutionStats,
    WorkflowStatus, WorkflowTrigger, WorkflowTriggerType,
};
pub use workflow_catalog::{
    GENERIC_WORKFLOW_DESCRIPTION, catalog_codes, is_known_workflow_code, materialize_detail,
    materialize_summary,
};
