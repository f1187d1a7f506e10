//! View-models built from store snapshots, exported to TypeScript for the browser panel.

mod auto_guard_config;
mod automation_page;
mod templates_section;
mod workflow_card;
mod workflow_detail;

pub use auto_guard_config::AutoGuardConfigView;
pub use automation_page::{
    AutomationPage, AutomationPageView, ErrorBannerView, FilterDraftView, TriggerNoticeView,
};
pub use templates_section::{
    TemplateGroupView, TemplateRowView, TemplateSource, TemplatesSectionView,
};
pub use workflow_card::{ExecutionStatsView, WorkflowCardView};
pub use workflow_detail::{TemplatePreview, WorkflowDetailView, WorkflowStepView};
