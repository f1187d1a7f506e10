//! Client-side stores and the ports they call.

#![forbid(unsafe_code)]

mod request_sequence;
mod template_ports;
mod template_store;
mod workflow_ports;
mod workflow_store;

pub use request_sequence::{RequestSequence, RequestTicket};
pub use template_ports::{TemplateGateway, TemplateListing};
pub use template_store::{TemplateStore, TemplateStoreState};
pub use workflow_ports::{AuthTokenStore, WorkflowEngineGateway};
pub use workflow_store::{
    NOT_AUTHENTICATED, WorkflowOperation, WorkflowStore, WorkflowStoreState,
    WorkflowTriggerRecord,
};
