//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_auth_token_store;
mod http_response;
mod http_template_gateway;
mod http_workflow_engine_gateway;
mod in_memory_auth_token_store;

pub use file_auth_token_store::FileAuthTokenStore;
pub use http_template_gateway::HttpTemplateGateway;
pub use http_workflow_engine_gateway::HttpWorkflowEngineGateway;
pub use in_memory_auth_token_store::InMemoryAuthTokenStore;
