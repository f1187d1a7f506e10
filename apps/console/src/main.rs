//! Atelier automation console: workflows, auto-guard and message templates.

#![forbid(unsafe_code)]

mod console_command;
mod console_config;
mod render;
mod views;

use std::env;
use std::sync::Arc;

use atelier_application::{AuthTokenStore, TemplateStore, WorkflowStore};
use atelier_core::AppError;
use atelier_infrastructure::{
    FileAuthTokenStore, HttpTemplateGateway, HttpWorkflowEngineGateway, InMemoryAuthTokenStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::console_command::{ConsoleCommand, HELP};
use crate::console_config::{ConsoleConfig, init_tracing};
use crate::render::render_page;
use crate::views::AutomationPage;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let token_store: Arc<dyn AuthTokenStore> = match config.bearer_token_override.clone() {
        Some(token) => Arc::new(InMemoryAuthTokenStore::new(Some(token))),
        None => Arc::new(FileAuthTokenStore::new(config.auth_storage_path.clone())),
    };
    let workflow_store = Arc::new(WorkflowStore::new(
        Arc::new(HttpWorkflowEngineGateway::new(
            http_client.clone(),
            config.automation_api_base_url.as_str(),
        )),
        token_store,
    ));
    let template_store = Arc::new(TemplateStore::new(Arc::new(HttpTemplateGateway::new(
        http_client,
        config.templates_api_base_url.clone(),
    ))));

    info!(
        automation_api_base_url = %config.automation_api_base_url,
        templates_api_base_url = %config.templates_api_base_url,
        auth_storage_path = %config.auth_storage_path.display(),
        "atelier-console started"
    );

    let mut page = AutomationPage::new(workflow_store, template_store);
    page.mount().await;

    let mut arguments = env::args().skip(1).collect::<Vec<_>>();
    let as_json = take_flag(&mut arguments, "--json");

    if !arguments.is_empty() {
        let command = ConsoleCommand::parse(&arguments)?;
        run_command(&mut page, command).await;
        print_page(&page, as_json)?;
        return Ok(());
    }

    print_page(&page, as_json)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines
        .next_line()
        .await
        .map_err(|error| AppError::Internal(format!("failed to read stdin: {error}")))?
    {
        let words = input.split_whitespace().collect::<Vec<_>>();
        let command = match ConsoleCommand::parse(&words) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        if !run_command(&mut page, command).await {
            break;
        }
        print_page(&page, as_json)?;
    }

    Ok(())
}

/// Applies one command; returns `false` when the session should end.
async fn run_command(page: &mut AutomationPage, command: ConsoleCommand) -> bool {
    debug!(?command, "running console command");

    match command {
        ConsoleCommand::Show => {}
        ConsoleCommand::Detail(code) => page.select_workflow(code.as_str()),
        ConsoleCommand::CloseDetail => page.close_detail(),
        ConsoleCommand::Trigger(code) => {
            if !page.trigger_workflow(code.as_str()).await {
                warn!(workflow_id = %code, "manual trigger was not accepted");
            }
        }
        ConsoleCommand::ToggleStatus(status) => page.toggle_draft_status(status),
        ConsoleCommand::ToggleTriggerType(trigger_type) => {
            page.toggle_draft_trigger_type(trigger_type);
        }
        ConsoleCommand::Search(search) => page.set_draft_search(search.as_str()),
        ConsoleCommand::Apply => page.apply_filters().await,
        ConsoleCommand::Reset => page.reset_filters().await,
        ConsoleCommand::Dismiss => page.dismiss_error(),
        ConsoleCommand::Retry => page.retry().await,
        ConsoleCommand::Expand(channel) => page.toggle_template_channel(channel),
        ConsoleCommand::TemplateChannelFilter(channel) => page.set_template_channel(channel).await,
        ConsoleCommand::TemplateStatusFilter(status) => page.set_template_status(status).await,
        ConsoleCommand::FindTemplates(search) => page.search_templates(search.as_str()).await,
        ConsoleCommand::OpenTemplate(template_id) => page.open_template(template_id.as_str()).await,
        ConsoleCommand::CloseTemplate => page.close_template(),
        ConsoleCommand::Activate(template_id) => {
            if !page.activate_template(template_id.as_str()).await {
                warn!(template_id = %template_id, "template activation failed");
            }
        }
        ConsoleCommand::Delete(template_id) => {
            if !page.delete_template(template_id.as_str()).await {
                warn!(template_id = %template_id, "template deletion failed");
            }
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return false,
    }

    debug!(filters = ?page.draft_filters(), "draft filters");
    true
}

fn print_page(page: &AutomationPage, as_json: bool) -> Result<(), AppError> {
    let view = page.view();
    if as_json {
        let json = serde_json::to_string_pretty(&view)
            .map_err(|error| AppError::Internal(format!("failed to serialize page: {error}")))?;
        println!("{json}");
    } else {
        print!("{}", render_page(&view));
    }

    Ok(())
}

fn take_flag(arguments: &mut Vec<String>, flag: &str) -> bool {
    let before = arguments.len();
    arguments.retain(|argument| argument != flag);
    arguments.len() != before
}
