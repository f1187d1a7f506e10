use std::env;
use std::path::PathBuf;
use std::time::Duration;

use atelier_core::{AppError, AppResult, BearerToken};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_AUTH_STORAGE_PATH: &str = ".atelier/local-storage.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub automation_api_base_url: Url,
    pub templates_api_base_url: Url,
    pub auth_storage_path: PathBuf,
    pub bearer_token_override: Option<BearerToken>,
    pub http_timeout: Duration,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let automation_api_base_url = parse_base_url(
            "AUTOMATION_API_BASE_URL",
            required(&lookup, "AUTOMATION_API_BASE_URL")?.as_str(),
        )?;
        let templates_api_base_url = match non_empty(&lookup, "TEMPLATES_API_BASE_URL") {
            Some(value) => parse_base_url("TEMPLATES_API_BASE_URL", value.as_str())?,
            None => automation_api_base_url.clone(),
        };

        let auth_storage_path = non_empty(&lookup, "AUTH_STORAGE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_AUTH_STORAGE_PATH), PathBuf::from);
        let bearer_token_override = non_empty(&lookup, "AUTOMATION_BEARER_TOKEN")
            .map(BearerToken::new)
            .transpose()?;

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid HTTP_TIMEOUT_SECS value '{value}': {error}"))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            automation_api_base_url,
            templates_api_base_url,
            auth_storage_path,
            bearer_token_override,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    non_empty(lookup, name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_base_url(name: &str, value: &str) -> AppResult<Url> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "{name} must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}
