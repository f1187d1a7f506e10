use atelier_core::AppError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Converts a non-success response into an upstream error, keeping the
/// body's `error` field when present.
pub(crate) async fn upstream_error(response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    AppError::Upstream {
        status,
        message: error_field(body.as_str()),
    }
}

/// Returns the `error` field of a JSON body.
pub(crate) fn error_field(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}

/// Parses a JSON response body into `T`.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, AppError> {
    response.json::<T>().await.map_err(|error| {
        AppError::Internal(format!("failed to parse {endpoint} response body: {error}"))
    })
}

pub(crate) fn transport_error(endpoint: &str, error: &reqwest::Error) -> AppError {
    AppError::Internal(format!("failed to call {endpoint}: {error}"))
}
