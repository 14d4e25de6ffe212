//! HTTP plumbing shared by the provider adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::Provider;

/// Longest slice of a raw error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Build the HTTP client. A timeout is only applied when one is configured.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client, LlmError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| LlmError::InvalidConfig(format!("failed to create HTTP client: {e}")))
}

/// Join an API base URL and an endpoint path with exactly one slash.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// POST `payload` as JSON with bearer auth and decode the JSON reply.
///
/// Transport failures, non-success statuses and undecodable bodies all become
/// [`LlmError::Backend`].
pub(crate) async fn post_json<B, R>(
    client: &Client,
    provider: Provider,
    url: &str,
    api_key: &str,
    payload: &B,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!("POST {} ({})", url, provider);

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(payload)
        .send()
        .await
        .map_err(|e| map_transport_error(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_transport_error(provider, e))?;

    if !status.is_success() {
        return Err(map_http_error(provider, status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        LlmError::backend(provider, format!("could not decode response: {e}"))
    })
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Map a non-success status to a backend error, keeping the backend's message.
///
/// Both backends answer with `{"error": {"message": ...}}`; Gemini's
/// compatibility endpoint sometimes wraps that object in a one-element array.
pub(crate) fn map_http_error(provider: Provider, status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .or_else(|| {
            serde_json::from_str::<Vec<ErrorEnvelope>>(body)
                .ok()
                .and_then(|list| list.into_iter().next())
        })
        .and_then(|envelope| envelope.error)
        .map(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| truncate(body.trim(), MAX_ERROR_BODY_CHARS));

    if message.is_empty() {
        return LlmError::backend(provider, format!("HTTP {status}"));
    }
    LlmError::backend(provider, format!("HTTP {status}: {message}"))
}

fn map_transport_error(provider: Provider, error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        return LlmError::backend(provider, format!("request timed out: {error}"));
    }
    LlmError::backend(provider, format!("transport error: {error}"))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
