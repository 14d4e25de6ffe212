//! Provider selection.
//!
//! The provider is resolved again on every call, so environment changes take
//! effect without a restart. Once resolved, the request goes to that
//! provider's adapter unchanged and its result comes back as-is.

use tracing::debug;

use crate::error::LlmError;
use crate::llm::chat::ChatAdapter;
use crate::llm::config;
use crate::llm::provider::{Provider, ProviderAdapter};
use crate::llm::request::GenerationRequest;
use crate::llm::responses::ResponsesAdapter;
use crate::llm::result::CommitMessageResult;

/// Marker that sends a model name to Google.
const GEMINI_MODEL_MARKER: &str = "gemini";

/// Infer the provider from a model name.
///
/// Any name containing "gemini" (case-insensitive) selects Google, so
/// `not-gemini-3` also does.
pub fn infer_provider_from_model(model: Option<&str>) -> Provider {
    match model {
        Some(name) if name.to_lowercase().contains(GEMINI_MODEL_MARKER) => Provider::Google,
        _ => Provider::OpenAi,
    }
}

/// Pick the provider for a call.
///
/// Order: the `GIT_COMMIT_MESSAGE_PROVIDER` override (even over `explicit`),
/// then `explicit`, then inference from `model`.
pub fn resolve_provider(explicit: Option<Provider>, model: Option<&str>) -> Provider {
    config::provider_override()
        .or(explicit)
        .unwrap_or_else(|| infer_provider_from_model(model))
}

/// Build the adapter for `provider` from the environment.
pub fn adapter_for(provider: Provider) -> Result<Box<dyn ProviderAdapter>, LlmError> {
    let adapter: Box<dyn ProviderAdapter> = match provider {
        Provider::OpenAi => Box::new(ResponsesAdapter::from_env()?),
        Provider::Google => Box::new(ChatAdapter::from_env()?),
    };
    Ok(adapter)
}

/// Generate a commit message.
pub async fn generate(request: &GenerationRequest) -> Result<String, LlmError> {
    let adapter = select_adapter(request)?;
    adapter.invoke_simple(request).await
}

/// Generate a commit message together with model, usage, and prompt details.
pub async fn generate_with_info(
    request: &GenerationRequest,
) -> Result<CommitMessageResult, LlmError> {
    let adapter = select_adapter(request)?;
    forward(adapter.as_ref(), request).await
}

async fn forward(
    adapter: &dyn ProviderAdapter,
    request: &GenerationRequest,
) -> Result<CommitMessageResult, LlmError> {
    let result = adapter.invoke(request).await?;
    debug!(
        "{} answered (model={}, response_id={:?}, total_tokens={:?})",
        result.provider(),
        result.model(),
        result.response_id(),
        result.total_tokens()
    );
    Ok(result)
}

fn select_adapter(request: &GenerationRequest) -> Result<Box<dyn ProviderAdapter>, LlmError> {
    let provider = resolve_provider(request.provider(), request.model());
    debug!(
        "Resolved provider {} (explicit={:?}, model={:?})",
        provider,
        request.provider(),
        request.model()
    );
    adapter_for(provider)
}
