//! Environment-backed settings.
//!
//! Every setting has exactly one resolution function, and each call reads the
//! environment again. Nothing is cached, so a changed variable takes effect on
//! the next generation.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::LlmError;
use crate::llm::provider::Provider;

/// Provider override; takes precedence over an explicit provider argument.
pub const PROVIDER_ENV_VAR: &str = "GIT_COMMIT_MESSAGE_PROVIDER";

/// Model override shared by every provider.
pub const MODEL_ENV_VAR: &str = "GIT_COMMIT_MESSAGE_MODEL";

/// Output language/locale override.
pub const LANGUAGE_ENV_VAR: &str = "GIT_COMMIT_MESSAGE_LANGUAGE";

/// Optional HTTP timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "GIT_COMMIT_MESSAGE_TIMEOUT_SECS";

/// Language used when neither the caller nor the environment sets one.
pub const DEFAULT_LANGUAGE: &str = "en-GB";

const OPENAI_DEFAULT_MODEL: &str = "gpt-5-mini";
const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.5-flash";

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const GOOGLE_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Read an environment variable, treating empty and non-unicode values as unset.
pub(crate) fn read_env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Credential variables for a provider, in lookup order.
pub fn api_key_vars(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::OpenAi => &["OPENAI_API_KEY"],
        Provider::Google => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
    }
}

/// Provider-specific model override variable.
pub fn model_env_var(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => "OPENAI_MODEL",
        Provider::Google => "GEMINI_MODEL",
    }
}

/// Base URL override variable.
pub fn base_url_env_var(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => "OPENAI_BASE_URL",
        Provider::Google => "GEMINI_BASE_URL",
    }
}

pub fn default_model(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => OPENAI_DEFAULT_MODEL,
        Provider::Google => GOOGLE_DEFAULT_MODEL,
    }
}

fn default_base_url(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => OPENAI_DEFAULT_BASE_URL,
        Provider::Google => GOOGLE_DEFAULT_BASE_URL,
    }
}

/// Resolve the API key for `provider`.
///
/// A missing key is a configuration error reported before any request is
/// made. The error names the first variable in the lookup order.
pub fn resolve_api_key(provider: Provider) -> Result<String, LlmError> {
    let vars = api_key_vars(provider);
    vars.iter()
        .find_map(|name| read_env_var(name))
        .ok_or(LlmError::MissingCredential {
            provider,
            variable: vars[0],
        })
}

/// Resolve the model: explicit, then provider-specific env, then generic env,
/// then the provider default.
pub fn resolve_model(provider: Provider, explicit: Option<&str>) -> String {
    explicit
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| read_env_var(model_env_var(provider)))
        .or_else(|| read_env_var(MODEL_ENV_VAR))
        .unwrap_or_else(|| default_model(provider).to_string())
}

/// Resolve the output language: explicit, then env, then `en-GB`.
pub fn resolve_language(explicit: Option<&str>) -> String {
    explicit
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .or_else(|| read_env_var(LANGUAGE_ENV_VAR))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Provider named by the environment override, if it names a known provider.
pub fn provider_override() -> Option<Provider> {
    read_env_var(PROVIDER_ENV_VAR).and_then(|v| Provider::from_name(&v))
}

/// Resolve the API base URL for `provider`.
pub fn resolve_base_url(provider: Provider) -> String {
    read_env_var(base_url_env_var(provider))
        .unwrap_or_else(|| default_base_url(provider).to_string())
}

/// Get the configured HTTP timeout, if any.
///
/// Logs a warning and ignores the value when it is not a positive integer.
pub fn resolve_timeout() -> Option<Duration> {
    let value = read_env_var(TIMEOUT_ENV_VAR)?;
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!(
                "Invalid {} value '{}', requests will not time out",
                TIMEOUT_ENV_VAR, value
            );
            None
        }
    }
}
