//! Supported providers and the adapter contract every backend implements.

use std::fmt;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::request::GenerationRequest;
use crate::llm::result::CommitMessageResult;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Provider {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "google")]
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Google => "google",
        }
    }

    /// Parse a provider name. Only the exact lowercase names are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Provider::OpenAi),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend that turns a [`GenerationRequest`] into a commit message.
///
/// Each implementation owns one request/response wire shape. Implementations
/// issue exactly one outbound request per call and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Generate a commit message together with usage and debugging metadata.
    async fn invoke(&self, request: &GenerationRequest) -> Result<CommitMessageResult, LlmError>;

    /// Generate a commit message, discarding the metadata.
    async fn invoke_simple(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let result = self.invoke(request).await?;
        Ok(result.into_message())
    }
}
