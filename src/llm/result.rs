//! The uniform result returned by every provider adapter.

use crate::error::LlmError;
use crate::llm::provider::Provider;

/// Token counts reported by a backend, normalized to prompt/completion/total.
///
/// A field is `None` when the backend did not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// A generated commit message with the metadata needed for debug output.
///
/// Fields are private and only exposed through accessors, so a result cannot
/// be modified after construction. [`CommitMessageResult::new`] rejects blank
/// text, which means a result always carries a non-empty message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessageResult {
    message: String,
    model: String,
    provider: Provider,
    prompt: String,
    response_text: String,
    response_id: Option<String>,
    usage: TokenUsage,
}

impl CommitMessageResult {
    /// Build a result from the backend's aggregate text.
    ///
    /// The text is trimmed; if nothing is left the generation failed.
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        prompt: impl Into<String>,
        text: &str,
        response_id: Option<String>,
        usage: Option<TokenUsage>,
    ) -> Result<Self, LlmError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(LlmError::EmptyGeneration { provider });
        }

        Ok(Self {
            message: message.to_string(),
            model: model.into(),
            provider,
            prompt: prompt.into(),
            response_text: message.to_string(),
            response_id: response_id.filter(|id| !id.trim().is_empty()),
            usage: usage.unwrap_or_default(),
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// The hint and diff content joined by a blank line (audit only).
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn response_text(&self) -> &str {
        &self.response_text
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn prompt_tokens(&self) -> Option<u64> {
        self.usage.prompt_tokens
    }

    pub fn completion_tokens(&self) -> Option<u64> {
        self.usage.completion_tokens
    }

    pub fn total_tokens(&self) -> Option<u64> {
        self.usage.total_tokens
    }

    /// Consume the result, keeping only the message.
    pub fn into_message(self) -> String {
        self.message
    }
}
