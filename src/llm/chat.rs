//! Adapter for chat-completions APIs.
//!
//! Used for Gemini through Google's OpenAI-compatible endpoint. The
//! instructions are sent as a leading `system` message in the same list as
//! the user content, and usage is reported as prompt/completion/total tokens.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::LlmError;
use crate::llm::config;
use crate::llm::http::{build_client, endpoint_url, post_json};
use crate::llm::prompt::PromptSpec;
use crate::llm::provider::{Provider, ProviderAdapter};
use crate::llm::request::GenerationRequest;
use crate::llm::result::{CommitMessageResult, TokenUsage};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Talks to `POST {base}/chat/completions`.
pub struct ChatAdapter {
    provider: Provider,
    api_key: String,
    endpoint: String,
    client: Client,
}

impl ChatAdapter {
    /// Build the Gemini adapter from the environment.
    ///
    /// Fails with [`LlmError::MissingCredential`] when no API key is set.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = Provider::Google;
        let api_key = config::resolve_api_key(provider)?;
        Self::with_config(
            provider,
            api_key,
            &config::resolve_base_url(provider),
            config::resolve_timeout(),
        )
    }

    pub fn with_config(
        provider: Provider,
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            provider,
            api_key: api_key.into(),
            endpoint: endpoint_url(base_url, CHAT_COMPLETIONS_PATH),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for ChatAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<CommitMessageResult, LlmError> {
        let model = config::resolve_model(self.provider, request.model());
        let language = config::resolve_language(request.language());
        let prompt = PromptSpec::build(request, &language);

        debug!(
            "Requesting commit message from {} (model={}, language={}, messages={})",
            self.provider,
            model,
            language,
            prompt.content.len() + 1
        );

        let payload = ChatRequest::new(&model, &prompt);
        let response: ChatResponse = post_json(
            &self.client,
            self.provider,
            &self.endpoint,
            &self.api_key,
            &payload,
        )
        .await?;

        let text = response
            .choices
            .first()
            .map(ChatChoice::text)
            .unwrap_or_default();

        CommitMessageResult::new(
            self.provider,
            model,
            prompt.combined_prompt(),
            &text,
            response.id,
            response.usage.map(TokenUsage::from),
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, prompt: &'a PromptSpec) -> Self {
        let mut messages = Vec::with_capacity(prompt.content.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: &prompt.instructions,
        });
        messages.extend(prompt.content.iter().map(|item| ChatMessage {
            role: item.role.as_str(),
            content: &item.text,
        }));
        Self { model, messages }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

impl ChatChoice {
    /// The message content, whether sent as a string or as text parts.
    fn text(&self) -> String {
        let Some(content) = self.message.as_ref().and_then(|m| m.content.as_ref()) else {
            return String::new();
        };
        match content {
            Value::String(text) => text.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(map) => map.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}
