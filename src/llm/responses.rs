//! Adapter for responses-style APIs (the OpenAI Responses API).
//!
//! The instructions and the user input travel as separate top-level fields,
//! and usage is reported as input/output/total tokens.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::config;
use crate::llm::http::{build_client, endpoint_url, post_json};
use crate::llm::prompt::PromptSpec;
use crate::llm::provider::{Provider, ProviderAdapter};
use crate::llm::request::GenerationRequest;
use crate::llm::result::{CommitMessageResult, TokenUsage};

const RESPONSES_PATH: &str = "responses";

/// Talks to `POST {base}/responses`.
pub struct ResponsesAdapter {
    provider: Provider,
    api_key: String,
    endpoint: String,
    client: Client,
}

impl ResponsesAdapter {
    /// Build the OpenAI adapter from the environment.
    ///
    /// Fails with [`LlmError::MissingCredential`] when no API key is set.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = Provider::OpenAi;
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
            endpoint: endpoint_url(base_url, RESPONSES_PATH),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for ResponsesAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<CommitMessageResult, LlmError> {
        let model = config::resolve_model(self.provider, request.model());
        let language = config::resolve_language(request.language());
        let prompt = PromptSpec::build(request, &language);

        debug!(
            "Requesting commit message from {} (model={}, language={}, items={})",
            self.provider,
            model,
            language,
            prompt.content.len()
        );

        let payload = ResponsesRequest::new(&model, &prompt);
        let response: ResponsesResponse = post_json(
            &self.client,
            self.provider,
            &self.endpoint,
            &self.api_key,
            &payload,
        )
        .await?;

        let text = response.output_text();
        if text.trim().is_empty() {
            if let Some(reason) = response.failure_reason() {
                return Err(LlmError::backend(self.provider, reason));
            }
        }

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
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: Vec<InputMessage<'a>>,
}

impl<'a> ResponsesRequest<'a> {
    fn new(model: &'a str, prompt: &'a PromptSpec) -> Self {
        Self {
            model,
            instructions: &prompt.instructions,
            input: prompt
                .content
                .iter()
                .map(|item| InputMessage {
                    role: item.role.as_str(),
                    content: &item.text,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    usage: Option<ResponsesUsage>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<ResponseError>,
    #[serde(default)]
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
struct ResponseError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: Option<String>,
}

impl ResponsesResponse {
    /// Concatenate every `output_text` part of every message item.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                OutputItem::Other => None,
            })
            .flatten()
            .filter_map(|part| match part {
                OutputContent::OutputText { text } => Some(text.as_str()),
                OutputContent::Other => None,
            })
            .collect()
    }

    /// Why the backend produced no answer, when it said so.
    ///
    /// A failed reply carries `error.message`; an incomplete one carries
    /// `incomplete_details.reason` (e.g. `max_output_tokens`).
    fn failure_reason(&self) -> Option<String> {
        if let Some(message) = self
            .error
            .as_ref()
            .map(|e| e.message.trim())
            .filter(|m| !m.is_empty())
        {
            return Some(message.to_string());
        }

        match self.status.as_deref() {
            Some("incomplete") => {
                let reason = self
                    .incomplete_details
                    .as_ref()
                    .and_then(|d| d.reason.as_deref())
                    .unwrap_or("unknown reason");
                Some(format!("response incomplete: {reason}"))
            }
            Some("failed") => Some("response failed".to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ResponsesUsage {
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl From<ResponsesUsage> for TokenUsage {
    fn from(usage: ResponsesUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}
