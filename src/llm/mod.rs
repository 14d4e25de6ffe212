//! LLM providers, prompt construction, and provider routing.

pub mod chat;
pub mod config;
mod http;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod responses;
pub mod result;
pub mod router;

pub use chat::ChatAdapter;
pub use prompt::{ContentItem, PromptSpec, Role, build_content, build_instructions};
pub use provider::{Provider, ProviderAdapter};
pub use request::GenerationRequest;
pub use responses::ResponsesAdapter;
pub use result::{CommitMessageResult, TokenUsage};
pub use router::{generate, generate_with_info, resolve_provider};
