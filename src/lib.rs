//! git-commit-message - generate Git commit messages from the staged diff.
//!
//! # Overview
//!
//! The staged diff and an optional hint are sent to a hosted LLM (OpenAI or
//! Google Gemini). The reply becomes the commit message, which is printed or
//! committed directly.
//!
//! The [`llm`] module is provider-agnostic: [`llm::prompt`] builds the
//! instructions, two adapters speak the chat-completions and responses wire
//! shapes, and [`llm::router`] picks one per call.

pub mod error;
pub mod git;
pub mod llm;

// Re-export commonly used types
pub use error::{GitError, LlmError};
pub use llm::{CommitMessageResult, GenerationRequest, Provider, ProviderAdapter};
