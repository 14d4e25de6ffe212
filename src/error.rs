//! Error types for git-commit-message modules using thiserror.

use thiserror::Error;

use crate::llm::Provider;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("Repository has no working tree (bare repositories are not supported)")]
    NoWorkTree,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("git executable not found in PATH")]
    GitNotInstalled,

    #[error("Failed to run git commit: {0}")]
    CommitSpawnFailed(#[source] std::io::Error),
}

/// Errors from commit message generation.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("The {variable} environment variable is required to use {provider}.")]
    MissingCredential {
        provider: Provider,
        variable: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("An empty commit message was generated by {provider}.")]
    EmptyGeneration { provider: Provider },

    #[error("{provider} request failed: {message}")]
    Backend { provider: Provider, message: String },
}

impl LlmError {
    pub fn backend(provider: Provider, message: impl Into<String>) -> Self {
        LlmError::Backend {
            provider,
            message: message.into(),
        }
    }

    /// Whether the failure comes from local configuration rather than the backend.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            LlmError::MissingCredential { .. } | LlmError::InvalidConfig(_)
        )
    }

    /// The provider involved, when the error is tied to one.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            LlmError::MissingCredential { provider, .. }
            | LlmError::EmptyGeneration { provider }
            | LlmError::Backend { provider, .. } => Some(*provider),
            LlmError::InvalidConfig(_) => None,
        }
    }
}
