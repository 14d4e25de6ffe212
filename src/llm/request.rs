//! The immutable input to a generation call.

use std::num::NonZeroUsize;

use crate::llm::provider::Provider;

/// Everything a provider adapter needs to generate one commit message.
///
/// Built once with [`GenerationRequest::new`] and the `with_*` methods, then
/// only read. Empty strings given for the hint, model, or language are
/// treated as if they were not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    diff: String,
    hint: Option<String>,
    model: Option<String>,
    single_line: bool,
    subject_max: Option<NonZeroUsize>,
    language: Option<String>,
    provider: Option<Provider>,
}

impl GenerationRequest {
    pub fn new(diff: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            hint: None,
            model: None,
            single_line: false,
            subject_max: None,
            language: None,
            provider: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = non_empty(hint);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = non_empty(model);
        self
    }

    pub fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    pub fn with_subject_max(mut self, subject_max: Option<NonZeroUsize>) -> Self {
        self.subject_max = subject_max;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = non_empty(language);
        self
    }

    pub fn with_provider(mut self, provider: Option<Provider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn diff(&self) -> &str {
        &self.diff
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn single_line(&self) -> bool {
        self.single_line
    }

    pub fn subject_max(&self) -> Option<NonZeroUsize> {
        self.subject_max
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
