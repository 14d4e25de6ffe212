//! Prompt construction shared by every provider.
//!
//! The instructions depend only on the output mode, the subject length limit
//! and the target language. The diff and the optional hint travel separately
//! as user content items so each backend can place them in its own request
//! shape.

use std::num::NonZeroUsize;

use crate::llm::request::GenerationRequest;

/// Subject length limit used when the caller does not set one.
pub const DEFAULT_SUBJECT_MAX: usize = 72;

const HINT_HEADER: &str = "# Auxiliary context (user-provided)";
const DIFF_HEADER: &str = "# Changes (diff)";

/// Role of a content item. Only user content is produced; the instructions
/// are carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
        }
    }
}

/// One piece of user content sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub role: Role,
    pub text: String,
}

impl ContentItem {
    fn user(text: String) -> Self {
        Self {
            role: Role::User,
            text,
        }
    }
}

/// Instructions plus ordered user content for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub instructions: String,
    pub content: Vec<ContentItem>,
}

impl PromptSpec {
    /// Build the prompt for `request` using an already resolved language.
    pub fn build(request: &GenerationRequest, language: &str) -> Self {
        Self {
            instructions: build_instructions(
                request.single_line(),
                request.subject_max(),
                language,
            ),
            content: build_content(request.diff(), request.hint()),
        }
    }

    /// The user content joined by a blank line, for debug output.
    pub fn combined_prompt(&self) -> String {
        combined_prompt(&self.content)
    }
}

/// Build the instruction text given to the model.
pub fn build_instructions(
    single_line: bool,
    subject_max: Option<NonZeroUsize>,
    language: &str,
) -> String {
    let max_len = subject_max.map_or(DEFAULT_SUBJECT_MAX, NonZeroUsize::get);

    if single_line {
        return format!(
            "You are an expert Git commit message generator. \
             Always use '{language}' spelling and style. \
             Return exactly one line: an imperative subject of at most {max_len} characters. \
             Do not add a body, a second line, or any line break. \
             Consider the user-provided auxiliary context if present. \
             Return only the commit message text, with no code fences, labels, \
             or prefixes such as 'Commit message:'."
        );
    }

    format!(
        r#"You are an expert Git commit message generator. Always use '{language}' spelling and style. The subject line is mandatory: the very first non-empty line of your output MUST be the subject, written in imperative mood and at most {max_len} characters long. Put exactly one blank line after the subject. Never start with a bullet, heading, label, or any other text. Then write the body in the format below.

Example format (the --- lines are delimiters and must not appear in the output):

---

<Subject line>

- <detail 1>
- <detail 2>
- <detail N>

<Rationale label translated into the target language>: <1-2 concise sentences explaining the intent and why>

---

Guidelines:
- The first non-empty line MUST be the subject line, followed by exactly one blank line.
- Never place bullets, headings, or labels before the subject line.
- Use '-' bullets and keep each bullet to a single line.
- Prefer imperative verbs (Add, Fix, Update, Remove, Refactor, Document, ...).
- Describe what changed and why; do not paste diff hunks.
- The only label allowed is the equivalent of 'Rationale:' translated into the target language; add no other headings or prefaces.
- Do not output the '---' delimiter lines, code fences, or wrappers such as 'Commit message:'.
- Do not reuse any example text verbatim; write original content from the diff and context provided.
- If few details are needed, still include at least one bullet summarising the key change.
- If you cannot write any body content, still output the subject line; it must never be omitted.
- Consider the user-provided auxiliary context if present.
Return only the commit message text in the format above."#
    )
}

/// Build the ordered user content: the hint (when non-empty) and then the diff.
pub fn build_content(diff: &str, hint: Option<&str>) -> Vec<ContentItem> {
    let mut items = Vec::with_capacity(2);
    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
        items.push(ContentItem::user(format!("{HINT_HEADER}\n{hint}")));
    }
    items.push(ContentItem::user(format!("{DIFF_HEADER}\n{diff}")));
    items
}

/// Join content items with a blank line.
pub fn combined_prompt(items: &[ContentItem]) -> String {
    items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
