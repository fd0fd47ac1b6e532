//! Free-text instructions.

/// A single run's input: the instruction text plus an optional account hint.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    text: String,
    lowered: String,
    account_id: Option<String>,
}

impl Instruction {
    /// Create an instruction from text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lowered: text.to_ascii_lowercase(),
            text,
            account_id: None,
        }
    }

    /// Attach a target account identifier (looked up when no intent matches).
    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        let account_id = account_id.into();
        self.account_id = (!account_id.is_empty()).then_some(account_id);
        self
    }

    /// Original text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// ASCII-lowercased text. Byte offsets match [`Instruction::text`].
    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Case-insensitive substring test. `needle` must be lowercase.
    pub fn mentions(&self, needle: &str) -> bool {
        self.lowered.contains(needle)
    }

    /// Whitespace-delimited all-digit tokens, in order.
    pub fn numeric_tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().filter(|t| is_numeric_token(t)).collect()
    }

    /// Whether any whitespace-delimited token is all digits.
    pub fn has_numeric_token(&self) -> bool {
        self.text.split_whitespace().any(is_numeric_token)
    }

    /// Original-case text following the first case-insensitive occurrence of `marker`.
    pub fn text_after(&self, marker: &str) -> Option<&str> {
        let start = self.lowered.find(marker)? + marker.len();
        Some(self.text[start..].trim())
    }
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
