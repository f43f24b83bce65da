use regex::{RegexSet, RegexSetBuilder};

use super::error::{ChatError, Result};

pub const DEFAULT_REFUSAL: &str =
    "I'm sorry, but I can't help with that. Is there something else I can do for you?";

pub const DEFAULT_DENYLIST: &[&str] = &[
    "bomb",
    "explosive",
    "build a weapon",
    "make a weapon",
    "poison someone",
    "kill someone",
    "hurt myself",
    "suicide",
    "self-harm",
    "hack into",
    "steal a password",
    "credit card numbers",
];

/// Local gate that rejects prompts before any remote call. Terms match as
/// case-insensitive substrings.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    patterns: RegexSet,
    terms: Vec<String>,
    refusal: String,
}

impl SafetyFilter {
    pub fn new<I, S>(terms: I, refusal: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let patterns = RegexSetBuilder::new(terms.iter().map(|t| regex::escape(t)))
            .case_insensitive(true)
            .build()
            .map_err(|e| ChatError::Config(format!("Invalid denylist: {e}")))?;

        Ok(Self {
            patterns,
            terms,
            refusal: refusal.into(),
        })
    }

    #[must_use]
    pub fn permissive() -> Self {
        Self {
            patterns: RegexSet::empty(),
            terms: Vec::new(),
            refusal: DEFAULT_REFUSAL.to_string(),
        }
    }

    /// Returns the first matching term, if any.
    #[must_use]
    pub fn check(&self, prompt: &str) -> Option<&str> {
        self.patterns
            .matches(prompt)
            .iter()
            .next()
            .map(|idx| self.terms[idx].as_str())
    }

    #[must_use]
    pub fn is_blocked(&self, prompt: &str) -> bool {
        self.patterns.is_match(prompt)
    }

    #[must_use]
    pub fn refusal(&self) -> &str {
        &self.refusal
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST.iter().copied(), DEFAULT_REFUSAL)
            .unwrap_or_else(|_| Self::permissive())
    }
}
