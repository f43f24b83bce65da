use serde::{Deserialize, Serialize};

use super::error::{ChatError, Result};
use super::types::{ConversationMessage, Role};

pub const DEFAULT_MEMORY_LENGTH: usize = 100;

/// Smallest usable limit: the persona plus the newest entry.
pub const MIN_MEMORY_LENGTH: usize = 2;

pub const DEFAULT_PERSONA: &str = "You are Vexa, a warm and concise conversational assistant. \
Answer clearly, keep replies short enough to be read aloud, and never claim abilities you do not have.";

/// Clamps a configured limit to [`MIN_MEMORY_LENGTH`].
#[must_use]
pub fn clamp_limit(max_length: usize) -> usize {
    if max_length < MIN_MEMORY_LENGTH {
        tracing::warn!(
            requested = max_length,
            applied = MIN_MEMORY_LENGTH,
            "Memory limit too small, clamping"
        );
        MIN_MEMORY_LENGTH
    } else {
        max_length
    }
}

/// Ordered dialogue history. Index 0 is always the persona `system` message
/// and no other entry has the `system` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConversationMessage>", into = "Vec<ConversationMessage>")]
pub struct ConversationMemory {
    messages: Vec<ConversationMessage>,
}

impl ConversationMemory {
    #[must_use]
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            messages: vec![ConversationMessage::system(persona)],
        }
    }

    pub fn from_messages(messages: Vec<ConversationMessage>) -> Result<Self> {
        let Some(first) = messages.first() else {
            return Err(ChatError::InvalidMemory("memory is empty".to_string()));
        };

        if first.role() != Role::System {
            return Err(ChatError::InvalidMemory(format!(
                "first entry must be system, found {}",
                first.role()
            )));
        }

        if let Some(pos) = messages
            .iter()
            .skip(1)
            .position(|m| m.role() == Role::System)
        {
            return Err(ChatError::InvalidMemory(format!(
                "unexpected system entry at index {}",
                pos + 1
            )));
        }

        Ok(Self { messages })
    }

    /// Returns a new memory with the entry appended, evicting from index 1
    /// until the length fits `max_length`.
    pub fn append(
        &self,
        role: Role,
        content: impl Into<String>,
        max_length: usize,
    ) -> Result<Self> {
        if role == Role::System {
            return Err(ChatError::InvalidMemory(
                "only the persona may hold the system role".to_string(),
            ));
        }

        let mut messages = self.messages.clone();
        messages.push(ConversationMessage::new(role, content));

        let mut next = Self { messages };
        next.evict_to(max_length);
        Ok(next)
    }

    /// Applies the eviction policy to an existing sequence.
    #[must_use]
    pub fn truncated(mut self, max_length: usize) -> Self {
        self.evict_to(max_length);
        self
    }

    #[must_use]
    pub fn cleared(&self) -> Self {
        Self::new(self.persona())
    }

    #[must_use]
    pub fn persona(&self) -> &str {
        self.messages[0].content()
    }

    #[must_use]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: the persona is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether nothing beyond the persona has been recorded yet.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1
    }

    fn evict_to(&mut self, max_length: usize) {
        let limit = clamp_limit(max_length);
        if self.messages.len() > limit {
            let excess = self.messages.len() - limit;
            self.messages.drain(1..=excess);
        }
    }
}

impl TryFrom<Vec<ConversationMessage>> for ConversationMemory {
    type Error = ChatError;

    fn try_from(messages: Vec<ConversationMessage>) -> Result<Self> {
        Self::from_messages(messages)
    }
}

impl From<ConversationMemory> for Vec<ConversationMessage> {
    fn from(memory: ConversationMemory) -> Self {
        memory.messages
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}
