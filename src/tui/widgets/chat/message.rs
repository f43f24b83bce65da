use chrono::{DateTime, Local};
use ratatui::style::Style;

use crate::ui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl MessageLevel {
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Info => "[i]",
            Self::Warning => "[!]",
            Self::Error => "[x]",
        }
    }

    #[must_use]
    pub const fn style(&self) -> Style {
        match self {
            Self::Info => Theme::primary(),
            Self::Warning => Theme::warning(),
            Self::Error => Theme::error(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChatMessage {
    User {
        text: String,
        at: DateTime<Local>,
    },
    Assistant {
        text: String,
        at: DateTime<Local>,
    },
    StreamingAssistant(String),
    /// The assistant is composing but has sent no text yet.
    Typing,
    System {
        text: String,
        level: MessageLevel,
    },
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            text: text.into(),
            at: Local::now(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            at: Local::now(),
        }
    }

    #[must_use]
    pub fn system(text: impl Into<String>, level: MessageLevel) -> Self {
        Self::System {
            text: text.into(),
            level,
        }
    }
}
