mod action;
mod key_handler;
mod render;

pub use action::InputAction;

use crate::ui::theme::Theme;
use ratatui::style::Style;
use tui_textarea::TextArea;

const IDLE_PLACEHOLDER: &str = "Message Vexa";
const LISTENING_PLACEHOLDER: &str = "Listening, speak now";

/// One slash command offered while typing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub command: &'static str,
    pub description: &'static str,
}

pub struct InputWidget<'a> {
    textarea: TextArea<'a>,
    suggestions: Vec<Suggestion>,
    selected_suggestion: usize,
    listening: bool,
}

impl InputWidget<'_> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            textarea: Self::create_textarea(IDLE_PLACEHOLDER),
            suggestions: Vec::new(),
            selected_suggestion: 0,
            listening: false,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        let lines: Vec<String> = text.lines().map(ToString::to_string).collect();
        self.textarea = TextArea::new(lines);
        self.configure_textarea();
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
    }

    pub fn clear(&mut self) {
        self.textarea = Self::create_textarea(self.placeholder());
        self.suggestions.clear();
        self.selected_suggestion = 0;
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.textarea.lines().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(String::is_empty)
    }

    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    /// Swaps the placeholder so the user can see the microphone is open.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        self.textarea.set_placeholder_text(self.placeholder());
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    const fn placeholder(&self) -> &'static str {
        if self.listening {
            LISTENING_PLACEHOLDER
        } else {
            IDLE_PLACEHOLDER
        }
    }

    fn create_textarea(placeholder: &str) -> TextArea<'static> {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(placeholder);
        textarea.set_placeholder_style(Theme::muted());
        textarea.set_cursor_line_style(Style::default());
        textarea.set_cursor_style(Theme::white());
        textarea
    }

    fn configure_textarea(&mut self) {
        self.textarea.set_placeholder_text(self.placeholder());
        self.textarea.set_placeholder_style(Theme::muted());
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_cursor_style(Theme::white());
    }
}

impl Default for InputWidget<'_> {
    fn default() -> Self {
        Self::new()
    }
}
