use crate::tui::widgets::{ChatMessage, MessageLevel, ScrollState};

use super::AppState;

impl AppState {
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
        self.scroll.reset_manual_scroll();
    }

    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(text));
        self.scroll.reset_manual_scroll();
    }

    pub fn add_system_message(&mut self, text: impl Into<String>) {
        self.add_system_message_with_level(text, MessageLevel::Info);
    }

    pub fn add_system_message_with_level(&mut self, text: impl Into<String>, level: MessageLevel) {
        self.messages.push(ChatMessage::system(text, level));
        self.scroll.reset_manual_scroll();
    }

    /// Transcript plus whatever is in flight: the partial reply, or a typing
    /// row while the assistant is composing with nothing to show yet.
    #[must_use]
    pub fn messages_with_streaming(&self) -> Vec<ChatMessage> {
        let mut all_messages = self.messages.clone();

        if let Some(text) = self.streaming_text() {
            all_messages.push(ChatMessage::StreamingAssistant(text.to_string()));
        } else if self.is_typing() {
            all_messages.push(ChatMessage::Typing);
        }

        all_messages
    }

    /// Clears the screen only. A reply in progress keeps going and shows
    /// whatever streams in from here on.
    pub fn clear_messages(&mut self) {
        self.messages.clear();
        if let Some(pending) = &mut self.pending {
            pending.text.clear();
        }
        self.scroll = ScrollState::new();
    }
}
