mod history;
mod messages;
mod outcome;
mod streaming;
mod voice;

pub use history::InputHistory;
pub use voice::VoiceState;

use crate::core::{ConversationMemory, Role};
use crate::tui::widgets::{ChatMessage, ScrollState};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

/// The reply the user is waiting on, from submit until it completes, fails
/// or is cancelled.
#[derive(Debug)]
struct PendingReply {
    started: Instant,
    typing: bool,
    text: String,
}

/// Everything the chat screen shows. Owned by the UI loop alone.
pub struct AppState {
    pub should_quit: bool,
    pub history: InputHistory,
    pub messages: Vec<ChatMessage>,
    pub scroll: ScrollState,
    pub voice: VoiceState,

    pending: Option<PendingReply>,
    /// Replies dropped from view whose final event has not arrived yet,
    /// oldest first. `false` once a clear made their text stale.
    superseded: VecDeque<bool>,
    opened: Instant,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            should_quit: false,
            history: InputHistory::new(),
            messages: Vec::new(),
            scroll: ScrollState::new(),
            voice: VoiceState::default(),
            pending: None,
            superseded: VecDeque::new(),
            opened: Instant::now(),
        }
    }

    /// State showing a previously stored conversation. The persona entry is
    /// not displayed; past prompts seed the input history.
    #[must_use]
    pub fn from_memory(memory: &ConversationMemory) -> Self {
        let shown = memory.messages().iter().filter_map(|m| match m.role() {
            Role::System => None,
            Role::User => Some(ChatMessage::user(m.content())),
            Role::Assistant => Some(ChatMessage::assistant(m.content())),
        });
        let prompts = memory
            .messages()
            .iter()
            .filter(|m| m.role() == Role::User)
            .map(|m| m.content());

        Self {
            messages: shown.collect(),
            history: InputHistory::from_entries(prompts),
            ..Self::new()
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Animation step for spinners, derived from wall time so redraw rate
    /// does not change the speed.
    #[must_use]
    pub fn spinner_frame(&self) -> usize {
        let steps = self.opened.elapsed().as_millis() / SPINNER_INTERVAL.as_millis();
        usize::try_from(steps).unwrap_or_default()
    }

    pub fn begin_reply(&mut self) {
        self.pending = Some(PendingReply {
            started: Instant::now(),
            typing: false,
            text: String::new(),
        });
    }

    /// Stops waiting and hands back whatever text had streamed in.
    pub fn end_reply(&mut self) -> Option<String> {
        self.pending.take().map(|pending| pending.text)
    }

    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.typing)
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.started.elapsed())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = AppState::new();
        assert!(!state.should_quit);
        assert!(!state.is_processing());
        assert!(state.elapsed().is_none());
        assert_eq!(state.spinner_frame(), 0);
    }

    #[test]
    fn test_reply_lifecycle() {
        let mut state = AppState::new();

        state.begin_reply();
        state.set_typing(true);
        assert!(state.is_processing());
        assert!(state.is_typing());
        assert!(state.elapsed().is_some());

        state.append_streaming("partial");
        assert_eq!(state.end_reply().as_deref(), Some("partial"));
        assert!(!state.is_processing());
        assert!(!state.is_typing());
        assert!(state.end_reply().is_none());
    }

    #[test]
    fn test_spinner_advances_with_time() {
        let mut state = AppState::new();
        state.opened -= SPINNER_INTERVAL * 3;
        assert!(state.spinner_frame() >= 3);
    }

    #[test]
    fn test_from_memory_hides_persona_and_seeds_history() {
        let memory = ConversationMemory::new("persona")
            .append(Role::User, "hi", 10)
            .unwrap()
            .append(Role::Assistant, "hello!", 10)
            .unwrap();

        let mut state = AppState::from_memory(&memory);

        assert_eq!(state.messages.len(), 2);
        assert!(matches!(&state.messages[0], ChatMessage::User { text, .. } if text == "hi"));
        assert!(
            matches!(&state.messages[1], ChatMessage::Assistant { text, .. } if text == "hello!")
        );
        assert_eq!(state.history.prev(""), Some("hi".to_string()));
    }
}
