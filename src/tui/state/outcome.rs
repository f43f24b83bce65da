use crate::core::APOLOGY;

use super::AppState;

/// How each kind of reply ending shows up in the transcript. Events for a
/// superseded reply arrive before those of the reply that replaced it.
impl AppState {
    /// Drops the reply in progress from view; the runner cancels it before
    /// handling the next command, or finishes it if it had already ended.
    pub fn supersede_reply(&mut self) {
        if self.end_reply().is_some() {
            self.superseded.push_back(true);
        }
    }

    /// Empties the transcript. Replies still finishing in the background
    /// belong to the forgotten conversation and will not be shown.
    pub fn clear_conversation(&mut self) {
        self.supersede_reply();
        self.superseded.iter_mut().for_each(|keep| *keep = false);
        self.clear_messages();
    }

    /// Whether typing and fragment events belong to the reply on screen.
    #[must_use]
    pub fn is_current_reply(&self) -> bool {
        self.superseded.is_empty()
    }

    /// Returns the text to read aloud when it completes the current reply.
    pub fn complete_reply(&mut self, text: String) -> Option<String> {
        if let Some(keep) = self.superseded.pop_front() {
            if keep && !text.is_empty() {
                self.add_assistant_message(text);
            }
            return None;
        }

        self.end_reply();
        if text.is_empty() {
            return None;
        }
        self.add_assistant_message(text.clone());
        Some(text)
    }

    /// The refusal is the assistant's answer; memory is left as it was.
    pub fn refuse_reply(&mut self, text: String) {
        if self.superseded.pop_front().is_some() {
            return;
        }
        self.end_reply();
        self.add_assistant_message(text);
    }

    pub fn fail_reply(&mut self) {
        if self.superseded.pop_front().is_some() {
            return;
        }
        self.end_reply();
        self.add_assistant_message(APOLOGY);
    }

    pub fn cancel_reply(&mut self) {
        if self.superseded.pop_front().is_some() {
            return;
        }
        self.end_reply();
        self.add_system_message("Reply cancelled.");
    }
}
