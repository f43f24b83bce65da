use super::AppState;

impl AppState {
    /// Ignored once the reply has ended; a late typing frame must not bring
    /// the indicator back.
    pub fn set_typing(&mut self, typing: bool) {
        if let Some(pending) = &mut self.pending {
            pending.typing = typing;
            self.follow_output();
        }
    }

    pub fn append_streaming(&mut self, chunk: &str) {
        if let Some(pending) = &mut self.pending {
            pending.text.push_str(chunk);
            self.follow_output();
        }
    }

    #[must_use]
    pub fn streaming_text(&self) -> Option<&str> {
        self.pending
            .as_ref()
            .map(|p| p.text.as_str())
            .filter(|text| !text.is_empty())
    }

    fn follow_output(&mut self) {
        if !self.scroll.is_manual_scroll() {
            self.scroll.scroll_to_bottom();
        }
    }
}
