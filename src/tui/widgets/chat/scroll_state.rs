/// Viewport over the transcript. Follows new output until the user scrolls,
/// then stays put until they return to the bottom.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    position: usize,
    total_lines: usize,
    viewport_height: usize,
    manual_scroll: bool,
}

impl ScrollState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: 0,
            total_lines: 0,
            viewport_height: 0,
            manual_scroll: false,
        }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn is_manual_scroll(&self) -> bool {
        self.manual_scroll
    }

    #[must_use]
    pub const fn is_at_bottom(&self) -> bool {
        self.lines_below() == 0
    }

    /// Transcript lines hidden under the viewport.
    #[must_use]
    pub const fn lines_below(&self) -> usize {
        self.max_scroll().saturating_sub(self.position)
    }

    pub fn update(&mut self, total_lines: usize, viewport_height: usize) {
        self.total_lines = total_lines;
        self.viewport_height = viewport_height;
        self.position = self.position.min(self.max_scroll());
        if self.manual_scroll && self.is_at_bottom() {
            self.manual_scroll = false;
        }
    }

    pub const fn scroll_to_bottom(&mut self) {
        self.position = self.max_scroll();
        self.manual_scroll = false;
    }

    pub const fn scroll_to_top(&mut self) {
        self.position = 0;
        self.manual_scroll = true;
    }

    pub const fn scroll_up(&mut self, lines: usize) {
        self.position = self.position.saturating_sub(lines);
        self.manual_scroll = true;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.position = (self.position + lines).min(self.max_scroll());
        self.manual_scroll = true;
    }

    pub const fn reset_manual_scroll(&mut self) {
        self.manual_scroll = false;
    }

    const fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_transcript_is_at_bottom() {
        let mut state = ScrollState::new();
        state.update(5, 10);
        assert!(state.is_at_bottom());
        assert_eq!(state.lines_below(), 0);
    }

    #[test]
    fn test_counts_hidden_lines() {
        let mut state = ScrollState::new();
        state.update(30, 10);
        assert_eq!(state.lines_below(), 20);

        state.scroll_down(5);
        assert_eq!(state.lines_below(), 15);
        assert!(state.is_manual_scroll());
    }

    #[test]
    fn test_clamps_to_bounds() {
        let mut state = ScrollState::new();
        state.update(20, 10);

        state.scroll_down(100);
        assert_eq!(state.position(), 10);

        state.scroll_up(100);
        assert_eq!(state.position(), 0);
    }

    #[test]
    fn test_reaching_bottom_resumes_following() {
        let mut state = ScrollState::new();
        state.update(20, 10);
        state.scroll_down(3);
        assert!(state.is_manual_scroll());

        state.scroll_down(100);
        state.update(20, 10);
        assert!(!state.is_manual_scroll());
    }

    #[test]
    fn test_shrinking_transcript_clamps_position() {
        let mut state = ScrollState::new();
        state.update(100, 10);
        state.scroll_down(50);

        state.update(20, 10);
        assert_eq!(state.position(), 10);
    }
}
