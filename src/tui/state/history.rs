use std::collections::VecDeque;

const MAX_HISTORY_SIZE: usize = 100;

/// Past prompts for Up/Down recall. Whatever was being typed when recall
/// started is kept as a draft and handed back after the newest entry.
#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    entries: VecDeque<String>,
    index: Option<usize>,
    draft: Option<String>,
}

impl InputHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            index: None,
            draft: None,
        }
    }

    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new();
        for entry in entries {
            history.push(entry.into());
        }
        history
    }

    pub fn push(&mut self, input: String) {
        self.reset_index();

        if input.trim().is_empty() || self.entries.back() == Some(&input) {
            return;
        }

        self.entries.push_back(input);
        if self.entries.len() > MAX_HISTORY_SIZE {
            self.entries.pop_front();
        }
    }

    /// Older entry. `current` is the unsent input, saved on the first step.
    #[must_use]
    pub fn prev(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        let new_index = match self.index {
            None => {
                self.draft = Some(current.to_string());
                self.entries.len() - 1
            }
            Some(i) => i.saturating_sub(1),
        };

        self.index = Some(new_index);
        self.entries.get(new_index).cloned()
    }

    /// Newer entry, or the saved draft once past the newest.
    #[must_use]
    pub fn next(&mut self) -> Option<String> {
        let i = self.index?;

        if i + 1 >= self.entries.len() {
            self.index = None;
            return self.draft.take();
        }

        self.index = Some(i + 1);
        self.entries.get(i + 1).cloned()
    }

    pub fn reset_index(&mut self) {
        self.index = None;
        self.draft = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
