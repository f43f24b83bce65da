use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{InputAction, InputWidget, Suggestion};
use crate::tui::app::SLASH_COMMANDS;

impl InputWidget<'_> {
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => self.handle_esc(),

            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.apply_selected_suggestion();
                InputAction::Continue
            }
            (KeyCode::BackTab, _) => {
                self.select_previous_suggestion();
                InputAction::Continue
            }

            (KeyCode::Down, KeyModifiers::NONE) => self.handle_down(),
            (KeyCode::Up, KeyModifiers::NONE) => self.handle_up(),

            (KeyCode::Enter, KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                self.textarea.insert_newline();
                self.hide_suggestions();
                InputAction::Continue
            }
            (KeyCode::Enter, KeyModifiers::NONE) => self.handle_enter(),

            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputAction::Clear
            }

            _ => {
                self.textarea.input(key);
                self.refresh_suggestions();
                InputAction::Continue
            }
        }
    }

    pub fn handle_paste(&mut self, text: String) -> InputAction {
        self.hide_suggestions();
        self.textarea.insert_str(text.replace("\r\n", "\n"));
        InputAction::Continue
    }

    fn handle_esc(&mut self) -> InputAction {
        if self.has_suggestions() {
            self.hide_suggestions();
            InputAction::Continue
        } else if self.is_empty() {
            InputAction::Cancel
        } else {
            self.clear();
            InputAction::Clear
        }
    }

    fn handle_down(&mut self) -> InputAction {
        if self.has_suggestions() {
            self.selected_suggestion = (self.selected_suggestion + 1) % self.suggestions.len();
            InputAction::Continue
        } else if self.is_empty() {
            InputAction::HistoryNext
        } else {
            self.textarea.input(KeyEvent::from(KeyCode::Down));
            InputAction::Continue
        }
    }

    fn handle_up(&mut self) -> InputAction {
        if self.has_suggestions() {
            self.select_previous_suggestion();
            InputAction::Continue
        } else if self.is_empty() {
            InputAction::HistoryPrev
        } else {
            self.textarea.input(KeyEvent::from(KeyCode::Up));
            InputAction::Continue
        }
    }

    fn handle_enter(&mut self) -> InputAction {
        if let Some(suggestion) = self.selected() {
            let command = suggestion.command;
            self.clear();
            return InputAction::Submit(command.to_string());
        }

        if self.text().trim().is_empty() {
            return InputAction::Continue;
        }

        InputAction::Submit(self.take())
    }

    fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }

    fn selected(&self) -> Option<&Suggestion> {
        self.suggestions.get(self.selected_suggestion)
    }

    /// Suggestions stay open only while the first word is a partial command.
    fn refresh_suggestions(&mut self) {
        let text = self.text();
        if !text.starts_with('/') || text.contains(char::is_whitespace) {
            self.hide_suggestions();
            return;
        }

        self.suggestions = SLASH_COMMANDS
            .iter()
            .filter(|(command, _)| command.starts_with(text.as_str()))
            .map(|&(command, description)| Suggestion {
                command,
                description,
            })
            .collect();
        self.selected_suggestion = 0;
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.selected_suggestion = 0;
    }

    fn select_previous_suggestion(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.selected_suggestion = self
            .selected_suggestion
            .checked_sub(1)
            .unwrap_or(self.suggestions.len() - 1);
    }

    fn apply_selected_suggestion(&mut self) {
        if let Some(command) = self.selected().map(|s| s.command) {
            self.set_text(&format!("{command} "));
            self.hide_suggestions();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(widget: &mut InputWidget<'_>, text: &str) {
        for c in text.chars() {
            widget.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_enter_submits_text() {
        let mut widget = InputWidget::new();
        type_text(&mut widget, "hello");

        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Enter)),
            InputAction::Submit("hello".to_string())
        );
        assert!(widget.is_empty());
    }

    #[test]
    fn test_blank_input_is_not_submitted() {
        let mut widget = InputWidget::new();
        type_text(&mut widget, "   ");
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Enter)),
            InputAction::Continue
        );
    }

    #[test]
    fn test_slash_shows_matching_commands() {
        let mut widget = InputWidget::new();
        type_text(&mut widget, "/li");

        let commands: Vec<_> = widget.suggestions().iter().map(|s| s.command).collect();
        assert_eq!(commands, vec!["/listen"]);

        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Enter)),
            InputAction::Submit("/listen".to_string())
        );
    }

    #[test]
    fn test_tab_completes_and_allows_arguments() {
        let mut widget = InputWidget::new();
        type_text(&mut widget, "/mo");
        widget.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(widget.text(), "/model ");
        assert!(widget.suggestions().is_empty());

        type_text(&mut widget, "gpt-4o");
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Enter)),
            InputAction::Submit("/model gpt-4o".to_string())
        );
    }

    #[test]
    fn test_esc_on_empty_input_cancels() {
        let mut widget = InputWidget::new();
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Esc)),
            InputAction::Cancel
        );

        type_text(&mut widget, "draft");
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Esc)),
            InputAction::Clear
        );
        assert!(widget.is_empty());
    }

    #[test]
    fn test_arrows_on_empty_input_walk_history() {
        let mut widget = InputWidget::new();
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Up)),
            InputAction::HistoryPrev
        );
        assert_eq!(
            widget.handle_key(KeyEvent::from(KeyCode::Down)),
            InputAction::HistoryNext
        );
    }

    #[test]
    fn test_paste_inserts_text() {
        let mut widget = InputWidget::new();
        widget.handle_paste("line one\r\nline two".to_string());
        assert_eq!(widget.text(), "line one\nline two");
    }
}
