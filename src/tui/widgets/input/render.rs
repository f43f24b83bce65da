use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use super::{InputWidget, Suggestion};
use crate::ui::theme::{BoxChars, Theme};

const HINT_TEXT: &str = "↵ send";
const MAX_VISIBLE_SUGGESTIONS: usize = 6;

impl InputWidget<'_> {
    pub fn render(&mut self, area: Rect, frame: &mut Frame) {
        render_separator(area, frame.buffer_mut());

        let input_area = input_area(area);
        self.render_prefix(input_area, frame.buffer_mut());
        self.render_hint_if_needed(input_area, frame.buffer_mut());

        let textarea_area = textarea_area(input_area);
        self.render_textarea(textarea_area, frame);

        if !self.suggestions.is_empty() {
            self.render_suggestions(area, frame.buffer_mut());
        }
    }

    fn render_prefix(&self, input_area: Rect, buf: &mut Buffer) {
        let prefix_area = Rect {
            width: 2.min(input_area.width),
            height: 1.min(input_area.height),
            ..input_area
        };

        let prefix = if self.listening {
            Span::styled("◉ ", Theme::voice())
        } else {
            Span::styled(BoxChars::USER_MARK, Theme::white())
        };
        Paragraph::new(Line::from(prefix)).render(prefix_area, buf);
    }

    fn render_hint_if_needed(&self, input_area: Rect, buf: &mut Buffer) {
        let hint_width = HINT_TEXT.chars().count() as u16;
        if self.is_empty() || input_area.width <= hint_width + 1 || input_area.height == 0 {
            return;
        }

        let hint_area = Rect {
            x: input_area.x + input_area.width - hint_width - 1,
            y: input_area.y,
            width: hint_width,
            height: 1,
        };

        Paragraph::new(Line::from(Span::styled(HINT_TEXT, Theme::muted()))).render(hint_area, buf);
    }

    fn render_textarea(&mut self, area: Rect, frame: &mut Frame) {
        self.textarea
            .set_block(Block::default().borders(Borders::NONE));

        frame.render_widget(&self.textarea, area);

        let (cursor_row, cursor_col) = self.textarea.cursor();
        frame.set_cursor_position(Position::new(
            area.x + cursor_col as u16,
            area.y + cursor_row as u16,
        ));
    }

    fn render_suggestions(&self, area: Rect, buf: &mut Buffer) {
        let height = self.suggestions.len().min(MAX_VISIBLE_SUGGESTIONS) as u16 + 2;

        if area.y < height {
            return;
        }

        let suggestions_area = Rect {
            x: area.x + 2,
            y: area.y - height,
            width: 44.min(area.width.saturating_sub(4)),
            height,
        };

        let lines: Vec<Line> = self
            .suggestions
            .iter()
            .take(MAX_VISIBLE_SUGGESTIONS)
            .enumerate()
            .map(|(i, suggestion)| self.render_suggestion_line(i, suggestion))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::primary())
            .border_set(ratatui::symbols::border::ROUNDED)
            .title(" Commands ");

        Clear.render(suggestions_area, buf);
        Paragraph::new(lines)
            .block(block)
            .render(suggestions_area, buf);
    }

    fn render_suggestion_line(&self, index: usize, suggestion: &Suggestion) -> Line<'static> {
        let style = if index == self.selected_suggestion {
            Theme::primary_bold()
        } else {
            Theme::off_white()
        };

        Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{:<8}", suggestion.command), style),
            Span::styled(suggestion.description, Theme::muted()),
        ])
    }
}

fn render_separator(area: Rect, buf: &mut Buffer) {
    let separator_area = Rect {
        height: 1.min(area.height),
        ..area
    };

    let line = Line::from(Span::styled(
        BoxChars::HORIZONTAL.repeat(area.width as usize),
        Theme::border(),
    ));
    Paragraph::new(line).render(separator_area, buf);
}

const fn input_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    }
}

const fn textarea_area(input_area: Rect) -> Rect {
    const HINT_WIDTH: u16 = 8;

    Rect {
        x: input_area.x + 2,
        y: input_area.y,
        width: input_area.width.saturating_sub(2 + HINT_WIDTH),
        height: input_area.height,
    }
}
