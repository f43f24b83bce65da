use chrono::{DateTime, Local};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::{ChatMessage, MessageLevel};
use crate::ui::theme::{BoxChars, Spinners, Theme};

const MAX_MESSAGE_LINES: usize = 200;

impl ChatMessage {
    pub fn render_to_lines(&self, width: u16, spinner_frame: usize) -> Vec<Line<'static>> {
        match self {
            Self::User { text, at } => {
                render_bubble(text, width, BoxChars::USER_MARK, Theme::white(), Some(at))
            }
            Self::Assistant { text, at } => {
                let mut lines =
                    render_bubble(text, width, BoxChars::ASSISTANT_MARK, Theme::off_white(), Some(at));
                truncate_with_indicator(&mut lines);
                lines
            }
            Self::StreamingAssistant(text) => {
                let mut lines =
                    render_bubble(text, width, BoxChars::ASSISTANT_MARK, Theme::off_white(), None);
                append_cursor(&mut lines);
                lines
            }
            Self::Typing => render_typing(spinner_frame),
            Self::System { text, level } => render_system(text, *level, width),
        }
    }
}

fn format_time(at: &DateTime<Local>) -> String {
    at.format("%H:%M").to_string()
}

fn render_bubble(
    text: &str,
    width: u16,
    mark: &'static str,
    style: Style,
    at: Option<&DateTime<Local>>,
) -> Vec<Line<'static>> {
    let indent = mark.chars().count();
    let available_width = (width as usize).saturating_sub(indent + 8).max(1);
    let wrapped = textwrap::wrap(text, available_width);

    let mut lines: Vec<Line<'static>> = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 {
                Span::styled(mark, Theme::primary())
            } else {
                Span::raw(" ".repeat(indent))
            };
            Line::from(vec![prefix, Span::styled(line.into_owned(), style)])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(mark, Theme::primary())));
    }

    if let (Some(at), Some(first)) = (at, lines.first_mut()) {
        first
            .spans
            .push(Span::styled(format!("  {}", format_time(at)), Theme::timestamp()));
    }

    lines
}

fn render_typing(spinner_frame: usize) -> Vec<Line<'static>> {
    let dots = Spinners::DOTS[spinner_frame % Spinners::DOTS.len()];
    vec![Line::from(vec![
        Span::styled(BoxChars::ASSISTANT_MARK, Theme::primary()),
        Span::styled(format!("Vexa is typing{dots}"), Theme::muted()),
    ])]
}

fn render_system(text: &str, level: MessageLevel, width: u16) -> Vec<Line<'static>> {
    let icon = level.icon();
    let style = level.style();
    let available_width = (width as usize).saturating_sub(icon.len() + 1).max(1);

    textwrap::wrap(text, available_width)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 {
                format!("{icon} ")
            } else {
                " ".repeat(icon.len() + 1)
            };
            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(line.into_owned(), style),
            ])
        })
        .collect()
}

fn append_cursor(lines: &mut [Line<'static>]) {
    if let Some(last_line) = lines.last_mut() {
        last_line.spans.push(Span::styled(BoxChars::CURSOR, Theme::primary()));
    }
}

fn truncate_with_indicator(lines: &mut Vec<Line<'static>>) {
    if lines.len() > MAX_MESSAGE_LINES {
        lines.truncate(MAX_MESSAGE_LINES);
        lines.push(Line::from(Span::styled(
            "  ... (message truncated)",
            Theme::muted(),
        )));
    }
}
