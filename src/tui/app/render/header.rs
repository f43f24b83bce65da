use crate::ui::meter::LevelMeter;
use crate::ui::theme::{BoxChars, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub struct HeaderInfo<'a> {
    pub transport: &'a str,
    pub model: &'a str,
    /// Label and meter to show while a voice bridge is active.
    pub voice: Option<(&'a str, &'a LevelMeter)>,
}

pub fn render_header(frame: &mut Frame, area: Rect, info: &HeaderInfo<'_>) {
    let title = format!("Vexa v{}", env!("CARGO_PKG_VERSION"));
    let subtitle = format!("{} · {}", info.transport, info.model);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border())
        .border_set(ratatui::symbols::border::Set {
            bottom_left: BoxChars::ROUND_BOTTOM_LEFT,
            bottom_right: BoxChars::ROUND_BOTTOM_RIGHT,
            ..ratatui::symbols::border::ROUNDED
        });

    let lines = vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled(title, Theme::primary_bold()),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(subtitle, Theme::muted()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if let Some((label, meter)) = info.voice {
        let meter_line = meter.render(label);
        let width = meter_line.width() as u16 + 2;
        if area.width > width && area.height > 0 {
            let x = area.x + area.width - width;
            frame.buffer_mut().set_line(x, area.y, &meter_line, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn test_shows_transport_and_model() {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|f| {
                let info = HeaderInfo {
                    transport: "websocket",
                    model: "gpt-4o-mini",
                    voice: None,
                };
                render_header(f, f.area(), &info);
            })
            .unwrap();

        assert!(row(&terminal, 0).contains("Vexa v"));
        assert!(row(&terminal, 1).contains("websocket · gpt-4o-mini"));
    }

    #[test]
    fn test_shows_meter_when_voice_active() {
        let mut meter = LevelMeter::new();
        meter.push(1.0);
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|f| {
                let info = HeaderInfo {
                    transport: "http",
                    model: "m",
                    voice: Some(("speaking", &meter)),
                };
                render_header(f, f.area(), &info);
            })
            .unwrap();

        let top = row(&terminal, 0);
        assert!(top.contains("speaking"));
        assert!(top.contains('█'));
    }
}
