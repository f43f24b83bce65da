use crate::ui::theme::{Spinners, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use std::time::Duration;

const HINTS: &str = "/ commands | Esc cancel | PgUp/PgDn scroll";

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInfo {
    pub is_processing: bool,
    pub typing: bool,
    pub elapsed: Option<Duration>,
    pub spinner_frame: usize,
    pub listening: bool,
    pub speaking: bool,
    pub auto_speak: bool,
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs > 0 {
        format!(" {secs}s")
    } else {
        format!(" {}ms", elapsed.as_millis())
    }
}

/// Right-hand status text: reply progress wins over voice state.
fn right_status(info: &StatusInfo) -> Option<(String, Style)> {
    if info.is_processing {
        let frames = Spinners::BRAILLE;
        let frame_char = frames[info.spinner_frame % frames.len()];
        let label = if info.typing { "Replying" } else { "Waiting" };
        let elapsed = info.elapsed.map(format_elapsed).unwrap_or_default();
        return Some((format!("{frame_char} {label}{elapsed}"), Theme::warning()));
    }

    let mut badges = Vec::new();
    if info.listening {
        badges.push("◉ listening");
    }
    if info.speaking {
        badges.push("♪ speaking");
    } else if info.auto_speak {
        badges.push("♪ auto-speak");
    }

    (!badges.is_empty()).then(|| (badges.join("  "), Theme::voice()))
}

pub fn render_status(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let left_line = Line::from(vec![Span::raw(" "), Span::styled(HINTS, Theme::muted())]);
    let hints_width = HINTS.len() as u16;
    frame
        .buffer_mut()
        .set_line(area.x, area.y, &left_line, hints_width + 2);

    if let Some((text, style)) = right_status(info) {
        let right_line = Line::from(vec![Span::styled(text, style), Span::raw(" ")]);
        let status_len = (right_line.width() + 1) as u16;
        let status_x = area.x + area.width.saturating_sub(status_len);
        frame
            .buffer_mut()
            .set_line(status_x, area.y, &right_line, status_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_without_voice_is_blank() {
        assert!(right_status(&StatusInfo::default()).is_none());
    }

    #[test]
    fn test_processing_shows_elapsed() {
        let info = StatusInfo {
            is_processing: true,
            elapsed: Some(Duration::from_secs(3)),
            ..StatusInfo::default()
        };
        let (text, _) = right_status(&info).unwrap();
        assert!(text.contains("Waiting 3s"));
    }

    #[test]
    fn test_typing_switches_label() {
        let info = StatusInfo {
            is_processing: true,
            typing: true,
            elapsed: Some(Duration::from_millis(250)),
            ..StatusInfo::default()
        };
        let (text, _) = right_status(&info).unwrap();
        assert!(text.contains("Replying 250ms"));
    }

    #[test]
    fn test_voice_badges() {
        let info = StatusInfo {
            listening: true,
            auto_speak: true,
            ..StatusInfo::default()
        };
        let (text, _) = right_status(&info).unwrap();
        assert!(text.contains("listening"));
        assert!(text.contains("auto-speak"));
    }
}
