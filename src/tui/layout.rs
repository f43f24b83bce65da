use ratatui::layout::{Constraint, Direction, Layout, Rect};

const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const MAX_INPUT_LINES: u16 = 6;
/// Below this many rows the header is dropped to keep room for the chat.
const MIN_ROWS_FOR_HEADER: u16 = 14;

pub struct LayoutAreas {
    pub header: Rect,
    pub chat: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Separator row, the typed lines (capped) and one spare row.
#[must_use]
pub fn input_height(input_lines: usize) -> u16 {
    let lines = u16::try_from(input_lines).unwrap_or(MAX_INPUT_LINES);
    lines.clamp(1, MAX_INPUT_LINES) + 2
}

#[must_use]
pub fn calculate_layout(area: Rect, input_lines: usize) -> LayoutAreas {
    let header_height = if area.height >= MIN_ROWS_FOR_HEADER {
        HEADER_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(3),
            Constraint::Length(input_height(input_lines)),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    LayoutAreas {
        header: chunks[0],
        chat: chunks[1],
        input: chunks[2],
        status: chunks[3],
    }
}
