use ratatui::style::{Color, Modifier, Style};

pub struct BrandColors;

impl BrandColors {
    pub const VIOLET: Color = Color::Rgb(139, 92, 246);
    pub const PINK: Color = Color::Rgb(236, 72, 153);
    pub const TEAL: Color = Color::Rgb(20, 184, 166);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const GRAY: Color = Color::Rgb(107, 114, 128);
    pub const DARK_GRAY: Color = Color::Rgb(55, 65, 81);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const OFF_WHITE: Color = Color::Rgb(200, 200, 210);
}

pub struct BoxChars;

impl BoxChars {
    pub const ROUND_BOTTOM_LEFT: &'static str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &'static str = "╯";
    pub const HORIZONTAL: &'static str = "─";
    pub const USER_MARK: &'static str = "❯ ";
    pub const ASSISTANT_MARK: &'static str = "● ";
    pub const CURSOR: &'static str = "▊";
}

pub struct Spinners;

impl Spinners {
    pub const BRAILLE: &'static [&'static str] =
        &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    pub const DOTS: &'static [&'static str] = &["   ", ".  ", ".. ", "..."];
}

/// Glyphs for the voice level meter, quietest first.
pub struct MeterBars;

impl MeterBars {
    pub const LEVELS: &'static [&'static str] = &[" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];
    pub const WIDTH: usize = 12;
}

pub struct Theme;

impl Theme {
    #[must_use]
    pub const fn primary() -> Style {
        Style::new().fg(BrandColors::VIOLET)
    }

    #[must_use]
    pub const fn accent() -> Style {
        Style::new().fg(BrandColors::PINK)
    }

    #[must_use]
    pub const fn voice() -> Style {
        Style::new().fg(BrandColors::TEAL)
    }

    #[must_use]
    pub const fn warning() -> Style {
        Style::new().fg(BrandColors::AMBER)
    }

    #[must_use]
    pub const fn error() -> Style {
        Style::new().fg(BrandColors::RED)
    }

    #[must_use]
    pub const fn muted() -> Style {
        Style::new().fg(BrandColors::GRAY)
    }

    #[must_use]
    pub const fn border() -> Style {
        Style::new().fg(BrandColors::DARK_GRAY)
    }

    #[must_use]
    pub const fn white() -> Style {
        Style::new().fg(BrandColors::WHITE)
    }

    #[must_use]
    pub const fn off_white() -> Style {
        Style::new().fg(BrandColors::OFF_WHITE)
    }

    #[must_use]
    pub const fn primary_bold() -> Style {
        Style::new()
            .fg(BrandColors::VIOLET)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub const fn timestamp() -> Style {
        Style::new()
            .fg(BrandColors::DARK_GRAY)
            .add_modifier(Modifier::ITALIC)
    }
}
