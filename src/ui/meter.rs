use std::collections::VecDeque;

use ratatui::text::{Line, Span};

use super::theme::{MeterBars, Theme};

/// Rolling window of voice amplitudes drawn as a bar sparkline.
#[derive(Debug, Clone, Default)]
pub struct LevelMeter {
    samples: VecDeque<f32>,
}

impl LevelMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: f32) {
        if self.samples.len() == MeterBars::WIDTH {
            self.samples.pop_front();
        }
        self.samples.push_back(level.clamp(0.0, 1.0));
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    #[must_use]
    pub fn latest(&self) -> f32 {
        self.samples.back().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn bars(&self) -> String {
        let padding = MeterBars::WIDTH - self.samples.len();
        std::iter::repeat_n(MeterBars::LEVELS[0], padding)
            .chain(self.samples.iter().map(|&level| bar_for(level)))
            .collect()
    }

    #[must_use]
    pub fn render(&self, label: &str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{label} "), Theme::voice()),
            Span::styled(self.bars(), Theme::voice()),
        ])
    }
}

/// Speech RMS rarely gets near full scale, so levels are boosted before
/// picking a glyph.
fn bar_for(level: f32) -> &'static str {
    let top = MeterBars::LEVELS.len() - 1;
    let scaled = (level * 3.0).clamp(0.0, 1.0);
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let index = (scaled * top as f32).round() as usize;
    MeterBars::LEVELS[index.min(top)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_meter_is_blank() {
        let meter = LevelMeter::new();
        assert_eq!(meter.bars(), " ".repeat(MeterBars::WIDTH));
        assert_eq!(meter.latest(), 0.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut meter = LevelMeter::new();
        for _ in 0..(MeterBars::WIDTH * 2) {
            meter.push(1.0);
        }
        assert_eq!(meter.bars().chars().count(), MeterBars::WIDTH);
        assert!(meter.bars().chars().all(|c| c == '█'));
    }

    #[test]
    fn test_newest_sample_is_rightmost() {
        let mut meter = LevelMeter::new();
        meter.push(0.0);
        meter.push(0.5);

        let bars: Vec<char> = meter.bars().chars().collect();
        assert_eq!(bars[bars.len() - 1], '█');
        assert_eq!(bars[bars.len() - 2], ' ');
        assert_eq!(meter.latest(), 0.5);
    }

    #[test]
    fn test_reset() {
        let mut meter = LevelMeter::new();
        meter.push(0.3);
        meter.reset();
        assert_eq!(meter.latest(), 0.0);
    }
}
