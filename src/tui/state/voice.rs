use crate::ui::meter::LevelMeter;

/// What the voice bridges are doing right now.
#[derive(Debug, Default)]
pub struct VoiceState {
    pub listening: bool,
    pub speaking: bool,
    /// Speak each completed reply aloud.
    pub auto_speak: bool,
    pub meter: LevelMeter,
}

impl VoiceState {
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        if !listening && !self.speaking {
            self.meter.reset();
        }
    }

    pub fn start_speaking(&mut self) {
        self.speaking = true;
        self.meter.reset();
    }

    pub fn push_level(&mut self, level: f32) {
        self.meter.push(level);
    }

    pub fn finish_speaking(&mut self) {
        self.speaking = false;
        self.meter.reset();
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.listening || self.speaking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaking_resets_meter_when_done() {
        let mut voice = VoiceState::default();
        voice.start_speaking();
        voice.push_level(0.4);
        assert!(voice.is_active());
        assert!(voice.meter.latest() > 0.0);

        voice.finish_speaking();
        assert!(!voice.is_active());
        assert_eq!(voice.meter.latest(), 0.0);
    }

    #[test]
    fn test_listening_toggle() {
        let mut voice = VoiceState::default();
        voice.set_listening(true);
        assert!(voice.is_active());
        voice.set_listening(false);
        assert!(!voice.is_active());
    }
}
