pub mod levels;
pub mod recognizer;
pub mod synthesizer;

pub use recognizer::{CommandRecognizer, SpeechRecognizer, TranscriptCallback};
pub use synthesizer::{HostedSynthesizer, LevelCallback, SpeechSynthesizer, SystemSynthesizer};

use std::sync::Arc;

use crate::config::{AppConfig, SynthesizerKind};
use crate::core::error::Result;
use crate::providers::factory::resolve_api_key;

/// The configured recognizer, if a recognizer command is set.
#[must_use]
pub fn create_recognizer(config: &AppConfig) -> Option<Arc<dyn SpeechRecognizer>> {
    config
        .voice
        .recognizer_command
        .as_deref()
        .map(str::trim)
        .filter(|command| !command.is_empty())
        .map(|command| Arc::new(CommandRecognizer::new(command)) as Arc<dyn SpeechRecognizer>)
}

/// The configured synthesizer, or `None` when speech output is off.
pub fn create_synthesizer(config: &AppConfig) -> Result<Option<Arc<dyn SpeechSynthesizer>>> {
    let voice = &config.voice;

    let synthesizer: Arc<dyn SpeechSynthesizer> = match voice.synthesizer {
        SynthesizerKind::Off => return Ok(None),
        SynthesizerKind::System => Arc::new(
            voice
                .system_command
                .as_deref()
                .map_or_else(SystemSynthesizer::default, SystemSynthesizer::new),
        ),
        SynthesizerKind::Hosted => Arc::new(
            HostedSynthesizer::new(resolve_api_key(config)?, config.base_url.as_str())?
                .with_model(voice.tts_model.as_str())
                .with_voice(voice.voice.as_str())
                .with_speed(voice.speed)
                .with_player(voice.player_command.as_str())
                .with_api_key_env(config.api_key_env.as_str()),
        ),
    };

    Ok(Some(synthesizer))
}
