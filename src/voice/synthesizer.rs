use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::error::{ChatError, Result};
use crate::providers::error::ProviderError;
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

use super::levels;

/// Receives the amplitude (`0.0..=1.0`) of each audio frame as it plays.
pub type LevelCallback = dyn Fn(f32) + Send + Sync;

pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_VOICE: &str = "nova";
pub const DEFAULT_PLAYER: &str = "aplay -q -f S16_LE -r 24000 -c 1";

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Speaks `text`, resolving once playback has ended.
    async fn speak(&self, text: &str) -> Result<()> {
        self.speak_with_levels(text, &|_: f32| {}).await
    }

    /// Like [`speak`](Self::speak), reporting frame amplitudes while playing.
    /// Synthesizers without access to the audio report nothing.
    async fn speak_with_levels(&self, text: &str, on_level: &LevelCallback) -> Result<()>;
}

fn reject_empty(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatError::Voice("Cannot speak empty text".to_string()));
    }
    Ok(text)
}

/// Platform text-to-speech command. The text is passed as a single
/// positional argument, never interpolated into the shell line.
#[derive(Debug, Clone)]
pub struct SystemSynthesizer {
    command: String,
}

impl Default for SystemSynthesizer {
    fn default() -> Self {
        Self::new(Self::platform_command())
    }
}

impl SystemSynthesizer {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    #[must_use]
    pub const fn platform_command() -> &'static str {
        if cfg!(target_os = "macos") { "say" } else { "espeak" }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl SpeechSynthesizer for SystemSynthesizer {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn speak_with_levels(&self, text: &str, _on_level: &LevelCallback) -> Result<()> {
        let text = reject_empty(text)?;

        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("{} \"$1\"", self.command))
            .arg("vexa-speak")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| ChatError::Voice(format!("Failed to run '{}': {e}", self.command)))?;

        if !status.success() {
            return Err(ChatError::Voice(format!(
                "'{}' exited with {status}",
                self.command
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'static str,
}

/// OpenAI-compatible `/v1/audio/speech` client. Audio comes back as raw
/// 24 kHz mono PCM16 and is piped into a player command.
#[derive(Clone)]
pub struct HostedSynthesizer {
    http: HttpClient,
    auth: AuthStrategy,
    base_url: BaseUrl,
    model: ModelId,
    voice: String,
    speed: f32,
    player_command: String,
}

impl std::fmt::Debug for HostedSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedSynthesizer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .finish_non_exhaustive()
    }
}

impl HostedSynthesizer {
    pub fn new(api_key: ApiKey, base_url: impl Into<BaseUrl>) -> Result<Self> {
        let http = HttpClient::with_config(&HttpConfig::buffered())?;
        Ok(Self {
            http,
            auth: AuthStrategy::optional_bearer(api_key),
            base_url: base_url.into(),
            model: ModelId::new(DEFAULT_TTS_MODEL),
            voice: DEFAULT_VOICE.to_string(),
            speed: 1.0,
            player_command: DEFAULT_PLAYER.to_string(),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Playback speed, clamped to the range the speech endpoint accepts.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.clamp(0.25, 4.0);
        self
    }

    #[must_use]
    pub fn with_player(mut self, command: impl Into<String>) -> Self {
        self.player_command = command.into();
        self
    }

    #[must_use]
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.auth = self.auth.with_key_env(var);
        self
    }

    fn endpoint(&self) -> String {
        self.base_url.join("/v1/audio/speech")
    }

    async fn fetch_audio(&self, text: &str) -> Result<bytes::Bytes> {
        let request = SpeechRequest {
            model: self.model.as_str(),
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: "pcm",
        };

        let response = self
            .http
            .post_json(&self.endpoint(), &self.auth, "audio/pcm", &request)
            .await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::StreamError(e.to_string()))?;

        tracing::debug!(bytes = audio.len(), "Received synthesized audio");
        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizer for HostedSynthesizer {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn speak_with_levels(&self, text: &str, on_level: &LevelCallback) -> Result<()> {
        let text = reject_empty(text)?;
        let audio = self.fetch_audio(text).await?;
        play_pcm(&self.player_command, &audio, on_level).await
    }
}

/// Pipes PCM audio into `player` while reporting one level per frame at
/// playback cadence. The meter is reset to zero when playback ends.
pub async fn play_pcm(player: &str, audio: &[u8], on_level: &LevelCallback) -> Result<()> {
    let frame_levels = levels::frame_levels(audio);

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(player)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ChatError::Voice(format!("Failed to start player '{player}': {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| ChatError::Voice("Failed to open player input".to_string()))?;

    let playback = async {
        let written = stdin.write_all(audio).await;
        drop(stdin);
        let status = child.wait().await;
        (written, status)
    };

    let meter = async {
        let mut ticks = tokio::time::interval(levels::frame_duration());
        for level in frame_levels {
            ticks.tick().await;
            on_level(level);
        }
    };

    let ((written, status), ()) = tokio::join!(playback, meter);
    on_level(0.0);

    let status =
        status.map_err(|e| ChatError::Voice(format!("Player '{player}' failed: {e}")))?;
    if !status.success() {
        return Err(ChatError::Voice(format!("Player '{player}' exited with {status}")));
    }
    written.map_err(|e| ChatError::Voice(format!("Failed to stream audio to player: {e}")))?;

    Ok(())
}
