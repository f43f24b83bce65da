pub mod event_handler;
pub mod persistence;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};

use crate::core::memory::{DEFAULT_MEMORY_LENGTH, DEFAULT_PERSONA};
use crate::core::safety::{DEFAULT_DENYLIST, DEFAULT_REFUSAL};
use crate::providers::openai::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::providers::websocket::{DEFAULT_RECONNECT_ATTEMPTS, DEFAULT_URL};
use crate::storage::store::DEFAULT_NAMESPACE;

pub use event_handler::{ConfigEvent, ConfigEventHandler, ConfigEventSender};
pub use persistence::{ConfigError, ConfigPatch, ConfigPersister, ConfigResult};

const APP_DIR: &str = "vexa";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support").join(APP_DIR))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join(APP_DIR))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join(APP_DIR))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config").join(APP_DIR))
    }
}

/// Where the conversation and the log file live unless `memory.data_dir` says
/// otherwise.
pub fn get_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|d| d.join(APP_DIR))
    }

    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Http,
    Websocket,
    /// Canned offline replies, no network.
    Mock,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Websocket => "websocket",
            Self::Mock => "mock",
        })
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "websocket" | "ws" => Ok(Self::Websocket),
            "mock" | "offline" => Ok(Self::Mock),
            other => Err(format!(
                "unknown transport '{other}' (expected http, websocket or mock)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesizerKind {
    #[default]
    System,
    Hosted,
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub max_length: usize,
    pub persona: String,
    pub namespace: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MEMORY_LENGTH,
            persona: DEFAULT_PERSONA.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketSettings {
    pub url: String,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            reconnect_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetySettings {
    pub denylist: Vec<String>,
    pub refusal_message: String,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(ToString::to_string).collect(),
            refusal_message: DEFAULT_REFUSAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// External speech-to-text command; each stdout line is one transcript.
    pub recognizer_command: Option<String>,
    pub synthesizer: SynthesizerKind,
    pub system_command: Option<String>,
    pub tts_model: String,
    pub voice: String,
    pub speed: f32,
    pub player_command: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            recognizer_command: None,
            synthesizer: SynthesizerKind::System,
            system_command: None,
            tts_model: "tts-1".to_string(),
            voice: "nova".to_string(),
            speed: 1.0,
            player_command: "aplay -q -f S16_LE -r 24000 -c 1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub transport: Transport,
    pub generation: GenerationSettings,
    pub memory: MemorySettings,
    pub websocket: WebSocketSettings,
    pub safety: SafetySettings,
    pub voice: VoiceSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            transport: Transport::default(),
            generation: GenerationSettings::default(),
            memory: MemorySettings::default(),
            websocket: WebSocketSettings::default(),
            safety: SafetySettings::default(),
            voice: VoiceSettings::default(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Self::get_config_path().as_deref())
    }

    /// Layers the optional TOML file under `VEXA_*` environment variables.
    /// Falls back to defaults when either source is malformed.
    #[must_use]
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("VEXA")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("safety.denylist")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(Config::try_deserialize)
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config: {e}");
                Self::default()
            })
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Configured data directory, or the platform default.
    #[must_use]
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.memory.data_dir.clone().or_else(get_data_dir)
    }

    pub fn init_default() -> Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

        Self::write_template(&path)?;
        Ok(path)
    }

    pub fn write_template(path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(path, include_str!("config.template.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.memory.max_length, 100);
        assert_eq!(config.memory.namespace, "vexa:");
        assert_eq!(config.websocket.reconnect_attempts, 5);
        assert_eq!(config.websocket.reconnect_delay_ms, 2000);
        assert!(config.safety.denylist.iter().any(|t| t == "bomb"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "model = \"llama3.2\"\nbase_url = \"http://localhost:11434\"\n\n[memory]\nmax_length = 20\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(&path));
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.memory.max_length, 20);
        assert_eq!(config.memory.persona, DEFAULT_PERSONA);
        assert!((config.generation.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_template_parses() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("vexa").join("config.toml");

        AppConfig::write_template(&path).unwrap();
        let config = AppConfig::load_from(Some(&path));
        assert_eq!(config.transport, Transport::Http);

        let again = AppConfig::write_template(&path);
        assert!(matches!(again, Err(e) if e.kind() == io::ErrorKind::AlreadyExists));
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("HTTP".parse::<Transport>(), Ok(Transport::Http));
        assert_eq!("ws".parse::<Transport>(), Ok(Transport::Websocket));
        assert_eq!("mock".parse::<Transport>(), Ok(Transport::Mock));
        assert!("carrier-pigeon".parse::<Transport>().is_err());
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.memory.data_dir = Some(PathBuf::from("/tmp/vexa-data"));
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/vexa-data")));
    }
}
