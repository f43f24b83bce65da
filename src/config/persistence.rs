use crate::config::get_config_dir;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, Value};

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml_edit::TomlError),

    #[error("Config directory not found")]
    NoConfigDir,
}

/// Top-level settings changed at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub model: Option<String>,
    pub transport: Option<String>,
}

impl ConfigPatch {
    #[must_use]
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.transport.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [("model", &self.model), ("transport", &self.transport)]
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    /// Merges the patch into the document root, keeping each replaced
    /// value's trailing comment.
    fn merge_into(&self, doc: &mut DocumentMut) {
        for (key, value) in self.entries() {
            match doc.get_mut(key).and_then(Item::as_value_mut) {
                Some(existing) => {
                    let decor = existing.decor().clone();
                    *existing = Value::from(value);
                    *existing.decor_mut() = decor;
                }
                None => doc[key] = toml_edit::value(value),
            }
        }
    }
}

/// Writes runtime changes back into `config.toml`.
///
/// The file is edited as a `toml_edit` document, so comments and the layout
/// written by `vexa config init` survive. A file that no longer parses is
/// left alone.
pub struct ConfigPersister {
    config_path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigPersister {
    #[must_use]
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_path() -> ConfigResult<Self> {
        get_config_dir()
            .map(|dir| Self::new(dir.join("config.toml")))
            .ok_or(ConfigError::NoConfigDir)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn apply_patch(&self, patch: &ConfigPatch) -> ConfigResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock();

        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => {
                let mut doc = content.parse::<DocumentMut>()?;
                patch.merge_into(&mut doc);
                doc.to_string()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let mut doc = DocumentMut::new();
                patch.merge_into(&mut doc);
                format!("{NEW_FILE_HEADER}{doc}")
            }
            Err(e) => return Err(e.into()),
        };

        self.atomic_write(&content)
    }

    fn atomic_write(&self, content: &str) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.config_path)?;
        Ok(())
    }
}

const NEW_FILE_HEADER: &str = "# Vexa configuration\n\
# Runtime changes (such as /model) are written back to this file.\n\n";
