use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{Coordinator, GenerationConfig, Result, SafetyFilter};
use crate::providers::create_chat_model;
use crate::storage::{FileStorage, InMemoryStorage, MemoryStore, MemoryStoreConfig, Storage};

use super::Cli;

/// Everything one run of the app works with.
pub struct Session {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub coordinator: Coordinator,
}

/// Command-line flags win over the config file and environment.
pub fn apply_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(model) = &cli.model {
        config.model.clone_from(model);
    }
    if let Some(persona) = &cli.system {
        config.memory.persona.clone_from(persona);
    }
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }
    if let Some(dir) = &cli.data_dir {
        config.memory.data_dir = Some(dir.clone());
    }
}

/// Directory the conversation file lives in, if there is one.
#[must_use]
pub fn memory_dir(config: &AppConfig) -> Option<PathBuf> {
    config.data_dir().map(|dir| dir.join("memory"))
}

/// Opens the conversation store, file-backed unless `ephemeral` is set or no
/// data directory can be determined.
#[must_use]
pub fn open_store(config: &AppConfig, ephemeral: bool) -> Arc<MemoryStore> {
    let storage: Arc<dyn Storage> = match memory_dir(config) {
        Some(dir) if !ephemeral => Arc::new(FileStorage::new(dir)),
        Some(_) => Arc::new(InMemoryStorage::new()),
        None => {
            tracing::warn!("No data directory available, conversation will not be saved");
            Arc::new(InMemoryStorage::new())
        }
    };

    MemoryStore::open(
        storage,
        MemoryStoreConfig {
            namespace: config.memory.namespace.clone(),
            persona: config.memory.persona.clone(),
            max_length: config.memory.max_length,
        },
    )
}

pub fn build_safety(config: &AppConfig) -> Result<SafetyFilter> {
    SafetyFilter::new(&config.safety.denylist, config.safety.refusal_message.as_str())
}

pub fn build_coordinator(config: &AppConfig, store: Arc<MemoryStore>) -> Result<Coordinator> {
    let model = create_chat_model(config)?;

    Ok(Coordinator::new(model, store)
        .with_safety(build_safety(config)?)
        .with_config(GenerationConfig {
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
        }))
}

/// Directory-backed path of the stored conversation.
#[must_use]
pub fn memory_file(config: &AppConfig, store: &MemoryStore) -> Option<PathBuf> {
    memory_dir(config).map(|dir| FileStorage::new(dir).path_for(&store.key()))
}

/// Resolves storage and model for a chat session from an already
/// overridden config. Fails before any network call when the configuration
/// is unusable.
pub fn build_session(config: AppConfig, ephemeral: bool) -> Result<Session> {
    let store = open_store(&config, ephemeral);
    let coordinator = build_coordinator(&config, Arc::clone(&store))?;

    tracing::info!(
        transport = %config.transport,
        model = %config.model,
        ephemeral,
        "Session ready"
    );

    Ok(Session {
        config,
        store,
        coordinator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Transport;
    use crate::core::Role;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("vexa").chain(args.iter().copied()))
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        apply_overrides(
            &cli(&["-m", "llama3.2", "-s", "Be brief.", "-t", "ws", "--data-dir", "/tmp/v"]),
            &mut config,
        );

        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.memory.persona, "Be brief.");
        assert_eq!(config.transport, Transport::Websocket);
        assert_eq!(config.memory.data_dir, Some(PathBuf::from("/tmp/v")));
    }

    #[test]
    fn test_file_store_persists_between_sessions() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.memory.data_dir = Some(dir.path().to_path_buf());

        let store = open_store(&config, false);
        let memory = store.append(&store.load(), Role::User, "hi").unwrap();
        store.save(&memory);

        let reopened = open_store(&config, false);
        assert_eq!(reopened.load(), memory);
        assert!(dir.path().join("memory").exists());
        assert!(memory_file(&config, &reopened).unwrap().exists());
    }

    #[test]
    fn test_ephemeral_store_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.memory.data_dir = Some(dir.path().to_path_buf());

        let store = open_store(&config, true);
        let memory = store.append(&store.load(), Role::User, "hi").unwrap();
        store.save(&memory);

        assert!(!dir.path().join("memory").exists());
    }

    #[test]
    fn test_build_session_with_mock_transport() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.memory.data_dir = Some(dir.path().to_path_buf());
        apply_overrides(&cli(&["--transport", "mock"]), &mut config);

        let session = build_session(config, true).unwrap();
        assert_eq!(session.coordinator.model().name(), "mock");
        assert!(!session.coordinator.safety().is_empty());
    }
}
