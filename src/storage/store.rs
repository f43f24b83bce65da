use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Storage, StorageError, StorageResult};
use crate::core::error::Result;
use crate::core::memory::{
    ConversationMemory, DEFAULT_MEMORY_LENGTH, DEFAULT_PERSONA, clamp_limit,
};
use crate::core::types::Role;

pub const DEFAULT_NAMESPACE: &str = "vexa:";
const CONVERSATION_KEY: &str = "conversation";

#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    pub namespace: String,
    pub persona: String,
    pub max_length: usize,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            max_length: DEFAULT_MEMORY_LENGTH,
        }
    }
}

/// Loads and persists the conversation memory. Storage failures degrade to
/// the default `[persona]` memory instead of surfacing to the caller.
pub struct MemoryStore {
    storage: Arc<dyn Storage>,
    config: MemoryStoreConfig,
    closed: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>, config: MemoryStoreConfig) -> Arc<Self> {
        let config = MemoryStoreConfig {
            max_length: clamp_limit(config.max_length),
            ..config
        };

        tracing::debug!(
            namespace = %config.namespace,
            max_length = config.max_length,
            "Opened memory store"
        );

        Arc::new(Self {
            storage,
            config,
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{CONVERSATION_KEY}", self.config.namespace)
    }

    #[must_use]
    pub fn persona(&self) -> &str {
        &self.config.persona
    }

    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.config.max_length
    }

    #[must_use]
    pub fn default_memory(&self) -> ConversationMemory {
        ConversationMemory::new(self.config.persona.clone())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn load(&self) -> ConversationMemory {
        match self.try_load() {
            Ok(Some(memory)) => {
                tracing::debug!(entries = memory.len(), "Loaded conversation memory");
                memory.truncated(self.config.max_length)
            }
            Ok(None) => self.default_memory(),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key(), "Discarding stored conversation");
                self.default_memory()
            }
        }
    }

    pub fn append(
        &self,
        memory: &ConversationMemory,
        role: Role,
        content: impl Into<String>,
    ) -> Result<ConversationMemory> {
        memory.append(role, content, self.config.max_length)
    }

    pub fn save(&self, memory: &ConversationMemory) {
        if let Err(e) = self.try_save(memory) {
            match e {
                StorageError::Closed => {
                    tracing::debug!("Memory store closed, skipping save");
                }
                other => {
                    tracing::warn!(error = %other, key = %self.key(), "Failed to persist conversation");
                }
            }
        }
    }

    pub fn clear(&self) -> ConversationMemory {
        let memory = self.default_memory();
        self.save(&memory);
        tracing::info!("Conversation memory cleared");
        memory
    }

    pub fn dispose(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Memory store disposed");
        }
    }

    fn try_load(&self) -> Result<Option<ConversationMemory>> {
        let Some(raw) = self.storage.get(&self.key())? else {
            return Ok(None);
        };
        let memory: ConversationMemory = serde_json::from_str(&raw)?;
        Ok(Some(memory))
    }

    fn try_save(&self, memory: &ConversationMemory) -> StorageResult<()> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        let json = serde_json::to_string(memory)?;
        self.storage.set(&self.key(), &json)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, InMemoryStorage};
    use tempfile::TempDir;

    fn store_with(storage: &InMemoryStorage, max_length: usize) -> Arc<MemoryStore> {
        MemoryStore::open(
            Arc::new(storage.clone()),
            MemoryStoreConfig {
                namespace: "vexa:".to_string(),
                persona: "persona".to_string(),
                max_length,
            },
        )
    }

    #[test]
    fn test_absent_store_yields_default() {
        let storage = InMemoryStorage::new();
        let store = store_with(&storage, 10);

        let memory = store.load();
        assert!(memory.is_fresh());
        assert_eq!(memory.persona(), "persona");
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let storage = InMemoryStorage::new();
        let store = store_with(&storage, 10);

        let memory = store.default_memory();
        let memory = store.append(&memory, Role::User, "hi").unwrap();
        let memory = store.append(&memory, Role::Assistant, "hello").unwrap();
        store.save(&memory);

        assert_eq!(store.load(), memory);
        assert!(storage.get("vexa:conversation").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_json_yields_default() {
        let storage = InMemoryStorage::new();
        storage.set("vexa:conversation", "{not json").unwrap();
        let store = store_with(&storage, 10);

        assert!(store.load().is_fresh());
    }

    #[test]
    fn test_unknown_role_yields_default() {
        let storage = InMemoryStorage::new();
        storage
            .set(
                "vexa:conversation",
                r#"[{"role":"system","content":"p"},{"role":"tool","content":"x"}]"#,
            )
            .unwrap();
        let store = store_with(&storage, 10);

        let memory = store.load();
        assert!(memory.is_fresh());
        assert_eq!(memory.persona(), "persona");
    }

    #[test]
    fn test_oversized_stored_memory_is_truncated() {
        let storage = InMemoryStorage::new();
        storage
            .set(
                "vexa:conversation",
                r#"[{"role":"system","content":"p"},{"role":"user","content":"a"},{"role":"assistant","content":"b"},{"role":"user","content":"c"}]"#,
            )
            .unwrap();
        let store = store_with(&storage, 3);

        let memory = store.load();
        let contents: Vec<_> = memory.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["p", "b", "c"]);
    }

    #[test]
    fn test_clear_then_load_is_default() {
        let storage = InMemoryStorage::new();
        let store = store_with(&storage, 10);

        let memory = store.append(&store.default_memory(), Role::User, "hi").unwrap();
        store.save(&memory);

        let cleared = store.clear();
        assert!(cleared.is_fresh());
        assert_eq!(store.load(), cleared);
    }

    #[test]
    fn test_disposed_store_ignores_writes() {
        let storage = InMemoryStorage::new();
        let store = store_with(&storage, 10);

        store.dispose();
        assert!(store.is_closed());

        let memory = store.append(&store.default_memory(), Role::User, "hi").unwrap();
        store.save(&memory);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_limit_is_clamped_on_open() {
        let storage = InMemoryStorage::new();
        let store = store_with(&storage, 0);
        assert_eq!(store.max_length(), 2);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let memory = {
            let store = MemoryStore::open(
                Arc::new(FileStorage::new(temp_dir.path())),
                MemoryStoreConfig::default(),
            );
            let memory = store.append(&store.default_memory(), Role::User, "remember me").unwrap();
            store.save(&memory);
            store.dispose();
            memory
        };

        let reopened = MemoryStore::open(
            Arc::new(FileStorage::new(temp_dir.path())),
            MemoryStoreConfig::default(),
        );
        assert_eq!(reopened.load(), memory);
    }
}
