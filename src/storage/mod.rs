pub mod file;
pub mod in_memory;
pub mod store;

pub use file::FileStorage;
pub use in_memory::InMemoryStorage;
pub use store::{MemoryStore, MemoryStoreConfig};

use std::io;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage is closed")]
    Closed,
}

/// String key-value store backing persisted client state.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}
