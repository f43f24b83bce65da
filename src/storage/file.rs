use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Storage, StorageResult};

/// One file per key under a data directory. Writes go through a temp file and
/// a rename so a crash never leaves a half-written value behind.
pub struct FileStorage {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_key(key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _lock = self.write_lock.lock();

        fs::create_dir_all(&self.root)?;

        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _lock = self.write_lock.lock();

        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(temp_dir.path());

        assert!(storage.get("vexa:conversation").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        storage.set("vexa:conversation", "[1,2,3]").unwrap();
        assert_eq!(
            storage.get("vexa:conversation").unwrap().as_deref(),
            Some("[1,2,3]")
        );

        storage.set("vexa:conversation", "[4]").unwrap();
        assert_eq!(
            storage.get("vexa:conversation").unwrap().as_deref(),
            Some("[4]")
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(temp_dir.path());

        storage.set("key", "value").unwrap();
        storage.remove("key").unwrap();
        storage.remove("key").unwrap();
        assert!(storage.get("key").unwrap().is_none());
    }

    #[test]
    fn test_key_sanitized_to_file_name() {
        let storage = FileStorage::new("/data");
        let path = storage.path_for("vexa:conversation/../x");
        assert_eq!(path, PathBuf::from("/data/vexa_conversation____x.json"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(temp_dir.path());

        storage.set("key", "value").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
