//! File-backed key-value store.
//!
//! Each key is stored in its own JSON file inside a base directory:
//!
//! ```text
//! <storage_dir>/
//! ├── edu-simplify_3aauth.json
//! └── edu-simplify_3ahistory_3achat_3aada_40example_2ecom.json
//! ```

use std::path::{Path, PathBuf};

use edu_core::error::Result;
use edu_core::store::KeyValueStore;

use super::atomic_file::AtomicFile;

/// Stores every key as an atomically written file under one directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> AtomicFile {
        AtomicFile::new(self.dir.join(format!("{}.json", encode_key(key))))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file_for(key).load()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key, dir = %self.dir.display(), "Writing store entry");
        self.file_for(key).save(value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.file_for(key).remove()
    }
}

/// Encodes a key into a file-name-safe stem.
///
/// ASCII alphanumerics and `-` are kept; every other byte becomes `_xx`
/// (lower-case hex), so distinct keys always map to distinct names.
pub fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02x}", byte));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("edu-simplify:auth"), "edu-simplify_3aauth");
        assert_eq!(encode_key("a_b"), "a_5fb");
        assert_ne!(encode_key("a:b"), encode_key("a_3ab"));
    }

    #[test]
    fn test_set_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("store"));

        assert!(store.get("k:1").unwrap().is_none());

        store.set("k:1", "[1,2,3]").unwrap();
        assert_eq!(store.get("k:1").unwrap().as_deref(), Some("[1,2,3]"));

        store.delete("k:1").unwrap();
        assert!(store.get("k:1").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("history:chat:ada", "\"chat\"").unwrap();
        store.set("history:solver:ada", "\"solver\"").unwrap();

        assert_eq!(store.get("history:chat:ada").unwrap().as_deref(), Some("\"chat\""));
        assert_eq!(store.get("history:solver:ada").unwrap().as_deref(), Some("\"solver\""));
    }
}
