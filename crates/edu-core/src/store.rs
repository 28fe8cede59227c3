//! Durable key-value storage.
//!
//! [`KeyValueStore`] is the fallible backend contract implemented by the
//! infrastructure layer. [`DurableStore`] wraps a backend with the best-effort
//! semantics the chat flow relies on: reads of missing or corrupt data yield
//! `None` and writes never report failure. Problems are logged and absorbed.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// A string-keyed store of string values.
///
/// Implementations decide where values live (files, memory, ...). All methods
/// are synchronous; callers never hold them across an `.await`.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Best-effort JSON persistence on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct DurableStore {
    backend: Arc<dyn KeyValueStore>,
}

impl DurableStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Reads and parses the JSON value under `key`.
    ///
    /// Missing keys, backend failures and non-JSON content all yield `None`.
    pub fn read(&self, key: &str) -> Option<Value> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read durable store entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring corrupt durable store entry");
                None
            }
        }
    }

    /// Reads the value under `key` as `T`; a shape mismatch yields `None`.
    pub fn read_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.read(key)?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(key, error = %e, "Durable store entry has an unexpected shape");
                None
            }
        }
    }

    /// Serializes and stores `value` under `key`. Failures are logged only.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize durable store entry");
                return;
            }
        };

        if let Err(e) = self.backend.set(key, &raw) {
            tracing::warn!(key, error = %e, "Failed to write durable store entry");
        }
    }

    /// Removes `key`. Failures are logged only.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            tracing::warn!(key, error = %e, "Failed to remove durable store entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EduError;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock backend keeping values in a HashMap
    #[derive(Default)]
    struct MockStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MockStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    // Mock backend where every operation fails (e.g. quota exceeded)
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(EduError::storage("disk unavailable"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(EduError::storage("quota exceeded"))
        }

        fn delete(&self, _key: &str) -> Result<()> {
            Err(EduError::storage("disk unavailable"))
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
    }

    #[test]
    fn test_write_then_read() {
        let store = DurableStore::new(Arc::new(MockStore::default()));
        store.write("k", &json!({"name": "lecture"}));

        assert_eq!(store.read("k"), Some(json!({"name": "lecture"})));
        assert_eq!(
            store.read_as::<Record>("k"),
            Some(Record {
                name: "lecture".to_string()
            })
        );
    }

    #[test]
    fn test_missing_key_reads_none() {
        let store = DurableStore::new(Arc::new(MockStore::default()));
        assert!(store.read("missing").is_none());
    }

    #[test]
    fn test_corrupt_content_reads_none() {
        let backend = Arc::new(MockStore::default());
        backend.set("k", "{not json").unwrap();
        let store = DurableStore::new(backend);

        assert!(store.read("k").is_none());
    }

    #[test]
    fn test_wrong_shape_reads_none() {
        let backend = Arc::new(MockStore::default());
        backend.set("k", "[1, 2]").unwrap();
        let store = DurableStore::new(backend);

        assert!(store.read_as::<Record>("k").is_none());
    }

    #[test]
    fn test_failing_backend_is_absorbed() {
        let store = DurableStore::new(Arc::new(FailingStore));
        store.write("k", &json!({"name": "x"}));
        store.remove("k");
        assert!(store.read("k").is_none());
    }

    #[test]
    fn test_remove() {
        let store = DurableStore::new(Arc::new(MockStore::default()));
        store.write("k", &json!(1));
        store.remove("k");
        assert!(store.read("k").is_none());
    }
}
