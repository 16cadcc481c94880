//! Key/value persistence boundary
//!
//! The simulation only needs a synchronous string store:
//! - `get(key)` returns the stored value, if any
//! - `set(key, value)` replaces it
//!
//! On the web this is LocalStorage; everywhere else (and in tests) the
//! in-memory store is used. Callers treat a failed write as "write lost".

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
pub mod local_storage;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("write to '{key}' failed: {reason}")]
    WriteFailed { key: String, reason: String },
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous key -> string store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store (native builds and tests)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a value and parse it, falling back to `T::default()` on any problem
pub fn load_parsed<T, S>(store: &S, key: &str) -> T
where
    T: std::str::FromStr + Default,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Malformed value under '{}', using default", key);
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            T::default()
        }
    }
}

/// Read and deserialize JSON, falling back to `T::default()` on any problem
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Corrupted JSON under '{}' ({}), using default", key, e);
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            T::default()
        }
    }
}

/// Write a value; failures are logged and the write is treated as lost
pub fn store_or_log<S>(store: &S, key: &str, value: &str) -> bool
where
    S: KeyValueStore + ?Sized,
{
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Write lost for '{}': {}", key, e);
            false
        }
    }
}

/// Serialize to JSON and write; failures are logged and the write is treated as lost
pub fn store_json_or_log<T, S>(store: &S, key: &str, value: &T) -> bool
where
    T: serde::Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(json) => store_or_log(store, key, &json),
        Err(e) => {
            log::warn!("Write lost for '{}': {}", key, StoreError::from(e));
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Store whose reads and writes always fail
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disabled".into()))
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::WriteFailed {
                key: key.to_string(),
                reason: "quota exceeded".into(),
            })
        }
    }

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_parsed_falls_back_on_garbage() {
        let store = MemoryStore::new();
        store.set("n", "not a number").unwrap();
        assert_eq!(load_parsed::<u64, _>(&store, "n"), 0);
        store.set("n", " 42 ").unwrap();
        assert_eq!(load_parsed::<u64, _>(&store, "n"), 42);
    }

    #[test]
    fn test_broken_store_is_non_fatal() {
        let store = BrokenStore;
        assert_eq!(load_parsed::<u64, _>(&store, "n"), 0);
        assert_eq!(load_json::<Vec<u32>, _>(&store, "v"), Vec::<u32>::new());
        assert!(!store_or_log(&store, "n", "1"));
    }

    #[test]
    fn test_shared_store_through_rc() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }
}
