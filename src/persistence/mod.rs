//! Key-value persistence
//!
//! LocalStorage in the browser, an in-memory map everywhere else. Values are
//! JSON documents; unreadable entries are treated as missing.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// String store keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns false if the value could not be written
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str);
}

/// Store kept in memory for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// None when storage is unavailable (private mode, disabled cookies)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, settings will not persist");
        }
        storage.map(|storage| Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.storage.set_item(key, value).is_ok()
    }

    fn remove(&mut self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            log::warn!("Failed to remove {key} from LocalStorage: {e:?}");
        }
    }
}

/// The store the running platform persists to
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Some(store) => Box::new(store),
        None => Box::new(MemoryStore::new()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(MemoryStore::new())
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable `{key}`: {e}");
            None
        }
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => store.set(key, &json),
        Err(e) => {
            log::warn!("Could not encode `{key}`: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
        label: String,
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = MemoryStore::new();
        let value = Sample { count: 3, label: "owl".into() };
        assert!(save_json(&mut store, "sample", &value));
        assert_eq!(load_json::<Sample>(&store, "sample"), Some(value));
    }

    #[test]
    fn test_missing_and_corrupt_entries() {
        let mut store = MemoryStore::new();
        assert_eq!(load_json::<Sample>(&store, "sample"), None);
        store.set("sample", "{ not json");
        assert_eq!(load_json::<Sample>(&store, "sample"), None);
        store.remove("sample");
        assert!(store.is_empty());
    }
}
