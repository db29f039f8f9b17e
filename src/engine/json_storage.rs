use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::{Result, Error, KVStore};

/// Typed JSON records on top of a string [`KVStore`].
#[derive(Clone)]
pub struct JsonStorage {
    store: Arc<dyn KVStore>,
}

impl JsonStorage {
    pub fn new(store: Arc<dyn KVStore>) -> Self {
        Self { store }
    }

    /// Decodes the record at `key`. Absent keys yield `Ok(None)`.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| Error::CorruptRecord {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// True if anything is stored at `key`, decodable or not.
    pub fn contains(&self, key: &str) -> bool {
        self.store.get(key).is_some()
    }

    pub fn set_item<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }
}
