use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::{Result, Error, KVStore};
use crate::engine::Persistence;

type StoreData = HashMap<String, String>;

/// In-memory key-value store with an optional byte quota and optional file persistence.
///
/// Every successful write is flushed to [`Persistence`] before returning, so a failed
/// flush is reported to the caller like any other write failure.
pub struct MemStore {
    data: RwLock<StoreData>,
    persistence: Option<Arc<Persistence>>,
    quota: Option<usize>,
}

impl MemStore {
    pub fn new(initial_data: StoreData, persistence: Option<Arc<Persistence>>) -> Self {
        Self {
            data: RwLock::new(initial_data),
            persistence,
            quota: None,
        }
    }

    /// Limits the total size of all keys and values to `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Number of bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.read().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        if let Some(p) = &self.persistence {
            if let Err(e) = p.save_all(data) {
                log::error!("Failed to persist local storage: {}", e);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl KVStore for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.write();
        if let Some(quota) = self.quota {
            let replaced = data.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let used: usize = data.iter().map(|(k, v)| k.len() + v.len()).sum();
            let needed = used - replaced + key.len() + value.len();
            if needed > quota {
                return Err(Error::QuotaExceeded { needed, quota });
            }
        }
        let previous = data.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&data) {
            match previous {
                Some(v) => data.insert(key.to_string(), v),
                None => data.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.write();
        if data.remove(key).is_some() {
            self.persist(&data)?;
        }
        Ok(())
    }
}
