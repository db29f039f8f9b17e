//! Catalog index for locally stored maps.
//!
//! The index owns two kinds of records in the underlying [`KVStore`]:
//!
//! ```text
//! <prefix>-maps      {"nextMapId": 3, "maps": {"<prefix>-map-1": {"d": "Title", "t": 1700000000}, ...}}
//! <prefix>-map-<n>   {"map": <content exactly as supplied>}
//! ```
//!
//! Content and catalog are written separately. Writes put the content record first and
//! the catalog second, and removals drop the catalog entry first, so a half-finished
//! operation leaves at worst an orphaned content record and never a catalog entry that
//! points at missing content. There is no rollback.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, warn};
use crate::{Result, Error, FileInfo, KVStore};
use crate::engine::{Clock, JsonStorage, ListenerId, Listeners, SystemClock};

#[derive(Debug, Serialize, Deserialize)]
struct Catalog {
    #[serde(rename = "nextMapId")]
    next_map_id: u64,
    maps: BTreeMap<String, FileInfo>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            next_map_id: 1,
            maps: BTreeMap::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MapRecord<T> {
    map: T,
}

/// Allocates map ids and keeps map content and metadata in a [`KVStore`].
///
/// All mutations are serialized through an internal lock; the index assumes it is the
/// only writer of its keys.
pub struct MapIndex {
    storage: JsonStorage,
    prefix: String,
    clock: Arc<dyn Clock>,
    listeners: RwLock<Listeners>,
    writer: Mutex<()>,
}

impl MapIndex {
    /// Creates an index whose keys all start with `prefix` (e.g. `offline`).
    pub fn new(store: Arc<dyn KVStore>, prefix: &str) -> Self {
        Self {
            storage: JsonStorage::new(store),
            prefix: prefix.to_string(),
            clock: Arc::new(SystemClock),
            listeners: RwLock::new(Listeners::new()),
            writer: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the catalog record.
    pub fn catalog_key(&self) -> String {
        format!("{}-maps", self.prefix)
    }

    /// Formats the id for map number `n`.
    pub fn map_id(&self, n: u64) -> String {
        format!("{}-map-{}", self.prefix, n)
    }

    /// Returns `n` if `map_id` has this index's `<prefix>-map-<n>` form.
    pub fn map_number(&self, map_id: &str) -> Option<u64> {
        map_id
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix("-map-")?
            .parse()
            .ok()
    }

    /// False for keys the index uses for its own records.
    pub(crate) fn is_map_key(&self, map_id: &str) -> bool {
        map_id != self.catalog_key()
    }

    fn check_map_key(&self, map_id: &str) -> Result<()> {
        if self.is_map_key(map_id) {
            Ok(())
        } else {
            Err(Error::ReservedKey(map_id.to_string()))
        }
    }

    /// Current modification timestamp, in epoch seconds.
    pub fn now(&self) -> i64 {
        (self.clock.now_millis() + 500).div_euclid(1000)
    }

    /// Stores `content` under a freshly allocated id, describing it by its title.
    pub fn save_new(&self, content: impl Into<Value>) -> Result<String> {
        let content = content.into();
        let info = FileInfo::new(describe(&content), self.now());
        let _guard = self.lock();
        let mut catalog = self.catalog()?;
        let map_id = self.allocate(&mut catalog);
        self.write(&mut catalog, &map_id, &content, info)?;
        Ok(map_id)
    }

    /// Overwrites the content of an existing map and refreshes its title and timestamp.
    pub fn save(&self, map_id: &str, content: impl Into<Value>) -> Result<()> {
        self.check_map_key(map_id)?;
        let content = content.into();
        let info = FileInfo::new(describe(&content), self.now());
        let _guard = self.lock();
        let mut catalog = self.catalog()?;
        if !catalog.maps.contains_key(map_id) {
            return Err(Error::UnknownMap(map_id.to_string()));
        }
        self.write(&mut catalog, map_id, &content, info)
    }

    /// Stores `content` under `map_id` with caller-supplied metadata.
    ///
    /// The content is never inspected. Emits `restored` once both records are written.
    pub fn restore(&self, map_id: &str, content: impl Into<Value>, info: FileInfo) -> Result<()> {
        self.check_map_key(map_id)?;
        let content = content.into();
        {
            let _guard = self.lock();
            let mut catalog = self.catalog()?;
            if let Some(n) = self.map_number(map_id) {
                if n >= catalog.next_map_id {
                    catalog.next_map_id = n + 1;
                }
            }
            self.write(&mut catalog, map_id, &content, info.clone())?;
        }
        self.notify_restored(map_id, &content, &info);
        Ok(())
    }

    /// Like [`MapIndex::restore`], but under a freshly allocated id.
    pub fn restore_new(&self, content: impl Into<Value>, info: FileInfo) -> Result<String> {
        let content = content.into();
        let map_id = {
            let _guard = self.lock();
            let mut catalog = self.catalog()?;
            let map_id = self.allocate(&mut catalog);
            self.write(&mut catalog, &map_id, &content, info.clone())?;
            map_id
        };
        self.notify_restored(&map_id, &content, &info);
        Ok(map_id)
    }

    /// Deletes the map's catalog entry and content and emits `deleted`.
    ///
    /// Removing an unknown id does nothing and emits nothing.
    pub fn remove(&self, map_id: &str) -> Result<()> {
        self.check_map_key(map_id)?;
        {
            let _guard = self.lock();
            let mut catalog = self.catalog()?;
            let had_entry = catalog.maps.remove(map_id).is_some();
            let had_content = self.storage.contains(map_id);
            if !had_entry && !had_content {
                debug!("remove {}: nothing stored", map_id);
                return Ok(());
            }
            if had_entry {
                self.storage.set_item(&self.catalog_key(), &catalog)?;
            }
            self.storage.remove_item(map_id)?;
            debug!("removed {}", map_id);
        }
        let deleted = self.read_listeners().deleted();
        for f in deleted {
            f(map_id);
        }
        Ok(())
    }

    /// Returns the metadata of every map, without content.
    pub fn list(&self) -> Result<BTreeMap<String, FileInfo>> {
        Ok(self.catalog()?.maps)
    }

    /// Returns the content of `map_id` exactly as it was stored.
    pub fn load(&self, map_id: &str) -> Result<Value> {
        if !self.is_map_key(map_id) {
            return Err(Error::MapNotFound(map_id.to_string()));
        }
        self.storage
            .get_item::<MapRecord<Value>>(map_id)?
            .map(|record| record.map)
            .ok_or_else(|| Error::MapNotFound(map_id.to_string()))
    }

    pub fn contains(&self, map_id: &str) -> Result<bool> {
        Ok(self.catalog()?.maps.contains_key(map_id))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.catalog()?.maps.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Registers a callback for `restored(map_id, content, info)`.
    pub fn on_restored<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&str, &Value, &FileInfo) + Send + Sync + 'static,
    {
        self.write_listeners().on_restored(f)
    }

    /// Registers a callback for `deleted(map_id)`.
    pub fn on_deleted<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.write_listeners().on_deleted(f)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.write_listeners().remove(id)
    }

    fn catalog(&self) -> Result<Catalog> {
        let key = self.catalog_key();
        match self.storage.get_item::<Catalog>(&key) {
            Ok(catalog) => Ok(catalog.unwrap_or_default()),
            Err(e) => {
                warn!("unreadable catalog at {}: {}", key, e);
                Err(e)
            }
        }
    }

    fn allocate(&self, catalog: &mut Catalog) -> String {
        let map_id = self.map_id(catalog.next_map_id);
        catalog.next_map_id += 1;
        debug!("allocated {}", map_id);
        map_id
    }

    fn write(&self, catalog: &mut Catalog, map_id: &str, content: &Value, info: FileInfo) -> Result<()> {
        self.storage.set_item(map_id, &MapRecord { map: content })?;
        catalog.maps.insert(map_id.to_string(), info);
        self.storage.set_item(&self.catalog_key(), catalog)?;
        debug!("stored {}", map_id);
        Ok(())
    }

    fn notify_restored(&self, map_id: &str, content: &Value, info: &FileInfo) {
        let restored = self.read_listeners().restored();
        for f in restored {
            f(map_id, content, info);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_listeners(&self) -> std::sync::RwLockReadGuard<'_, Listeners> {
        self.listeners.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_listeners(&self) -> std::sync::RwLockWriteGuard<'_, Listeners> {
        self.listeners.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Title of a structured map, or of a string that parses to one. Empty otherwise.
fn describe(content: &Value) -> String {
    let parsed;
    let doc = match content {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(_) => return String::new(),
        },
        other => other,
    };
    doc.get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
