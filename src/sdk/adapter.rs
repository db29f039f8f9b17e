use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;
use log::{debug, error};
use crate::{AdapterError, AdapterResult, Error, FileInfo, LoadedMap, MapSource, MAP_MIME_TYPE, NEW_MAP_ID};
use crate::engine::MapIndex;

/// File extension stripped from file names to form descriptions.
pub const MAP_FILE_EXTENSION: &str = ".mup";

/// Description for a map imported from `file_name`.
///
/// A single trailing [`MAP_FILE_EXTENSION`] (exact, case-sensitive) is removed.
pub fn description_from_file_name(file_name: &str) -> &str {
    file_name.strip_suffix(MAP_FILE_EXTENSION).unwrap_or(file_name)
}

/// Exposes a [`MapIndex`] as a [`MapSource`] for multi-backend dispatch.
///
/// Ids belong to this backend when they start with the first character of the index
/// prefix (`o` for `offline`). Store failures never escape: loads report
/// [`AdapterError::NotFound`] and everything else is [`AdapterError::LocalStorageFailed`].
pub struct OfflineAdapter {
    index: Arc<MapIndex>,
}

impl OfflineAdapter {
    pub fn new(index: Arc<MapIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<MapIndex> {
        &self.index
    }

    /// Synchronous body of [`MapSource::load_map`].
    pub fn load_now(&self, map_id: &str) -> AdapterResult<LoadedMap> {
        match self.index.load(map_id) {
            Ok(content) => Ok(LoadedMap {
                content,
                map_id: map_id.to_string(),
                mime_type: MAP_MIME_TYPE,
            }),
            Err(Error::MapNotFound(_)) => Err(AdapterError::NotFound),
            Err(e) => {
                error!("loading {} from local storage failed: {}", map_id, e);
                Err(AdapterError::LocalStorageFailed)
            }
        }
    }

    /// Synchronous body of [`MapSource::save_map`].
    pub fn save_now(&self, content: Value, map_id: &str, file_name: &str) -> AdapterResult<String> {
        let info = FileInfo::new(description_from_file_name(file_name), self.index.now());
        let owned = self.recognises(map_id) && self.index.is_map_key(map_id);
        let result = if map_id == NEW_MAP_ID || !owned {
            debug!("saving {} as a new local map", map_id);
            self.index.restore_new(content, info)
        } else {
            self.index
                .restore(map_id, content, info)
                .map(|_| map_id.to_string())
        };
        result.map_err(|e| {
            error!("saving {} to local storage failed: {}", map_id, e);
            AdapterError::LocalStorageFailed
        })
    }
}

#[async_trait]
impl MapSource for OfflineAdapter {
    fn recognises(&self, map_id: &str) -> bool {
        match (map_id.chars().next(), self.index.prefix().chars().next()) {
            (Some(first), Some(marker)) => first == marker,
            _ => false,
        }
    }

    async fn load_map(&self, map_id: &str) -> AdapterResult<LoadedMap> {
        self.load_now(map_id)
    }

    async fn save_map(&self, content: Value, map_id: &str, file_name: &str) -> AdapterResult<String> {
        self.save_now(content, map_id, file_name)
    }
}
