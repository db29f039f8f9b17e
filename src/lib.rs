//! Mapstore is a small client-side persistence layer for mind maps.
//!
//! Maps and their metadata live in a local, synchronous key-value store. A catalog
//! index allocates identifiers and tracks descriptions and modification times, and an
//! asynchronous adapter exposes the maps to an application that may compose several
//! storage backends (local, cloud, ...) behind one dispatcher.
//!
//! ## Core Components
//! - [`engine`]: The key-value store, its persistence, and the catalog index.
//! - [`sdk`]: The async adapter, the multi-backend dispatcher and bootstrap helpers.

pub mod engine;
pub mod sdk;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the store and the catalog index.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested map has no content record.
    #[error("map not found: {0}")]
    MapNotFound(String),
    /// `save` was called for an id that is not in the catalog.
    #[error("unknown map: {0}")]
    UnknownMap(String),
    /// The id names an index-internal record and cannot hold a map.
    #[error("reserved key: {0}")]
    ReservedKey(String),
    /// The key-value store refused a write because it is full.
    #[error("quota exceeded: {needed} bytes needed, {quota} available")]
    QuotaExceeded { needed: usize, quota: usize },
    /// A persisted record could not be decoded.
    #[error("corrupt record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for store and index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The only failure reasons a [`MapSource`] reports to its callers.
///
/// The `Display` form is the exact reason string shared by every backend.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterError {
    #[error("not-found")]
    NotFound,
    #[error("local-storage-failed")]
    LocalStorageFailed,
}

impl AdapterError {
    pub fn reason(&self) -> &'static str {
        match self {
            AdapterError::NotFound => "not-found",
            AdapterError::LocalStorageFailed => "local-storage-failed",
        }
    }
}

/// Result type of the asynchronous adapter contract.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Map id meaning "assign a fresh identifier".
pub const NEW_MAP_ID: &str = "new";

/// Media type reported for every map loaded from local storage.
pub const MAP_MIME_TYPE: &str = "application/json";

/// Catalog metadata for a single map, persisted as `{"d": ..., "t": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Human-readable description shown in listings.
    #[serde(rename = "d")]
    pub description: String,
    /// Last modification time in epoch seconds.
    #[serde(rename = "t")]
    pub modified_at: i64,
}

impl FileInfo {
    pub fn new(description: impl Into<String>, modified_at: i64) -> Self {
        Self {
            description: description.into(),
            modified_at,
        }
    }
}

/// A map as returned by [`MapSource::load_map`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMap {
    pub content: serde_json::Value,
    pub map_id: String,
    pub mime_type: &'static str,
}

/// Raw string-keyed storage underneath the catalog index.
///
/// Writes may fail (e.g. quota exhaustion); reads only report absence.
pub trait KVStore: Send + Sync {
    /// Returns the value stored at `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// A storage backend addressable by map id.
///
/// Every backend resolves or rejects with an [`AdapterError`] so that a dispatcher can
/// compose local and remote providers uniformly.
#[async_trait]
pub trait MapSource: Send + Sync {
    /// Returns true if `map_id` belongs to this backend. Never touches storage.
    fn recognises(&self, map_id: &str) -> bool;
    /// Loads the content of `map_id`.
    async fn load_map(&self, map_id: &str) -> AdapterResult<LoadedMap>;
    /// Saves `content` under `map_id` (or a fresh id), describing it by `file_name`.
    ///
    /// Resolves with the id the map was stored under.
    async fn save_map(
        &self,
        content: serde_json::Value,
        map_id: &str,
        file_name: &str,
    ) -> AdapterResult<String>;
}
