use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use crate::Result;
use crate::engine::{MapIndex, MemStore, Persistence};
use crate::sdk::OfflineAdapter;

/// Default key prefix for locally stored maps.
pub const DEFAULT_PREFIX: &str = "offline";

/// Settings for [`open`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory holding the persisted key space. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    /// Key prefix for the catalog and map records.
    pub prefix: String,
    /// Optional byte quota for the key-value store.
    pub quota: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
            quota: None,
        }
    }
}

/// Builds a store, an index and an adapter from `options`.
///
/// # Examples
///
/// ```no_run
/// use mapstore::sdk::{self, Options};
/// use mapstore::{MapSource, NEW_MAP_ID};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let adapter = sdk::open(Options { data_dir: Some("./data".into()), ..Options::default() })?;
///     let id = adapter.save_map("content".into(), NEW_MAP_ID, "My map.mup").await?;
///     println!("saved {}", id);
///     Ok(())
/// }
/// ```
pub fn open(options: Options) -> Result<OfflineAdapter> {
    let store = match &options.data_dir {
        Some(dir) => {
            let persistence = Arc::new(Persistence::new(dir)?);
            let initial_data = persistence.load_all()?;
            log::info!("Loaded {} keys from {}", initial_data.len(), persistence.file_path().display());
            MemStore::new(initial_data, Some(persistence))
        }
        None => MemStore::new(HashMap::new(), None),
    };
    let store = match options.quota {
        Some(bytes) => store.with_quota(bytes),
        None => store,
    };
    let index = MapIndex::new(Arc::new(store), &options.prefix);
    Ok(OfflineAdapter::new(Arc::new(index)))
}
