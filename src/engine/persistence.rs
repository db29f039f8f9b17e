use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use crate::{Result, Error};

#[allow(unused_imports)]
use crate::engine::MemStore;

/// File name holding the whole key space.
pub const STORAGE_FILE: &str = "local-storage.json";

/// Handles disk I/O for the [`MemStore`].
///
/// Persistence uses an atomic "write-then-rename" strategy to ensure data integrity.
/// All keys are stored together in a single `.json` file.
pub struct Persistence {
    data_dir: PathBuf,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { data_dir: dir })
    }

    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    /// Writes the key space to disk atomically.
    ///
    /// This method writes to a temporary file first and then renames it to the
    /// final destination, preventing file corruption during power failures.
    pub fn save_all(&self, data: &HashMap<String, String>) -> Result<()> {
        let file_path = self.file_path();
        let temp_path = file_path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(data)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Loads the key space written by [`Persistence::save_all`].
    ///
    /// A missing file yields an empty store. A file that cannot be parsed is an error.
    pub fn load_all(&self) -> Result<HashMap<String, String>> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read(&path)?;
        serde_json::from_slice(&content).map_err(|e| Error::CorruptRecord {
            key: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
