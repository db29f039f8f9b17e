use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;
use log::debug;
use crate::{AdapterError, AdapterResult, LoadedMap, MapSource};

/// Routes map ids to the first backend that recognises them.
///
/// Saves for ids nobody recognises (including "new") go to the default backend.
pub struct Dispatcher {
    sources: Vec<Arc<dyn MapSource>>,
    default: Arc<dyn MapSource>,
}

impl Dispatcher {
    pub fn new(default: Arc<dyn MapSource>) -> Self {
        Self {
            sources: vec![default.clone()],
            default,
        }
    }

    /// Adds a backend. Earlier backends win when several recognise an id.
    pub fn with_source(mut self, source: Arc<dyn MapSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_for(&self, map_id: &str) -> Option<&Arc<dyn MapSource>> {
        self.sources.iter().find(|s| s.recognises(map_id))
    }
}

#[async_trait]
impl MapSource for Dispatcher {
    fn recognises(&self, map_id: &str) -> bool {
        self.source_for(map_id).is_some()
    }

    async fn load_map(&self, map_id: &str) -> AdapterResult<LoadedMap> {
        match self.source_for(map_id) {
            Some(source) => source.load_map(map_id).await,
            None => {
                debug!("no backend recognises {}", map_id);
                Err(AdapterError::NotFound)
            }
        }
    }

    async fn save_map(&self, content: Value, map_id: &str, file_name: &str) -> AdapterResult<String> {
        let source = self.source_for(map_id).unwrap_or(&self.default);
        source.save_map(content, map_id, file_name).await
    }
}
