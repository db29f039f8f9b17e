/// Software Development Kit (SDK) for Mapstore.
///
/// This module provides the asynchronous map contract shared with other storage
/// backends, a dispatcher composing several backends, and bootstrap helpers.
pub mod adapter;
/// Multi-backend routing by map id.
pub mod dispatcher;
/// Store initialization.
pub mod discovery;

pub use adapter::{description_from_file_name, OfflineAdapter, MAP_FILE_EXTENSION};
pub use discovery::{open, Options};
pub use dispatcher::Dispatcher;
