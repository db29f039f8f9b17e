pub mod clock;
pub mod events;
pub mod index;
pub mod json_storage;
pub mod memstore;
pub mod persistence;

pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{ListenerId, Listeners};
pub use index::MapIndex;
pub use json_storage::JsonStorage;
pub use memstore::MemStore;
pub use persistence::Persistence;
