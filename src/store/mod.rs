//! Persistence of the chart-state document.
//!
//! The document lives under a single key of a synchronous key-value store,
//! the way a browser shell keeps it in local storage.

mod codec;
mod document;
mod file_store;
mod memory_store;

pub use codec::StateCodec;
pub use document::{ChartStateDocument, IndicatorEntry, OverlayEntry};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::ChartResult;

/// Default key holding the serialized document.
pub const STATE_STORAGE_KEY: &str = "chartstatedata";

/// Synchronous string key-value storage.
///
/// A failed `set` must leave the previous value readable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> ChartResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> ChartResult<()>;
    /// Returns `true` when a value was removed.
    fn remove(&mut self, key: &str) -> ChartResult<bool>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> ChartResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> ChartResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> ChartResult<bool> {
        (**self).remove(key)
    }
}
