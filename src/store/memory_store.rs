use indexmap::IndexMap;

use crate::error::{ChartError, ChartResult};

use super::KeyValueStore;

/// In-memory store used by tests and headless hosts.
///
/// An optional byte quota mimics browser storage limits: a write that would
/// exceed it fails and keeps the previous value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: IndexMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota_bytes(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ChartResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> ChartResult<()> {
        if let Some(quota) = self.quota_bytes {
            let previous = self
                .entries
                .get(key)
                .map_or(0, |existing| key.len() + existing.len());
            let next = self.used_bytes() - previous + key.len() + value.len();
            if next > quota {
                return Err(ChartError::storage(
                    key,
                    format!("quota exceeded: {next} > {quota} bytes"),
                ));
            }
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ChartResult<bool> {
        Ok(self.entries.shift_remove(key).is_some())
    }
}
