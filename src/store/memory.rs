//! In-memory store, used by tests and dry runs.

use super::{
    append_unique, bump, remove_name, ChannelStore, Channels, InterjectCounter, StoreError,
    DEFAULT_THRESHOLD,
};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local channel lists and counters.
#[derive(Debug)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, Vec<String>>>,
    counters: Mutex<HashMap<String, u64>>,
    threshold: u64,
}

impl MemoryStore {
    pub fn new(threshold: u64) -> Self {
        Self {
            lists: Mutex::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
            threshold,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ChannelStore for MemoryStore {
    fn add_to(&self, list: &str, name: &str) -> Result<bool, StoreError> {
        let mut lists = self.lists.lock();
        Ok(append_unique(lists.entry(list.to_string()).or_default(), name))
    }

    fn remove_from(&self, list: &str, name: &str) -> Result<bool, StoreError> {
        let mut lists = self.lists.lock();
        Ok(lists
            .get_mut(list)
            .is_some_and(|names| remove_name(names, name)))
    }

    fn channels_in(&self, list: &str) -> Result<Channels, StoreError> {
        let lists = self.lists.lock();
        Ok(Channels::new(lists.get(list).cloned().unwrap_or_default()))
    }
}

impl InterjectCounter for MemoryStore {
    fn record_and_check(&self, author: &str) -> Result<bool, StoreError> {
        let mut counters = self.counters.lock();
        let count = counters.entry(author.to_string()).or_insert(0);
        let (next, tripped) = bump(*count, self.threshold);
        *count = next;
        Ok(tripped)
    }

    fn count(&self, author: &str) -> Result<u64, StoreError> {
        Ok(self.counters.lock().get(author).copied().unwrap_or(0))
    }
}
