//! Persistent bot state.
//!
//! Two concerns live here:
//! - Channel lists: the rooms the bot joins at startup (`communities`) and
//!   any other named list, e.g. rooms that opted out of a responder.
//! - Interjection counters: per-author tallies that trip a whisper once they
//!   pass a threshold.
//!
//! [`RedbStore`] is the on-disk implementation; [`MemoryStore`] backs tests.

mod memory;
mod disk;

pub use self::memory::MemoryStore;
pub use self::disk::RedbStore;

use thiserror::Error;

/// Channel list joined at startup.
pub const COMMUNITIES: &str = "communities";

/// Default interjection threshold.
pub const DEFAULT_THRESHOLD: u64 = 25;

/// Errors from the persistent store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("failed to create store directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot of a channel list.
///
/// Iteration is lazy over the snapshot taken when the list was read; call
/// [`ChannelStore::get_channels`] again to observe later changes.
#[derive(Debug, Clone)]
pub struct Channels {
    inner: std::vec::IntoIter<String>,
}

impl Channels {
    pub(crate) fn new(names: Vec<String>) -> Self {
        Self {
            inner: names.into_iter(),
        }
    }
}

impl Iterator for Channels {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Channels {}

/// Named, insertion-ordered channel lists.
pub trait ChannelStore: Send + Sync {
    /// Append `name` to `list` unless already present. Returns `true` if added.
    fn add_to(&self, list: &str, name: &str) -> Result<bool, StoreError>;

    /// Remove `name` from `list`. Returns `true` if it was present.
    fn remove_from(&self, list: &str, name: &str) -> Result<bool, StoreError>;

    /// Read `list`. A list that was never written is empty.
    fn channels_in(&self, list: &str) -> Result<Channels, StoreError>;

    /// Add a room to the startup list.
    fn add_channel(&self, name: &str) -> Result<bool, StoreError> {
        self.add_to(COMMUNITIES, name)
    }

    /// Remove a room from the startup list.
    fn remove_channel(&self, name: &str) -> Result<bool, StoreError> {
        self.remove_from(COMMUNITIES, name)
    }

    /// Rooms joined at startup.
    fn get_channels(&self) -> Result<Channels, StoreError> {
        self.channels_in(COMMUNITIES)
    }
}

/// Per-author interjection tally.
pub trait InterjectCounter: Send + Sync {
    /// Count one more hit for `author`. Returns `true` (and resets the
    /// counter to zero) once the count exceeds the threshold.
    fn record_and_check(&self, author: &str) -> Result<bool, StoreError>;

    /// Current count for `author`.
    fn count(&self, author: &str) -> Result<u64, StoreError>;
}

/// Shared list semantics: append if missing.
pub(crate) fn append_unique(list: &mut Vec<String>, name: &str) -> bool {
    if list.iter().any(|existing| existing == name) {
        false
    } else {
        list.push(name.to_string());
        true
    }
}

/// Shared list semantics: remove if present.
pub(crate) fn remove_name(list: &mut Vec<String>, name: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != name);
    list.len() != before
}

/// Shared counter semantics. Returns the new count and whether it tripped.
pub(crate) fn bump(count: u64, threshold: u64) -> (u64, bool) {
    let next = count.saturating_add(1);
    if next > threshold { (0, true) } else { (next, false) }
}
