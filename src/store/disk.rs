//! Redb-backed store.
//!
//! # Schema
//!
//! ```text
//! CHANNEL_LISTS: list_name -> Vec<String> (serde_json)
//! INTERJECTIONS: author    -> u64
//! ```

use super::{
    append_unique, bump, remove_name, ChannelStore, Channels, InterjectCounter, StoreError,
};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Redb table for channel lists.
const CHANNEL_LISTS: TableDefinition<&str, &[u8]> = TableDefinition::new("channel_lists");

/// Redb table for interjection counters.
const INTERJECTIONS: TableDefinition<&str, u64> = TableDefinition::new("interjections");

/// Redb-backed channel lists and interjection counters.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
    threshold: u64,
}

impl RedbStore {
    /// Open (or create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P, threshold: u64) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let db = Database::create(path)?;

        // Ensure tables exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CHANNEL_LISTS)?;
            let _ = write_txn.open_table(INTERJECTIONS)?;
        }
        write_txn.commit()?;

        info!(path = %path.display(), threshold, "Store opened");
        Ok(Self {
            db: Arc::new(db),
            threshold,
        })
    }

    /// Interjection threshold this store was opened with.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    fn decode_list(bytes: &[u8]) -> Result<Vec<String>, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn encode_list(list: &[String]) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(list).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Read-modify-write one list inside a single transaction.
    fn update_list<F>(&self, list: &str, edit: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        let write_txn = self.db.begin_write()?;
        let changed = {
            let mut table = write_txn.open_table(CHANNEL_LISTS)?;
            let mut names = match table.get(list)? {
                Some(value) => Self::decode_list(value.value())?,
                None => Vec::new(),
            };
            let changed = edit(&mut names);
            if changed {
                let encoded = Self::encode_list(&names)?;
                table.insert(list, encoded.as_slice())?;
            }
            changed
        };
        write_txn.commit()?;
        Ok(changed)
    }
}

impl ChannelStore for RedbStore {
    fn add_to(&self, list: &str, name: &str) -> Result<bool, StoreError> {
        let added = self.update_list(list, |names| append_unique(names, name))?;
        debug!(list, name, added, "Channel list add");
        Ok(added)
    }

    fn remove_from(&self, list: &str, name: &str) -> Result<bool, StoreError> {
        let removed = self.update_list(list, |names| remove_name(names, name))?;
        debug!(list, name, removed, "Channel list remove");
        Ok(removed)
    }

    fn channels_in(&self, list: &str) -> Result<Channels, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CHANNEL_LISTS)?;
        let names = match table.get(list)? {
            Some(value) => Self::decode_list(value.value())?,
            None => Vec::new(),
        };
        Ok(Channels::new(names))
    }
}

impl InterjectCounter for RedbStore {
    fn record_and_check(&self, author: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let tripped = {
            let mut table = write_txn.open_table(INTERJECTIONS)?;
            let current = table.get(author)?.map(|v| v.value()).unwrap_or(0);
            let (next, tripped) = bump(current, self.threshold);
            table.insert(author, next)?;
            tripped
        };
        write_txn.commit()?;
        Ok(tripped)
    }

    fn count(&self, author: &str) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTERJECTIONS)?;
        Ok(table.get(author)?.map(|v| v.value()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::COMMUNITIES;

    fn open_temp(threshold: u64) -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("state/gnubot.redb"), threshold).unwrap();
        (dir, store)
    }

    #[test]
    fn test_channels_roundtrip_in_order() {
        let (_dir, store) = open_temp(25);

        assert!(store.add_channel("#zeta").unwrap());
        assert!(store.add_channel("#alpha").unwrap());
        assert!(!store.add_channel("#zeta").unwrap());

        let channels: Vec<String> = store.get_channels().unwrap().collect();
        assert_eq!(channels, vec!["#zeta", "#alpha"]);

        assert!(store.remove_channel("#zeta").unwrap());
        assert!(!store.remove_channel("#zeta").unwrap());
        assert_eq!(store.get_channels().unwrap().collect::<Vec<_>>(), vec!["#alpha"]);
    }

    #[test]
    fn test_named_lists_are_independent() {
        let (_dir, store) = open_temp(25);

        store.add_to("audited_by_gnu", "#safe").unwrap();
        assert_eq!(store.channels_in(COMMUNITIES).unwrap().count(), 0);
        assert_eq!(
            store.channels_in("audited_by_gnu").unwrap().collect::<Vec<_>>(),
            vec!["#safe"]
        );
    }

    #[test]
    fn test_interjection_counter_trips_on_26th() {
        let (_dir, store) = open_temp(25);

        for _ in 0..25 {
            assert!(!store.record_and_check("nick").unwrap());
        }
        assert_eq!(store.count("nick").unwrap(), 25);
        assert!(store.record_and_check("nick").unwrap());
        assert_eq!(store.count("nick").unwrap(), 0);
        assert!(!store.record_and_check("nick").unwrap());
        assert_eq!(store.count("nick").unwrap(), 1);
        assert_eq!(store.count("someone_else").unwrap(), 0);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gnubot.redb");
        {
            let store = RedbStore::open(&path, 3).unwrap();
            store.add_channel("#kept").unwrap();
            store.record_and_check("nick").unwrap();
        }
        let store = RedbStore::open(&path, 3).unwrap();
        assert_eq!(store.get_channels().unwrap().collect::<Vec<_>>(), vec!["#kept"]);
        assert_eq!(store.count("nick").unwrap(), 1);
    }
}
