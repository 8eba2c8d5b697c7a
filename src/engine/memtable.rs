//! LSMSIM - MemTable (In-Memory Sorted Map)
//! The MemTable is the write-buffer of the simulated tree.
//! All mutations land here after being logged, until a flush freezes
//! the contents into a level-0 SSTable.

use std::collections::BTreeMap;

use crate::types::{Entry, Key};

/// In-memory key -> entry map backed by a BTreeMap.
/// The flush threshold is measured in entries, not bytes.
#[derive(Debug, Default)]
pub struct MemTable {
    /// Sorted map storing the newest entry for each key (tombstones included).
    entries: BTreeMap<Key, Entry>,
}

impl MemTable {
    /// Create a new, empty MemTable.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the number of entries in the MemTable.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the MemTable is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite the entry for `key`. Last write wins.
    pub fn insert(&mut self, key: Key, entry: Entry) {
        self.entries.insert(key, entry);
    }

    /// Get the raw entry for `key`, tombstones included.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move the contents out, leaving the MemTable empty.
    pub fn take(&mut self) -> BTreeMap<Key, Entry> {
        std::mem::take(&mut self.entries)
    }

    /// Returns a reference to the inner BTreeMap for iteration.
    pub fn entries(&self) -> &BTreeMap<Key, Entry> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut table = MemTable::new();
        table.insert("key1".into(), Entry::put("value1".into(), 1));
        assert_eq!(
            table.get("key1").and_then(|e| e.value.as_deref()),
            Some("value1")
        );
    }

    #[test]
    fn test_get_nonexistent() {
        let table = MemTable::new();
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_overwrite() {
        let mut table = MemTable::new();
        table.insert("key".into(), Entry::put("old".into(), 1));
        table.insert("key".into(), Entry::put("new".into(), 2));
        assert_eq!(table.get("key").unwrap().value.as_deref(), Some("new"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_tombstone_is_kept() {
        let mut table = MemTable::new();
        table.insert("key".into(), Entry::put("value".into(), 1));
        table.insert("key".into(), Entry::tombstone(2));
        assert!(table.get("key").unwrap().is_tombstone());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_take_leaves_empty() {
        let mut table = MemTable::new();
        table.insert("k1".into(), Entry::put("v1".into(), 1));
        table.insert("k2".into(), Entry::put("v2".into(), 2));
        let taken = table.take();
        assert_eq!(taken.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut table = MemTable::new();
        table.insert("k1".into(), Entry::put("v1".into(), 1));
        table.clear();
        assert!(table.is_empty());
    }
}
