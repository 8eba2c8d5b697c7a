//! LSMSIM - Level
//! Ordered group of SSTables at one depth of the tree.
//! Level 0 receives one table per flush and may hold overlapping ranges;
//! deeper levels only receive tables produced by compaction.

use serde::{Deserialize, Serialize};

use crate::types::Entry;

use super::sstable::SSTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Level number (0 = L0).
    index: usize,
    /// Tables in insertion order.
    tables: Vec<SSTable>,
}

impl Level {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            tables: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn push(&mut self, table: SSTable) {
        self.tables.push(table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in insertion order.
    pub fn tables(&self) -> &[SSTable] {
        &self.tables
    }

    /// Total entries across every table (duplicates counted per table).
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(SSTable::len).sum()
    }

    /// Tables ordered by creation time, newest first.
    /// Recency comes from the stored timestamp, never from list position.
    pub fn newest_first(&self) -> Vec<&SSTable> {
        let mut tables: Vec<&SSTable> = self.tables.iter().collect();
        tables.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        tables
    }

    /// Find the newest table holding `key`. The returned entry decides the
    /// lookup even when it is a tombstone.
    pub fn lookup(&self, key: &str) -> Option<(&SSTable, &Entry)> {
        self.newest_first()
            .into_iter()
            .find_map(|table| table.get(key).map(|entry| (table, entry)))
    }

    /// Remove and return every table, leaving the level empty.
    pub fn take_all(&mut self) -> Vec<SSTable> {
        std::mem::take(&mut self.tables)
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
