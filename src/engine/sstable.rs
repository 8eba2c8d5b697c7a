//! LSMSIM - SSTable (Sorted String Table)
//! Immutable, sorted snapshot of key -> entry pairs. SSTables are produced
//! by flushing the MemTable into level 0 or by compacting a whole level
//! into the next one, and are never modified afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Entry, Key, Timestamp};

/// Inclusive lexicographic key range summary of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRange {
    pub min: Key,
    pub max: Key,
}

impl KeyRange {
    /// Build the range covering every key of a sorted map.
    /// Returns `None` for an empty map.
    pub fn of(entries: &BTreeMap<Key, Entry>) -> Option<Self> {
        let min = entries.keys().next()?;
        let max = entries.keys().next_back()?;
        Some(Self {
            min: min.clone(),
            max: max.clone(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.min.as_str() <= key && key <= self.max.as_str()
    }

    /// Check if two ranges share at least one possible key.
    pub fn overlaps(&self, other: &KeyRange) -> bool {
        self.min <= other.max && self.max >= other.min
    }
}

impl std::fmt::Display for KeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Sorted String Table held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SSTable {
    /// Unique, strictly increasing table id.
    id: u64,
    /// Engine clock value when the table was created; newer tables shadow older ones.
    created_at: Timestamp,
    /// Level the table was created for.
    level: usize,
    /// Key range summary. Only recorded for tables produced by compaction.
    key_range: Option<KeyRange>,
    entries: BTreeMap<Key, Entry>,
}

impl SSTable {
    /// Freeze a flushed MemTable into a level-0 table.
    pub fn from_flush(id: u64, created_at: Timestamp, entries: BTreeMap<Key, Entry>) -> Self {
        Self {
            id,
            created_at,
            level: 0,
            key_range: None,
            entries,
        }
    }

    /// Build a table produced by compaction into `level`.
    pub fn from_compaction(
        id: u64,
        created_at: Timestamp,
        level: usize,
        entries: BTreeMap<Key, Entry>,
    ) -> Self {
        let key_range = KeyRange::of(&entries);
        Self {
            id,
            created_at,
            level,
            key_range,
            entries,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn key_range(&self) -> Option<&KeyRange> {
        self.key_range.as_ref()
    }

    /// Raw entry lookup, tombstones included.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        if let Some(range) = &self.key_range {
            if !range.contains(key) {
                return None;
            }
        }
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<Key, Entry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
