//! LSMSIM - Compaction Strategy
//! Decides when a level is compacted and merges the tables of a level
//! into one table for the next level.
//!
//! ## Count-Triggered Leveled Compaction
//! - Each non-top level has a table-count threshold (L0 >= 3, L1 >= 4 by default)
//! - Once a level reaches its threshold, ALL of its tables are merged into a
//!   single new table appended to the next level
//! - The top level has no threshold and never compacts
//! - Thresholds are re-checked after every flush and every compaction, so one
//!   flush can cascade through several levels

use std::collections::BTreeMap;

use crate::types::{Entry, Key};

use super::level::Level;
use super::sstable::SSTable;

/// Trait defining when a level should be compacted.
pub trait CompactionStrategy {
    /// Returns true if `level`, currently holding `table_count` tables,
    /// should be merged into the next level.
    fn should_compact(&self, level: usize, table_count: usize) -> bool;

    /// Returns the human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Pick the shallowest level that needs compacting. The top level is
    /// never selected.
    fn select_level(&self, levels: &[Level]) -> Option<usize> {
        let top = levels.len().checked_sub(1)?;
        levels[..top]
            .iter()
            .find(|level| self.should_compact(level.index(), level.len()))
            .map(Level::index)
    }
}

/// Compacts a level once its table count reaches a fixed threshold.
#[derive(Debug, Clone)]
pub struct CountThresholdCompaction {
    /// Threshold per non-top level, indexed by level number.
    thresholds: Vec<usize>,
}

impl CountThresholdCompaction {
    pub fn new(thresholds: Vec<usize>) -> Self {
        Self { thresholds }
    }

    pub fn threshold(&self, level: usize) -> Option<usize> {
        self.thresholds.get(level).copied()
    }
}

impl CompactionStrategy for CountThresholdCompaction {
    fn should_compact(&self, level: usize, table_count: usize) -> bool {
        match self.threshold(level) {
            Some(threshold) => table_count > 0 && table_count >= threshold,
            None => false,
        }
    }

    fn name(&self) -> &str {
        "CountThresholdCompaction"
    }
}

/// Merge the entries of several tables by key.
///
/// When a key appears in more than one table the entry with the greatest
/// timestamp wins; on equal timestamps the first one seen is kept.
/// Tombstones are carried into the result so they keep shadowing older
/// versions in deeper levels.
pub fn merge_tables(tables: &[SSTable]) -> BTreeMap<Key, Entry> {
    let mut merged: BTreeMap<Key, Entry> = BTreeMap::new();

    for table in tables {
        for (key, entry) in table.entries() {
            match merged.get(key) {
                Some(current) if !entry.supersedes(current) => {}
                _ => {
                    merged.insert(key.clone(), entry.clone());
                }
            }
        }
    }

    merged
}
