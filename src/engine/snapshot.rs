//! LSMSIM - State Snapshot
//! Owned copy of everything a renderer displays: memtable contents,
//! per-level tables, WAL tail and counters. Encoded with bincode so it can
//! be shipped to a rendering process.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Entry, Key};

use super::level::Level;
use super::metrics::Stats;
use super::wal::WalRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub memtable: BTreeMap<Key, Entry>,
    pub memtable_limit: usize,
    pub levels: Vec<Level>,
    pub wal_tail: Vec<WalRecord>,
    pub stats: Stats,
}

impl EngineSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Total tables across all levels.
    pub fn table_count(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LsmError;

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = EngineSnapshot::from_bytes(&[0xFF, 0x01]).unwrap_err();
        assert!(matches!(err, LsmError::Serialization(_)));
    }

    #[test]
    fn test_empty_snapshot_encodes() {
        let snapshot = EngineSnapshot {
            memtable: BTreeMap::new(),
            memtable_limit: 5,
            levels: vec![Level::new(0), Level::new(1)],
            wal_tail: Vec::new(),
            stats: Stats::default(),
        };
        let decoded = EngineSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.memtable_limit, 5);
        assert_eq!(decoded.levels.len(), 2);
        assert_eq!(decoded.table_count(), 0);
    }
}
