//! LSMSIM - Core Type Definitions
//! Defines fundamental types shared by every layer of the simulated tree.

use serde::{Deserialize, Serialize};

/// Key type for the simulation. Keys are compared lexicographically.
pub type Key = String;

/// Value type for the simulation.
pub type Value = String;

/// Logical timestamp handed out by the engine clock.
pub type Timestamp = u64;

/// A versioned value stored in the memtable or an SSTable.
/// A `None` value indicates a tombstone (deletion marker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Option<Value>,
    pub timestamp: Timestamp,
}

impl Entry {
    /// Create a live entry (WRITE operation).
    pub fn put(value: Value, timestamp: Timestamp) -> Self {
        Self {
            value: Some(value),
            timestamp,
        }
    }

    /// Create a tombstone entry (DELETE operation).
    pub fn tombstone(timestamp: Timestamp) -> Self {
        Self {
            value: None,
            timestamp,
        }
    }

    /// Returns true if this entry is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// Returns true if `self` should replace `other` under last-writer-wins.
    pub fn supersedes(&self, other: &Entry) -> bool {
        self.timestamp > other.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tombstone() {
        assert!(Entry::tombstone(1).is_tombstone());
        assert!(!Entry::put("v".into(), 1).is_tombstone());
    }

    #[test]
    fn test_supersedes_is_strict() {
        let old = Entry::put("a".into(), 1);
        let new = Entry::put("b".into(), 2);
        assert!(new.supersedes(&old));
        assert!(!old.supersedes(&new));
        assert!(!old.supersedes(&old.clone()));
    }
}
