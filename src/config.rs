//! LSMSIM - Engine Configuration
//! Defines tunable parameters for the simulated LSM tree.

use crate::error::{LsmError, Result};

/// Configuration for the simulation engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of memtable entries that triggers a flush to level 0.
    pub memtable_limit: usize,

    /// Number of levels in the tree. The last one never compacts.
    pub num_levels: usize,

    /// Table-count thresholds, one per non-top level.
    pub compaction_thresholds: Vec<usize>,

    /// Maximum number of WAL records retained (oldest evicted first).
    pub wal_capacity: usize,

    /// Number of WAL records included in snapshots.
    pub wal_tail_len: usize,

    /// Number of events kept by an `EventLog` built from this config.
    pub event_log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memtable_limit: 5,
            num_levels: 3,
            compaction_thresholds: vec![3, 4],
            wal_capacity: 20,
            wal_tail_len: 10,
            event_log_capacity: 50,
        }
    }
}

impl Config {
    /// Set the memtable entry count that triggers a flush.
    pub fn with_memtable_limit(mut self, limit: usize) -> Self {
        self.memtable_limit = limit;
        self
    }

    /// Set the level count together with the per-level thresholds.
    /// `thresholds` must hold one value per non-top level.
    pub fn with_levels(mut self, num_levels: usize, thresholds: Vec<usize>) -> Self {
        self.num_levels = num_levels;
        self.compaction_thresholds = thresholds;
        self
    }

    /// Replace the compaction thresholds, keeping the level count.
    pub fn with_compaction_thresholds(mut self, thresholds: Vec<usize>) -> Self {
        self.compaction_thresholds = thresholds;
        self
    }

    /// Set the number of WAL records retained.
    pub fn with_wal_capacity(mut self, capacity: usize) -> Self {
        self.wal_capacity = capacity;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.memtable_limit == 0 {
            return Err(LsmError::Config("memtable_limit must be at least 1".into()));
        }
        if self.num_levels == 0 {
            return Err(LsmError::Config("num_levels must be at least 1".into()));
        }
        if self.compaction_thresholds.len() != self.num_levels - 1 {
            return Err(LsmError::Config(format!(
                "expected {} compaction thresholds for {} levels, got {}",
                self.num_levels - 1,
                self.num_levels,
                self.compaction_thresholds.len()
            )));
        }
        if let Some(level) = self.compaction_thresholds.iter().position(|&t| t == 0) {
            return Err(LsmError::Config(format!(
                "compaction threshold for level {} must be at least 1",
                level
            )));
        }
        if self.wal_capacity == 0 {
            return Err(LsmError::Config("wal_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.memtable_limit, 5);
        assert_eq!(config.compaction_thresholds, vec![3, 4]);
    }

    #[test]
    fn test_zero_memtable_limit_rejected() {
        let config = Config::default().with_memtable_limit(0);
        assert!(matches!(config.validate(), Err(LsmError::Config(_))));
    }

    #[test]
    fn test_threshold_count_must_match_levels() {
        let config = Config::default().with_levels(4, vec![3, 4]);
        assert!(config.validate().is_err());

        let config = Config::default().with_levels(4, vec![3, 4, 5]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_level_has_no_thresholds() {
        let config = Config::default().with_levels(1, vec![]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = Config::default().with_compaction_thresholds(vec![3, 0]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("level 1"));
    }
}
