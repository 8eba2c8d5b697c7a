//! LSMSIM - Storage Engine Module
//! Top-level module for the simulated LSM-Tree.
//!
//! ## Write path
//! WAL record -> MemTable -> (limit reached) flush to a new L0 SSTable ->
//! (threshold reached) compaction of the whole level into the next one,
//! cascading until no level qualifies.
//!
//! ## Read path
//! MemTable, then L0 .. LN; inside each level tables are probed newest first.
//! The first structure holding the key decides the result, and a tombstone
//! decides "not found".

pub mod compaction;
pub mod events;
pub mod level;
pub mod memtable;
pub mod metrics;
pub mod snapshot;
pub mod sstable;
pub mod wal;

use crate::config::Config;
use crate::error::Result;
use crate::types::{Entry, Key, Timestamp, Value};

use self::compaction::{merge_tables, CompactionStrategy, CountThresholdCompaction};
use self::events::{EngineEvent, EngineObserver, ReadSource};
use self::level::Level;
use self::memtable::MemTable;
use self::metrics::{EngineMetrics, Stats};
use self::snapshot::EngineSnapshot;
use self::sstable::SSTable;
use self::wal::{WalOp, WalRecord, WriteAheadLog};

/// Outcome of a lookup, with the structure that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub value: Option<Value>,
    pub source: ReadSource,
    /// True when the deciding entry was a tombstone.
    pub tombstone: bool,
}

impl Lookup {
    fn decided(entry: &Entry, source: ReadSource) -> Self {
        Self {
            value: entry.value.clone(),
            source,
            tombstone: entry.is_tombstone(),
        }
    }

    fn missing() -> Self {
        Self {
            value: None,
            source: ReadSource::Missing,
            tombstone: false,
        }
    }
}

/// The simulated LSM-Tree.
/// Owns the WAL, the active MemTable and the leveled SSTables. All
/// operations run to completion before returning.
pub struct Engine {
    memtable: MemTable,
    levels: Vec<Level>,
    wal: WriteAheadLog,
    metrics: EngineMetrics,
    strategy: Box<dyn CompactionStrategy + Send>,
    observers: Vec<Box<dyn EngineObserver>>,
    config: Config,
    /// Logical clock; every entry and table gets a strictly larger value.
    clock: Timestamp,
    last_table_id: u64,
}

impl Engine {
    /// Build an empty engine using the count-threshold compaction strategy.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let levels = (0..config.num_levels).map(Level::new).collect();
        let strategy = CountThresholdCompaction::new(config.compaction_thresholds.clone());

        log::info!(
            "LSM engine created: {} levels, memtable limit {}, thresholds {:?}",
            config.num_levels,
            config.memtable_limit,
            config.compaction_thresholds
        );

        Ok(Self {
            memtable: MemTable::new(),
            levels,
            wal: WriteAheadLog::new(config.wal_capacity),
            metrics: EngineMetrics::new(),
            strategy: Box::new(strategy),
            observers: Vec::new(),
            config,
            clock: 0,
            last_table_id: 0,
        })
    }

    /// Replace the compaction trigger policy.
    pub fn with_compaction_strategy(mut self, strategy: Box<dyn CompactionStrategy + Send>) -> Self {
        log::debug!("Compaction strategy set to {}", strategy.name());
        self.strategy = strategy;
        self
    }

    /// Register an observer for progress events.
    pub fn subscribe(&mut self, observer: Box<dyn EngineObserver>) {
        self.observers.push(observer);
    }

    /// Insert a key-value pair.
    /// The write path: WAL -> MemTable -> flush check.
    pub fn write(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        self.apply(key.into(), Some(value.into()));
    }

    /// Delete a key by writing a tombstone.
    pub fn delete(&mut self, key: impl Into<Key>) {
        self.apply(key.into(), None);
    }

    fn apply(&mut self, key: Key, value: Option<Value>) {
        let timestamp = self.tick();
        let tombstone = value.is_none();
        let operation = if tombstone { WalOp::Delete } else { WalOp::Write };

        // Step 1: log first
        let record = self.wal.append(operation, &key, value.as_deref(), timestamp);
        let (wal_id, frame_len) = (record.id, record.encoded_len());
        self.metrics.record_wal_entry(frame_len);
        self.emit(EngineEvent::WalAppended {
            id: wal_id,
            key: key.clone(),
        });

        // Step 2: apply to the MemTable
        self.memtable.insert(key.clone(), Entry { value, timestamp });
        if tombstone {
            self.metrics.record_delete();
        } else {
            self.metrics.record_write();
        }
        log::debug!("{}: {} (WAL -> Memtable)", operation, key);
        self.emit(EngineEvent::MemtableUpdated {
            key,
            tombstone,
            size: self.memtable.len(),
        });

        // Step 3: flush once the limit is reached
        if self.memtable.len() >= self.config.memtable_limit {
            self.flush();
        }
    }

    /// Get the live value for `key`, or `None` if it is missing or deleted.
    pub fn read(&self, key: &str) -> Option<Value> {
        self.lookup(key).value
    }

    /// Run the read path and report which structure decided the result.
    pub fn lookup(&self, key: &str) -> Lookup {
        self.metrics.record_read();

        let result = self.find(key);
        log::debug!(
            "READ: {} {} in {}",
            key,
            if result.value.is_some() { "found" } else { "not found" },
            result.source
        );
        self.emit(EngineEvent::Read {
            key: key.to_owned(),
            found: result.value.is_some(),
            source: result.source,
        });
        result
    }

    fn find(&self, key: &str) -> Lookup {
        if let Some(entry) = self.memtable.get(key) {
            return Lookup::decided(entry, ReadSource::Memtable);
        }

        for level in &self.levels {
            if let Some((table, entry)) = level.lookup(key) {
                let source = ReadSource::Table {
                    level: level.index(),
                    id: table.id(),
                };
                return Lookup::decided(entry, source);
            }
        }

        Lookup::missing()
    }

    /// Freeze the MemTable into a new level-0 SSTable, then run any
    /// compactions that became due. No-op on an empty MemTable.
    pub fn flush(&mut self) {
        if self.memtable.is_empty() {
            return;
        }

        let entries = self.memtable.take();
        let id = self.next_table_id();
        let table = SSTable::from_flush(id, self.tick(), entries);
        let count = table.len();
        self.levels[0].push(table);
        self.metrics.record_flush();

        log::info!(
            "FLUSH: Memtable flushed to Level 0 (SSTable {}, {} entries)",
            id,
            count
        );
        self.emit(EngineEvent::Flushed {
            table_id: id,
            entries: count,
        });

        self.run_compactions();
    }

    /// Merge every table of `level` into one table in `level + 1`, then run
    /// any compactions that became due. No-op for the top level, an
    /// unknown level, or an empty level.
    pub fn compact(&mut self, level: usize) {
        if self.compact_level(level) {
            self.run_compactions();
        }
    }

    /// Flush the MemTable and compact level 0 regardless of thresholds.
    pub fn force_compaction(&mut self) {
        self.flush();
        self.compact(0);
    }

    fn compact_level(&mut self, level: usize) -> bool {
        if level + 1 >= self.levels.len() {
            log::debug!("COMPACT: L{} is the top level or unknown, skipping", level);
            return false;
        }
        if self.levels[level].is_empty() {
            return false;
        }

        let tables = self.levels[level].take_all();
        let target = level + 1;
        log::info!(
            "COMPACT: L{}->L{} - merging {} files",
            level,
            target,
            tables.len()
        );
        self.emit(EngineEvent::CompactionStarted {
            level,
            tables: tables.len(),
        });

        let merged = merge_tables(&tables);
        let keys = merged.len();
        let table_id = if merged.is_empty() {
            None
        } else {
            let id = self.next_table_id();
            let table = SSTable::from_compaction(id, self.tick(), target, merged);
            self.levels[target].push(table);
            Some(id)
        };
        self.metrics.record_compaction();

        match table_id {
            Some(id) => log::info!(
                "COMPACT: Created SSTable {} in L{} with {} keys",
                id,
                target,
                keys
            ),
            None => log::info!("COMPACT: L{}->L{} produced no table", level, target),
        }
        self.emit(EngineEvent::CompactionFinished {
            from: level,
            to: target,
            table_id,
            keys,
        });
        true
    }

    /// Compact the shallowest qualifying level until none qualifies.
    fn run_compactions(&mut self) {
        while let Some(level) = self.strategy.select_level(&self.levels) {
            if !self.compact_level(level) {
                break;
            }
        }
    }

    /// Change the flush threshold for subsequent writes. Does not flush.
    pub fn set_memtable_limit(&mut self, limit: usize) {
        let limit = if limit == 0 {
            log::warn!("CONFIG: memtable limit 0 is invalid, using 1");
            1
        } else {
            limit
        };
        self.config.memtable_limit = limit;
        log::info!("CONFIG: Memtable limit set to {}", limit);
        self.emit(EngineEvent::LimitChanged { limit });
    }

    /// Reset to the state of a freshly constructed engine.
    /// Observers and configuration are kept.
    pub fn clear(&mut self) {
        self.memtable.clear();
        for level in &mut self.levels {
            level.clear();
        }
        self.wal.reset();
        self.metrics.reset();
        self.clock = 0;
        self.last_table_id = 0;

        log::info!("CLEAR: All data cleared including WAL");
        self.emit(EngineEvent::Cleared);
    }

    pub fn memtable(&self) -> &MemTable {
        &self.memtable
    }

    pub fn memtable_limit(&self) -> usize {
        self.config.memtable_limit
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn wal(&self) -> &WriteAheadLog {
        &self.wal
    }

    /// The `n` most recent WAL records, oldest first.
    pub fn wal_tail(&self, n: usize) -> Vec<&WalRecord> {
        self.wal.tail(n)
    }

    pub fn stats(&self) -> Stats {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Owned copy of the displayable state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            memtable: self.memtable.entries().clone(),
            memtable_limit: self.config.memtable_limit,
            levels: self.levels.clone(),
            wal_tail: self
                .wal
                .tail(self.config.wal_tail_len)
                .into_iter()
                .cloned()
                .collect(),
            stats: self.stats(),
        }
    }

    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        self.clock
    }

    fn next_table_id(&mut self) -> u64 {
        self.last_table_id += 1;
        self.last_table_id
    }

    fn emit(&self, event: EngineEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}
