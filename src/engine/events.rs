//! LSMSIM - Progress Events
//! Every engine operation is one atomic state transition. Hosts that want to
//! animate the steps (WAL append, memtable update, flush, compaction) register
//! an [`EngineObserver`] and receive the events in the order they happened.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::types::Key;

/// Where a read was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Memtable,
    Table { level: usize, id: u64 },
    Missing,
}

impl std::fmt::Display for ReadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadSource::Memtable => write!(f, "memtable"),
            ReadSource::Table { level, id } => write!(f, "L{} SSTable {}", level, id),
            ReadSource::Missing => write!(f, "nowhere"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    WalAppended { id: u64, key: Key },
    MemtableUpdated { key: Key, tombstone: bool, size: usize },
    Flushed { table_id: u64, entries: usize },
    CompactionStarted { level: usize, tables: usize },
    CompactionFinished { from: usize, to: usize, table_id: Option<u64>, keys: usize },
    Read { key: Key, found: bool, source: ReadSource },
    LimitChanged { limit: usize },
    Cleared,
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::WalAppended { id, key } => write!(f, "WAL: entry {} ({})", id, key),
            EngineEvent::MemtableUpdated { key, tombstone, size } => {
                let op = if *tombstone { "DELETE" } else { "WRITE" };
                write!(f, "{}: {} -> memtable ({} entries)", op, key, size)
            }
            EngineEvent::Flushed { table_id, entries } => write!(
                f,
                "FLUSH: memtable -> L0 SSTable {} ({} entries)",
                table_id, entries
            ),
            EngineEvent::CompactionStarted { level, tables } => write!(
                f,
                "COMPACT: L{}->L{} merging {} files",
                level,
                level + 1,
                tables
            ),
            EngineEvent::CompactionFinished {
                from,
                to,
                table_id,
                keys,
            } => match table_id {
                Some(id) => write!(
                    f,
                    "COMPACT: L{}->L{} created SSTable {} with {} keys",
                    from, to, id, keys
                ),
                None => write!(f, "COMPACT: L{}->L{} produced no table", from, to),
            },
            EngineEvent::Read { key, found, source } => {
                if *found {
                    write!(f, "READ: {} found in {}", key, source)
                } else {
                    write!(f, "READ: {} not found (decided in {})", key, source)
                }
            }
            EngineEvent::LimitChanged { limit } => write!(f, "CONFIG: memtable limit {}", limit),
            EngineEvent::Cleared => write!(f, "CLEAR: all data cleared"),
        }
    }
}

/// Receives engine events as they happen.
pub trait EngineObserver: Send {
    fn on_event(&self, event: &EngineEvent);
}

/// Shared, bounded recorder of recent events.
///
/// Clones share the same buffer, so a host can keep one handle and
/// register another with the engine.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Arc<Mutex<VecDeque<EngineEvent>>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Copy of the retained events, oldest first.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<EngineEvent>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EngineObserver for EventLog {
    fn on_event(&self, event: &EngineEvent) {
        let mut events = self.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
