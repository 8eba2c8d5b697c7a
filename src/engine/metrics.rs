//! LSMSIM - Engine Metrics & Observability
//! Operation counters kept in `AtomicU64`s so the read path can count
//! lookups through a shared reference.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic operation counters for the simulation engine.
///
/// All counters use `Ordering::Relaxed`; they are only read for display.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Accepted mutations, deletes included.
    pub writes: AtomicU64,
    /// Total number of `read` calls.
    pub reads: AtomicU64,
    /// Tombstones written.
    pub deletes: AtomicU64,
    /// Level-to-level compactions performed.
    pub compactions: AtomicU64,
    /// MemTable -> L0 flushes performed.
    pub flushes: AtomicU64,
    /// WAL records appended (including ones since evicted).
    pub wal_entries: AtomicU64,
    /// Encoded frame bytes appended to the WAL.
    pub wal_bytes: AtomicU64,
}

/// Plain copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub writes: u64,
    pub reads: u64,
    pub deletes: u64,
    pub compactions: u64,
    pub flushes: u64,
    pub wal_entries: u64,
    pub wal_bytes: u64,
}

impl EngineMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// A delete counts as a write as well.
    pub fn record_delete(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compaction(&self) {
        self.compactions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wal_entry(&self, frame_len: usize) {
        self.wal_entries.fetch_add(1, Ordering::Relaxed);
        self.wal_bytes.fetch_add(frame_len as u64, Ordering::Relaxed);
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.writes,
            &self.reads,
            &self.deletes,
            &self.compactions,
            &self.flushes,
            &self.wal_entries,
            &self.wal_bytes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Stats {
        Stats {
            writes: self.writes.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            compactions: self.compactions.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            wal_entries: self.wal_entries.load(Ordering::Relaxed),
            wal_bytes: self.wal_bytes.load(Ordering::Relaxed),
        }
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        let stats = self.snapshot();
        format!(
            "\n═══ LSMSIM Engine Metrics ═══\n\
             Operations:\n\
               writes:      {}\n\
               deletes:     {}\n\
               reads:       {}\n\
             Background:\n\
               flushes:     {}\n\
               compactions: {}\n\
             WAL:\n\
               entries:     {}\n\
               bytes:       {}",
            stats.writes,
            stats.deletes,
            stats.reads,
            stats.flushes,
            stats.compactions,
            stats.wal_entries,
            stats.wal_bytes,
        )
    }
}
