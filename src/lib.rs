//! LSMSIM - LSM-Tree Simulation Engine
//!
//! An in-memory model of a log-structured merge tree, built to explain how
//! writes, reads and compactions move data through the structure.
//!
//! ## Features
//! - **Write-Ahead Log (WAL)**: Bounded log with CRC32-checked binary frames
//! - **MemTable**: In-memory BTreeMap, flushed after a configurable entry count
//! - **SSTable**: Immutable sorted tables grouped into levels
//! - **Compaction**: Count-triggered, whole-level merges with last-writer-wins
//! - **Events**: Observer hooks describing each step for visualizers
//! - **Metrics**: Atomic operation counters
//!
//! ## Example
//! ```
//! use lsmsim::{config::Config, engine::Engine};
//!
//! let mut engine = Engine::new(Config::default().with_memtable_limit(3)).unwrap();
//!
//! engine.write("key", "value");
//! assert_eq!(engine.read("key").as_deref(), Some("value"));
//!
//! engine.delete("key");
//! assert_eq!(engine.read("key"), None);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod types;
