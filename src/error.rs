//! LSMSIM - Custom Error Types
//! The engine operations themselves are total; errors only arise while
//! building an engine, encoding or decoding WAL frames, or exporting snapshots.

use thiserror::Error;

/// Custom Result type for the simulation engine.
pub type Result<T> = std::result::Result<T, LsmError>;

/// Error types for the simulation engine.
#[derive(Error, Debug)]
pub enum LsmError {
    /// Invalid engine configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A WAL frame failed its CRC check or was truncated.
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// A key or value is too long for the WAL frame's 32-bit length prefix.
    #[error("WAL frame too large: {0}")]
    FrameTooLarge(String),

    /// Snapshot serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for LsmError {
    fn from(err: bincode::Error) -> Self {
        LsmError::Serialization(err.to_string())
    }
}
