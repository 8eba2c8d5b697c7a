//! LSMSIM - Write-Ahead Log (WAL)
//! Every mutation is logged here before it is applied to the MemTable.
//! The log is bounded: once `capacity` records are retained the oldest
//! one is evicted, which stands in for periodic truncation.

use std::collections::VecDeque;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{LsmError, Result};
use crate::types::{Key, Timestamp, Value};

/// Operation type for WAL records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WalOp {
    Write = 1,
    Delete = 2,
}

impl WalOp {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            1 => Ok(WalOp::Write),
            2 => Ok(WalOp::Delete),
            other => Err(LsmError::Corruption(format!("unknown WAL op type {}", other))),
        }
    }
}

impl std::fmt::Display for WalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalOp::Write => write!(f, "WRITE"),
            WalOp::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single logged mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalRecord {
    pub id: u64,
    pub key: Key,
    pub value: Option<Value>,
    pub timestamp: Timestamp,
    pub operation: WalOp,
}

/// Fixed part of a frame: op + id + timestamp + key_len + val_len + crc.
const FRAME_OVERHEAD: usize = 1 + 8 + 8 + 4 + 4 + 4;

impl WalRecord {
    /// Encode the record into its binary frame.
    ///
    /// ## Binary Format
    /// ```text
    /// [op: 1][id: 8 LE][timestamp: 8 LE][key_len: 4 LE][key][val_len: 4 LE][value][crc: 4 LE]
    /// ```
    /// Tombstones are written with `val_len = 0`. Keys and values longer
    /// than `u32::MAX` bytes cannot be framed.
    pub fn encode(&self) -> Result<Bytes> {
        let value = self.value.as_deref().unwrap_or("");
        let key_len = length_prefix(self.key.len(), "key")?;
        let value_len = length_prefix(value.len(), "value")?;

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(self.operation as u8);
        buf.put_u64_le(self.id);
        buf.put_u64_le(self.timestamp);
        buf.put_u32_le(key_len);
        buf.put_slice(self.key.as_bytes());
        buf.put_u32_le(value_len);
        buf.put_slice(value.as_bytes());
        let crc = crc32fast::hash(&buf);
        buf.put_u32_le(crc);
        Ok(buf.freeze())
    }

    /// Size of the frame [`WalRecord::encode`] produces, without building it.
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.key.len() + self.value.as_deref().map_or(0, str::len)
    }

    /// Decode a frame produced by [`WalRecord::encode`], verifying its CRC.
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < FRAME_OVERHEAD {
            return Err(LsmError::Corruption(format!(
                "WAL frame too short: {} bytes",
                frame.len()
            )));
        }
        let (body, mut crc_bytes) = frame.split_at(frame.len() - 4);
        let expected = crc_bytes.get_u32_le();
        let actual = crc32fast::hash(body);
        if expected != actual {
            return Err(LsmError::Corruption(format!(
                "WAL CRC mismatch: expected {:08x}, got {:08x}",
                expected, actual
            )));
        }

        let mut buf = body;
        let operation = WalOp::from_byte(buf.get_u8())?;
        let id = buf.get_u64_le();
        let timestamp = buf.get_u64_le();
        let key = read_string(&mut buf, "key")?;
        let value = read_string(&mut buf, "value")?;
        if buf.has_remaining() {
            return Err(LsmError::Corruption(format!(
                "{} trailing bytes in WAL frame",
                buf.remaining()
            )));
        }

        let value = match operation {
            WalOp::Write => Some(value),
            WalOp::Delete => None,
        };
        Ok(Self {
            id,
            key,
            value,
            timestamp,
            operation,
        })
    }
}

impl std::fmt::Display for WalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(v) => write!(f, "[{}] {}: {}={}", self.id, self.operation, self.key, v),
            None => write!(f, "[{}] {}: {}", self.id, self.operation, self.key),
        }
    }
}

fn length_prefix(len: usize, field: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        LsmError::FrameTooLarge(format!("{} of {} bytes exceeds u32::MAX", field, len))
    })
}

fn read_string(buf: &mut &[u8], field: &str) -> Result<String> {
    if buf.remaining() < 4 {
        return Err(LsmError::Corruption(format!("truncated {} length", field)));
    }
    let len = buf.get_u32_le() as usize;
    if buf.remaining() < len {
        return Err(LsmError::Corruption(format!(
            "truncated {}: need {} bytes, have {}",
            field,
            len,
            buf.remaining()
        )));
    }
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|e| LsmError::Corruption(format!("{} is not UTF-8: {}", field, e)))
}

/// Bounded, append-only log of mutations.
#[derive(Debug)]
pub struct WriteAheadLog {
    records: VecDeque<WalRecord>,
    capacity: usize,
    /// Id of the last record appended.
    last_id: u64,
}

impl WriteAheadLog {
    /// Create an empty WAL retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            last_id: 0,
        }
    }

    /// Log a mutation and return the appended record.
    pub fn append(
        &mut self,
        operation: WalOp,
        key: &str,
        value: Option<&str>,
        timestamp: Timestamp,
    ) -> &WalRecord {
        self.last_id += 1;
        let record = WalRecord {
            id: self.last_id,
            key: key.to_owned(),
            value: value.map(str::to_owned),
            timestamp,
            operation,
        };

        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        log::debug!("WAL: entry {} written", self.last_id);
        &self.records[self.records.len() - 1]
    }

    /// Returns up to `n` of the most recent records, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&WalRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).collect()
    }

    /// All retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &WalRecord> {
        self.records.iter()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Drop every record and restart ids from 1.
    pub fn reset(&mut self) {
        self.records.clear();
        self.last_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(op: WalOp, value: Option<&str>) -> WalRecord {
        WalRecord {
            id: 7,
            key: "user:1".into(),
            value: value.map(Into::into),
            timestamp: 42,
            operation: op,
        }
    }

    #[test]
    fn test_frame_decodes_to_same_record() {
        let put = record(WalOp::Write, Some("alice"));
        assert_eq!(WalRecord::decode(&put.encode().unwrap()).unwrap(), put);

        let del = record(WalOp::Delete, None);
        assert_eq!(WalRecord::decode(&del.encode().unwrap()).unwrap(), del);
    }

    #[test]
    fn test_crc_mismatch_detected() {
        let mut frame = record(WalOp::Write, Some("alice")).encode().unwrap().to_vec();
        frame[10] ^= 0xFF;
        let err = WalRecord::decode(&frame).unwrap_err();
        assert!(matches!(err, LsmError::Corruption(ref m) if m.contains("CRC")));
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let frame = record(WalOp::Write, Some("alice")).encode().unwrap();
        assert!(WalRecord::decode(&frame[..10]).is_err());
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let mut wal = WriteAheadLog::new(10);
        wal.append(WalOp::Write, "a", Some("1"), 1);
        wal.append(WalOp::Delete, "a", None, 2);
        let ids: Vec<u64> = wal.records().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_encoded_len_matches_frame() {
        let put = record(WalOp::Write, Some("alice"));
        assert_eq!(put.encoded_len(), put.encode().unwrap().len());

        let del = record(WalOp::Delete, None);
        assert_eq!(del.encoded_len(), del.encode().unwrap().len());
        assert_eq!(del.encoded_len(), FRAME_OVERHEAD + "user:1".len());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_oversized_length_rejected() {
        assert_eq!(length_prefix(u32::MAX as usize, "key").unwrap(), u32::MAX);
        let err = length_prefix(u32::MAX as usize + 1, "value").unwrap_err();
        assert!(matches!(err, LsmError::FrameTooLarge(ref m) if m.contains("value")));
    }

    #[test]
    fn test_oldest_evicted_past_capacity() {
        let mut wal = WriteAheadLog::new(3);
        for i in 0..5 {
            wal.append(WalOp::Write, &format!("k{}", i), Some("v"), i);
        }
        assert_eq!(wal.len(), 3);
        assert_eq!(wal.records().next().unwrap().id, 3);
        assert_eq!(wal.last_id(), 5);
    }

    #[test]
    fn test_tail() {
        let mut wal = WriteAheadLog::new(20);
        for i in 0..12 {
            wal.append(WalOp::Write, &format!("k{}", i), Some("v"), i);
        }
        let tail = wal.tail(10);
        assert_eq!(tail.len(), 10);
        assert_eq!(tail[0].id, 3);
        assert_eq!(tail[9].id, 12);
        assert_eq!(wal.tail(100).len(), 12);
    }

    #[test]
    fn test_reset() {
        let mut wal = WriteAheadLog::new(5);
        wal.append(WalOp::Write, "a", Some("1"), 1);
        wal.reset();
        assert!(wal.is_empty());
        assert_eq!(wal.append(WalOp::Write, "b", Some("2"), 1).id, 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            record(WalOp::Write, Some("alice")).to_string(),
            "[7] WRITE: user:1=alice"
        );
        assert_eq!(record(WalOp::Delete, None).to_string(), "[7] DELETE: user:1");
    }
}
