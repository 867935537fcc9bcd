//! The data-block transport contract the sync layer depends on.
//!
//! Establishing the connection, authentication, and vendor protocol framing
//! are outside this crate; the sync passes only ever see these two calls.

use std::collections::HashMap;

/// Transport-level failures. Any of these aborts the current sync pass.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("not connected to controller")]
    Disconnected,
}

/// Read/write access to controller data blocks.
pub trait BlockTransport: Send {
    /// Read `len` bytes from data block `db` starting at `offset`.
    fn read_block(&mut self, db: u16, offset: u32, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Write `data` into data block `db` starting at `offset`.
    fn write_block(&mut self, db: u16, offset: u32, data: &[u8]) -> Result<(), TransportError>;
}

/// In-memory controller for tests and headless demos: a handful of fixed-size
/// data blocks plus call counters and a fail switch.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MemoryPlc {
    blocks: HashMap<u16, Vec<u8>>,
    /// Completed `read_block` calls.
    pub reads: u64,
    /// Completed `write_block` calls.
    pub writes: u64,
    /// When set, every call fails with [`TransportError::Disconnected`].
    pub fail: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryPlc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zero-filled data block of `size` bytes.
    pub fn with_block(mut self, db: u16, size: usize) -> Self {
        self.blocks.insert(db, vec![0; size]);
        self
    }

    pub fn block(&self, db: u16) -> Option<&[u8]> {
        self.blocks.get(&db).map(|b| b.as_slice())
    }

    pub fn block_mut(&mut self, db: u16) -> Option<&mut Vec<u8>> {
        self.blocks.get_mut(&db)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl BlockTransport for MemoryPlc {
    fn read_block(&mut self, db: u16, offset: u32, len: usize) -> Result<Vec<u8>, TransportError> {
        if self.fail {
            return Err(TransportError::Disconnected);
        }
        let block = self
            .blocks
            .get(&db)
            .ok_or_else(|| TransportError::Protocol(format!("no such data block: DB{db}")))?;
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|&e| e <= block.len())
            .ok_or_else(|| {
                TransportError::Protocol(format!("read beyond end of DB{db}: {offset}+{len}"))
            })?;
        self.reads += 1;
        Ok(block[start..end].to_vec())
    }

    fn write_block(&mut self, db: u16, offset: u32, data: &[u8]) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Disconnected);
        }
        let block = self
            .blocks
            .get_mut(&db)
            .ok_or_else(|| TransportError::Protocol(format!("no such data block: DB{db}")))?;
        let start = offset as usize;
        let end = start
            .checked_add(data.len())
            .filter(|&e| e <= block.len())
            .ok_or_else(|| {
                TransportError::Protocol(format!(
                    "write beyond end of DB{db}: {offset}+{}",
                    data.len()
                ))
            })?;
        block[start..end].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}
