//! Byte-addressable non-volatile store abstraction.
//!
//! The config layer only needs three operations from the underlying medium:
//! read a byte, stage a byte, and durably commit staged writes. Register
//! access to the actual flash controller lives outside this workspace; an
//! in-memory implementation backs tests and the demo binary.

use crate::error::{StorageError, StorageResult};

/// A byte-addressable persistent store with explicit commit.
///
/// Writes may be staged; `commit` must make every prior write durable before
/// returning. Callers in the config layer treat a save as synchronous and
/// blocking: there is no batching or deferred commit.
pub trait NvStore {
    fn read(&self, addr: usize) -> StorageResult<u8>;
    fn write(&mut self, addr: usize, value: u8) -> StorageResult<()>;
    fn commit(&mut self) -> StorageResult<()>;
}

/// In-memory store mimicking erased flash (all cells `0xFF`).
///
/// Counts commits so tests can assert the save-then-commit contract.
#[derive(Debug, Clone)]
pub struct MemoryNvStore {
    cells: Vec<u8>,
    commits: u64,
}

/// Value of an erased flash cell.
pub const ERASED: u8 = 0xFF;

impl MemoryNvStore {
    /// Create a store of `capacity` erased cells.
    pub fn new(capacity: usize) -> Self {
        MemoryNvStore {
            cells: vec![ERASED; capacity],
            commits: 0,
        }
    }

    /// Store sized for the controller's field layout.
    pub fn sized_for_layout() -> Self {
        Self::new(crate::layout::REQUIRED_CAPACITY)
    }

    /// Number of commits performed so far.
    #[must_use]
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Direct cell access for test setup.
    pub fn fill(&mut self, addr: usize, bytes: &[u8]) {
        self.cells[addr..addr + bytes.len()].copy_from_slice(bytes);
    }
}

impl Default for MemoryNvStore {
    fn default() -> Self {
        Self::sized_for_layout()
    }
}

impl NvStore for MemoryNvStore {
    fn read(&self, addr: usize) -> StorageResult<u8> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(StorageError::AddressOutOfRange {
                addr,
                capacity: self.cells.len(),
            })
    }

    fn write(&mut self, addr: usize, value: u8) -> StorageResult<()> {
        let capacity = self.cells.len();
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or(StorageError::AddressOutOfRange { addr, capacity })?;
        *cell = value;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_erased() {
        let store = MemoryNvStore::new(8);
        for addr in 0..8 {
            assert_eq!(store.read(addr).unwrap(), ERASED);
        }
    }

    #[test]
    fn write_read_roundtrip() {
        let mut store = MemoryNvStore::new(8);
        store.write(3, 0x42).unwrap();
        assert_eq!(store.read(3).unwrap(), 0x42);
    }

    #[test]
    fn out_of_range_is_error() {
        let mut store = MemoryNvStore::new(4);
        assert!(matches!(
            store.read(4),
            Err(StorageError::AddressOutOfRange { addr: 4, .. })
        ));
        assert!(store.write(100, 0).is_err());
    }

    #[test]
    fn commits_are_counted() {
        let mut store = MemoryNvStore::new(4);
        assert_eq!(store.commit_count(), 0);
        store.commit().unwrap();
        store.commit().unwrap();
        assert_eq!(store.commit_count(), 2);
    }
}
