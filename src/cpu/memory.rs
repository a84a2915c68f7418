//! AL1 memory subsystem.
//!
//! A flat array of 256 bytes. Addresses are absolute and there is no
//! memory-mapped I/O.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 256;

/// AL1 memory: 256 byte cells.
///
/// Serialized as a plain byte sequence; deserializing anything other than
/// exactly 256 bytes fails.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell by 8-bit address. Every `u8` is a valid address.
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    /// Write a cell by 8-bit address.
    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Read a cell by arbitrary index. Out-of-range reads yield 0.
    pub fn get(&self, index: usize) -> u8 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// Write a cell by arbitrary index. Out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, value: u8) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value;
        }
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy a program into memory starting at address 0.
    ///
    /// Bytes beyond the end of memory are dropped and cells past the end of
    /// the program keep their contents. Returns the number of bytes copied.
    pub fn load_program(&mut self, program: &[u8]) -> usize {
        let len = program.len().min(MEMORY_SIZE);
        self.cells[..len].copy_from_slice(&program[..len]);
        len
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> &[u8] {
        let start = start.min(MEMORY_SIZE);
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        &self.cells[start..end]
    }

    /// The whole memory as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<u8>> for Memory {
    type Error = MemoryError;

    fn try_from(cells: Vec<u8>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize {
                expected: MEMORY_SIZE,
                actual: cells.len(),
            });
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<u8> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

/// Errors that can occur building a memory from raw cells.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory must be {expected} bytes, got {actual}")]
    WrongSize { expected: usize, actual: usize },
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}
