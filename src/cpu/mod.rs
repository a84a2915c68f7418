//! CPU emulation for the AL1.
//!
//! This module implements the complete AL1 architecture:
//! - 256 byte memory cells with absolute 8-bit addressing
//! - 3 registers: A (accumulator), C (PC), I (instruction register)
//! - 6-instruction set with single-address architecture

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;
pub mod observer;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::Registers;
pub use decode::{Instruction, DecodeError};
pub use execute::{Cpu, CpuState, Snapshot};
pub use observer::{ConsoleObserver, Event, EventLog, Observer};
