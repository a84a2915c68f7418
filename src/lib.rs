//! # AL1 Emulator
//!
//! An emulator and assembler for the AL1, a minimal 8-bit accumulator
//! machine with 256 bytes of memory and six instructions.
//!
//! Programs are flat byte streams. The assembler turns text into those
//! bytes and the CPU executes them; the two share only the instruction set
//! in [`isa`].

pub mod isa;
pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use isa::{InstructionSet, Opcode, AL1};
pub use cpu::{Cpu, CpuState, Event, EventLog, Instruction, Memory, Observer, Registers, Snapshot};
pub use asm::{assemble, disassemble, load_image, save_image, AssemblerError, ImageError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
