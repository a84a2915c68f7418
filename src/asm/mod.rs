//! Assembler and disassembler for AL1 programs.
//!
//! This module provides:
//! - A single-pass assembler (text → flat binary)
//! - A disassembler (binary → readable text)
//! - Binary image file I/O

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, Assembler, AssemblerError};
pub use disasm::disassemble;
pub use image::{binary_path_for, load_image, load_source, save_image, ImageError};
