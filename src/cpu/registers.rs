//! AL1 CPU registers.
//!
//! The AL1 has three 8-bit registers:
//! - A: accumulator (the only general-purpose register)
//! - C: program counter
//! - I: instruction register, holding the last fetched opcode

use serde::{Serialize, Deserialize};

/// The AL1 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: accumulator. Arithmetic wraps modulo 256.
    pub a: u8,

    /// C: program counter. Wraps modulo 256 on increment.
    pub c: u8,

    /// I: most recently fetched opcode (diagnostic only)
    pub i: u8,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.a = 0;
        self.c = 0;
        self.i = 0;
    }

    /// Increment the program counter by 1, wrapping at 256.
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> u8 {
        let old = self.c;
        self.c = self.c.wrapping_add(1);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u8) {
        self.c = addr;
    }
}
