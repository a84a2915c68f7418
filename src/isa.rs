//! The AL1 instruction set.
//!
//! Six one-byte opcodes. Every opcode except `HLT` is followed by a single
//! operand byte holding an absolute memory address.

use serde::{Serialize, Deserialize};
use std::fmt;

/// An AL1 opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Stop the processor.
    Hlt = 0x00,
    /// Load accumulator: A := [addr]
    Lda = 0x01,
    /// Store accumulator: [addr] := A
    Sta = 0x02,
    /// Add: A := A + [addr] (mod 256)
    Add = 0x03,
    /// Subtract: A := A - [addr] (mod 256)
    Sub = 0x04,
    /// Jump: C := addr
    Jmp = 0x05,
}

impl Opcode {
    /// The encoded byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// The assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Lda => "LDA",
            Opcode::Sta => "STA",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Jmp => "JMP",
        }
    }

    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> usize {
        match self {
            Opcode::Hlt => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A mnemonic/opcode table shared by the processor, assembler and
/// disassembler.
#[derive(Debug)]
pub struct InstructionSet {
    opcodes: &'static [Opcode],
}

/// The standard AL1 table.
pub static AL1: InstructionSet = InstructionSet {
    opcodes: &[
        Opcode::Hlt,
        Opcode::Lda,
        Opcode::Sta,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Jmp,
    ],
};

impl InstructionSet {
    /// The standard table.
    pub fn standard() -> &'static InstructionSet {
        &AL1
    }

    /// Find an opcode by mnemonic. Matching is case-sensitive.
    pub fn lookup(&self, mnemonic: &str) -> Option<Opcode> {
        self.opcodes.iter().copied().find(|op| op.mnemonic() == mnemonic)
    }

    /// Find an opcode by its encoded byte.
    pub fn decode(&self, byte: u8) -> Option<Opcode> {
        self.opcodes.iter().copied().find(|op| op.byte() == byte)
    }

    /// All opcodes in encoding order.
    pub fn opcodes(&self) -> &'static [Opcode] {
        self.opcodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_opcodes_are_unique() {
        let bytes: HashSet<u8> = AL1.opcodes().iter().map(|op| op.byte()).collect();
        let names: HashSet<&str> = AL1.opcodes().iter().map(|op| op.mnemonic()).collect();
        assert_eq!(bytes.len(), AL1.opcodes().len());
        assert_eq!(names.len(), AL1.opcodes().len());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(AL1.lookup("LDA"), Some(Opcode::Lda));
        assert_eq!(AL1.lookup("lda"), None);
        assert_eq!(AL1.lookup("XYZ"), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(AL1.decode(0x00), Some(Opcode::Hlt));
        assert_eq!(AL1.decode(0x05), Some(Opcode::Jmp));
        assert_eq!(AL1.decode(0x06), None);
        assert_eq!(AL1.decode(0xFF), None);
    }

    #[test]
    fn test_operand_arity() {
        for op in AL1.opcodes() {
            let expected = if *op == Opcode::Hlt { 0 } else { 1 };
            assert_eq!(op.operand_len(), expected, "{}", op);
        }
    }
}
