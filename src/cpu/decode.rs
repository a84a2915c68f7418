//! Instruction decoder for the AL1.
//!
//! An instruction is one opcode byte, followed by one operand byte for
//! everything except `HLT`.

use crate::isa::{InstructionSet, Opcode};
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// Decoded AL1 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Halt execution
    Hlt,

    /// Load accumulator: A := [addr]
    Lda(u8),

    /// Store accumulator: [addr] := A
    Sta(u8),

    /// Add memory to accumulator: A := A + [addr]
    Add(u8),

    /// Subtract memory from accumulator: A := A - [addr]
    Sub(u8),

    /// Unconditional jump: C := target
    Jmp(u8),
}

impl Instruction {
    /// Build an instruction from an opcode and its operand.
    /// The operand is ignored for `HLT`.
    pub fn new(opcode: Opcode, operand: u8) -> Self {
        match opcode {
            Opcode::Hlt => Instruction::Hlt,
            Opcode::Lda => Instruction::Lda(operand),
            Opcode::Sta => Instruction::Sta(operand),
            Opcode::Add => Instruction::Add(operand),
            Opcode::Sub => Instruction::Sub(operand),
            Opcode::Jmp => Instruction::Jmp(operand),
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Hlt => Opcode::Hlt,
            Instruction::Lda(_) => Opcode::Lda,
            Instruction::Sta(_) => Opcode::Sta,
            Instruction::Add(_) => Opcode::Add,
            Instruction::Sub(_) => Opcode::Sub,
            Instruction::Jmp(_) => Opcode::Jmp,
        }
    }

    pub fn operand(&self) -> Option<u8> {
        match *self {
            Instruction::Hlt => None,
            Instruction::Lda(addr)
            | Instruction::Sta(addr)
            | Instruction::Add(addr)
            | Instruction::Sub(addr)
            | Instruction::Jmp(addr) => Some(addr),
        }
    }

    /// Encoded length in bytes.
    pub fn size(&self) -> usize {
        1 + self.opcode().operand_len()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(addr) => write!(f, "{} {}", self.opcode(), addr),
            None => write!(f, "{}", self.opcode()),
        }
    }
}

/// Encode an instruction to its byte form.
pub fn encode(instr: &Instruction) -> Vec<u8> {
    let mut bytes = vec![instr.opcode().byte()];
    bytes.extend(instr.operand());
    bytes
}

/// Decode the instruction starting at `addr` in `bytes`.
///
/// Returns the instruction and its encoded length.
pub fn decode(isa: &InstructionSet, bytes: &[u8], addr: usize) -> Result<(Instruction, usize), DecodeError> {
    let byte = *bytes.get(addr).ok_or(DecodeError::OutOfBounds(addr))?;
    let opcode = isa.decode(byte).ok_or(DecodeError::InvalidOpcode { addr, byte })?;

    if opcode.operand_len() == 0 {
        return Ok((Instruction::new(opcode, 0), 1));
    }

    let operand = *bytes
        .get(addr + 1)
        .ok_or(DecodeError::MissingOperand { addr, opcode })?;
    Ok((Instruction::new(opcode, operand), 2))
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("address {0} is past the end of the program")]
    OutOfBounds(usize),

    #[error("invalid opcode {byte:#04x} at address {addr}")]
    InvalidOpcode { addr: usize, byte: u8 },

    #[error("{opcode} at address {addr} is missing its operand")]
    MissingOperand { addr: usize, opcode: Opcode },
}
