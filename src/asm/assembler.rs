//! Line-oriented assembler for AL1 programs.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LDA 10      ; Load from address 10
//! ADD 11
//! STA 12
//! HLT
//! ```
//!
//! Each line holds one mnemonic and, for everything but `HLT`, a decimal
//! address in 0-255. Mnemonics are case-sensitive. Anything after the
//! tokens an instruction needs is ignored, so `HLT 5` assembles to a bare
//! `HLT`.

use crate::isa::{InstructionSet, AL1};
use log::trace;
use thiserror::Error;

/// Assemble source code to a flat byte program using the standard
/// instruction set.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    Assembler::new(&AL1).assemble(source)
}

/// Translates assembly text through an instruction set.
///
/// Holds no state between calls, so one assembler can serve any number of
/// translations.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    isa: &'a InstructionSet,
}

impl<'a> Assembler<'a> {
    pub fn new(isa: &'a InstructionSet) -> Self {
        Self { isa }
    }

    /// Translate `source`, stopping at the first bad line.
    pub fn assemble(&self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        let mut output = Vec::new();

        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1, &mut output)?;
        }

        Ok(output)
    }

    fn process_line(&self, line: &str, line_num: usize, output: &mut Vec<u8>) -> Result<(), AssemblerError> {
        let mut tokens = line.split_whitespace();

        // Skip empty lines and comments
        let mnemonic = match tokens.next() {
            Some(token) if !token.starts_with(';') => token,
            _ => return Ok(()),
        };

        let opcode = self.isa.lookup(mnemonic).ok_or_else(|| AssemblerError::UnknownOpcode {
            line: line_num,
            token: mnemonic.to_string(),
        })?;

        output.push(opcode.byte());

        if opcode.operand_len() > 0 {
            let operand = parse_operand(tokens.next()).ok_or_else(|| AssemblerError::InvalidOperand {
                line: line_num,
                text: line.to_string(),
            })?;
            output.push(operand);
            trace!("line {}: {} {} -> {:#04x} {}", line_num, opcode, operand, opcode.byte(), operand);
        } else {
            trace!("line {}: {} -> {:#04x}", line_num, opcode, opcode.byte());
        }

        Ok(())
    }
}

/// Parse a decimal address. Rejects anything that does not fit in a byte.
fn parse_operand(token: Option<&str>) -> Option<u8> {
    token?.parse::<u8>().ok()
}

impl Default for Assembler<'static> {
    fn default() -> Self {
        Self::new(&AL1)
    }
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("unknown opcode on line {line}: {token}")]
    UnknownOpcode { line: usize, token: String },

    #[error("invalid address on line {line}: {text}")]
    InvalidOperand { line: usize, text: String },
}

impl AssemblerError {
    /// The 1-based source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::UnknownOpcode { line, .. } | AssemblerError::InvalidOperand { line, .. } => *line,
        }
    }
}
