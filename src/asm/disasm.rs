//! Disassembler for AL1 programs.
//!
//! Converts flat byte programs back to readable assembly.

use crate::cpu::decode::{decode, DecodeError};
use crate::isa::AL1;

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of bytes it covers. Bytes that are not
/// opcodes are shown as `DB` data and cover one byte.
pub fn disassemble_instruction(bytes: &[u8], addr: usize) -> (String, usize) {
    match decode(&AL1, bytes, addr) {
        Ok((instr, size)) => (instr.to_string(), size),
        Err(DecodeError::MissingOperand { opcode, .. }) => (format!("{} ?", opcode), 1),
        Err(DecodeError::InvalidOpcode { byte, .. }) => (format!("DB {:#04x}", byte), 1),
        Err(DecodeError::OutOfBounds(_)) => (String::new(), 0),
    }
}

/// Disassemble a whole program.
///
/// One line per instruction, prefixed with its address. Stripping the
/// prefix from a well-formed program yields source that assembles back to
/// the same bytes.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; AL1 Disassembly\n");
    output.push_str("; ---------------\n");

    let mut addr = 0;
    while addr < bytes.len() {
        let (text, size) = disassemble_instruction(bytes, addr);
        output.push_str(&format!("{:03}: {}\n", addr, text));
        addr += size.max(1);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;

    #[test]
    fn test_disassemble_instruction() {
        let bytes = [0x01, 10, 0x00, 0x09, 0x02];
        assert_eq!(disassemble_instruction(&bytes, 0), ("LDA 10".to_string(), 2));
        assert_eq!(disassemble_instruction(&bytes, 2), ("HLT".to_string(), 1));
        assert_eq!(disassemble_instruction(&bytes, 3), ("DB 0x09".to_string(), 1));
        assert_eq!(disassemble_instruction(&bytes, 4), ("STA ?".to_string(), 1));
        assert_eq!(disassemble_instruction(&bytes, 5), (String::new(), 0));
    }

    #[test]
    fn test_listing_reassembles() {
        let source = "LDA 10\nADD 11\nSTA 12\nJMP 0\nHLT";
        let bytes = assemble(source).unwrap();

        let listing = disassemble(&bytes);
        let stripped: Vec<&str> = listing
            .lines()
            .filter(|line| !line.starts_with(';'))
            .map(|line| &line[5..])
            .collect();

        assert_eq!(stripped.join("\n"), source);
        assert!(listing.contains("006: JMP 0"));
    }
}
