//! Formatting functions for disassembled instructions

use crate::disassembler::Instruction;
use crate::opcodes::Operand;

/// Format a single instruction as assembly text
///
/// Register fields are already part of the mnemonic; this appends the
/// immediate, address or port operand in `$hex` notation.
pub fn format_instruction(instr: &Instruction) -> String {
    // Register-form mnemonics ("MVI B") take their immediate after a comma;
    // bare mnemonics ("JMP", "ADI") after a space.
    let separator = if instr.mnemonic.contains(' ') { "," } else { " " };

    match instr.operand {
        Operand::None => instr.mnemonic.to_string(),
        Operand::Immediate => {
            if instr.operand_bytes.is_empty() {
                format!("{}{}#$??", instr.mnemonic, separator)
            } else {
                format!("{}{}#${:02X}", instr.mnemonic, separator, instr.operand_bytes[0])
            }
        }
        Operand::Port => {
            if instr.operand_bytes.is_empty() {
                format!("{} $??", instr.mnemonic)
            } else {
                format!("{} ${:02X}", instr.mnemonic, instr.operand_bytes[0])
            }
        }
        Operand::Immediate16 | Operand::Address => {
            if instr.operand_bytes.len() < 2 {
                format!("{}{}$????", instr.mnemonic, separator)
            } else {
                let word =
                    u16::from_le_bytes([instr.operand_bytes[0], instr.operand_bytes[1]]);
                format!("{}{}${:04X}", instr.mnemonic, separator, word)
            }
        }
    }
}
