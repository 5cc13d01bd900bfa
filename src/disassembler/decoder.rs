//! Instruction decoder for the 8080 disassembler

use crate::disassembler::Instruction;
use crate::opcodes::OPCODE_TABLE;

/// Decode a single instruction from a byte slice
///
/// # Arguments
///
/// * `bytes` - The byte slice starting at the instruction to decode
/// * `address` - The memory address of this instruction
///
/// # Returns
///
/// Some(Instruction) if the opcode decodes, None for absent patterns or a
/// slice too short to hold the full instruction
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<Instruction> {
    if bytes.is_empty() {
        return None;
    }

    let opcode = bytes[0];
    let metadata = &OPCODE_TABLE[opcode as usize];

    // Absent patterns carry the "???" mnemonic
    if metadata.mnemonic == "???" {
        return None;
    }

    if bytes.len() < metadata.size_bytes as usize {
        return None;
    }

    let operand_bytes: Vec<u8> = bytes[1..metadata.size_bytes as usize].to_vec();

    Some(Instruction {
        address,
        opcode,
        mnemonic: metadata.mnemonic,
        operand: metadata.operand,
        operand_bytes,
        size_bytes: metadata.size_bytes,
    })
}
