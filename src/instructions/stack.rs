//! Stack operations.
//!
//! PUSH/POP on BC, DE, HL and PSW, plus XTHL. PUSH PSW packs the
//! accumulator into the high byte and the flag byte (with its constant
//! bits) into the low byte.

use crate::{Cpu, MemoryBus};

/// PUSH rp - BC, DE or HL by bits 5-4 of the opcode.
pub(crate) fn execute_push<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let value = cpu.rp16(opcode >> 4);
    cpu.push(value);
    cpu.advance_pc(1);
}

/// POP rp - BC, DE or HL.
pub(crate) fn execute_pop<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let value = cpu.pop();
    cpu.set_rp16(opcode >> 4, value);
    cpu.advance_pc(1);
}

/// PUSH PSW - `(A << 8) | flag_byte`.
pub(crate) fn execute_push_psw<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let word = (u16::from(cpu.a) << 8) | u16::from(cpu.psw.to_byte());
    cpu.push(word);
    cpu.advance_pc(1);
}

/// POP PSW - restore the accumulator and flags.
pub(crate) fn execute_pop_psw<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let word = cpu.pop();
    cpu.psw.set_byte(word as u8);
    cpu.a = (word >> 8) as u8;
    cpu.advance_pc(1);
}

/// XTHL - exchange HL with the word at the top of the stack; SP unchanged.
pub(crate) fn execute_xthl<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let stacked = cpu.pop();
    let hl = cpu.hl();
    cpu.push(hl);
    cpu.set_hl(stacked);
    cpu.advance_pc(1);
}
