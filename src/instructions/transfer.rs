//! Data transfer instructions.
//!
//! MOV, MVI, LXI, LDA/STA, LHLD/SHLD, LDAX/STAX, XCHG, SPHL. None of these
//! modify flags.

use crate::{Cpu, MemoryBus};

/// MOV d,s - register to register, through HL for the M field.
///
/// The destination is bits 5-3 of the opcode, the source bits 2-0.
pub(crate) fn execute_mov<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let value = cpu.reg8(opcode);
    cpu.set_reg8(opcode >> 3, value);
    cpu.advance_pc(1);
}

/// MVI r,data - immediate byte into register or M.
pub(crate) fn execute_mvi<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let value = cpu.immediate_byte();
    cpu.set_reg8(opcode >> 3, value);
    cpu.advance_pc(2);
}

/// LXI rp,data16 - immediate word into a register pair.
pub(crate) fn execute_lxi<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let value = cpu.immediate_word();
    cpu.set_rp16(opcode >> 4, value);
    cpu.advance_pc(3);
}

/// LDA a16 - load the accumulator from a direct address.
pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let addr = cpu.immediate_word();
    cpu.a = cpu.memory.read(addr);
    cpu.advance_pc(3);
}

/// STA a16 - store the accumulator at a direct address.
pub(crate) fn execute_sta<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let addr = cpu.immediate_word();
    let a = cpu.a;
    cpu.memory.write(addr, a);
    cpu.advance_pc(3);
}

/// LHLD a16 - load HL from a direct address, little-endian.
pub(crate) fn execute_lhld<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let addr = cpu.immediate_word();
    let value = cpu.memory.read16(addr);
    cpu.set_hl(value);
    cpu.advance_pc(3);
}

/// SHLD a16 - store HL at a direct address, little-endian.
pub(crate) fn execute_shld<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let addr = cpu.immediate_word();
    let hl = cpu.hl();
    cpu.memory.write16(addr, hl);
    cpu.advance_pc(3);
}

/// LDAX rp - load the accumulator through BC or DE.
pub(crate) fn execute_ldax<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let addr = cpu.rp16(opcode >> 4);
    cpu.a = cpu.memory.read(addr);
    cpu.advance_pc(1);
}

/// STAX rp - store the accumulator through BC or DE.
pub(crate) fn execute_stax<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let addr = cpu.rp16(opcode >> 4);
    let a = cpu.a;
    cpu.memory.write(addr, a);
    cpu.advance_pc(1);
}

/// XCHG - swap DE and HL.
pub(crate) fn execute_xchg<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let de = cpu.de();
    let hl = cpu.hl();
    cpu.set_de(hl);
    cpu.set_hl(de);
    cpu.advance_pc(1);
}

/// SPHL - SP from HL.
pub(crate) fn execute_sphl<M: MemoryBus>(cpu: &mut Cpu<M>) {
    cpu.sp = cpu.hl();
    cpu.advance_pc(1);
}
