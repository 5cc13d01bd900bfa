//! Accumulator arithmetic and logic.
//!
//! The register forms (ADD/ADC/SUB/SBB/ANA/XRA/ORA/CMP) take their operand
//! from bits 2-0 of the opcode; the immediate forms take the byte after the
//! opcode. Both share the same flag rules:
//!
//! - Z/S/P always come from the 8-bit result
//! - carry comes from the 9-bit intermediate (or the borrow comparison)
//! - aux-carry is the nibble carry: `((a & 0xF) + (r & 0xF) + cy) > 0xF`
//!   for adds, `(a & 0xF) < ((r & 0xF) + cy)` for subtracts
//! - AND sets aux-carry to `((a | r) & 0x08) != 0`; OR and XOR clear it
//! - the logic group always clears carry

use crate::{Cpu, MemoryBus};

fn add_to_accumulator<M: MemoryBus>(cpu: &mut Cpu<M>, operand: u8, carry_in: u8) {
    let a = cpu.a;
    let sum = u16::from(a) + u16::from(operand) + u16::from(carry_in);
    cpu.a = sum as u8;
    cpu.psw.set_zsp(cpu.a);
    cpu.psw
        .set_aux_carry((a & 0x0F) + (operand & 0x0F) + carry_in > 0x0F);
    cpu.psw.set_carry(sum > 0xFF);
}

/// Shared subtract core; CMP uses it with `store` false.
fn sub_from_accumulator<M: MemoryBus>(cpu: &mut Cpu<M>, operand: u8, borrow_in: u8, store: bool) {
    let a = cpu.a;
    let result = a.wrapping_sub(operand).wrapping_sub(borrow_in);
    if store {
        cpu.a = result;
    }
    cpu.psw.set_zsp(result);
    cpu.psw
        .set_aux_carry(u16::from(a & 0x0F) < u16::from(operand & 0x0F) + u16::from(borrow_in));
    cpu.psw
        .set_carry(u16::from(a) < u16::from(operand) + u16::from(borrow_in));
}

fn and_accumulator<M: MemoryBus>(cpu: &mut Cpu<M>, operand: u8) {
    let a = cpu.a;
    cpu.a &= operand;
    cpu.psw.set_zsp(cpu.a);
    cpu.psw.set_aux_carry((a | operand) & 0x08 != 0);
    cpu.psw.set_carry(false);
}

fn xor_accumulator<M: MemoryBus>(cpu: &mut Cpu<M>, operand: u8) {
    cpu.a ^= operand;
    cpu.psw.set_zsp(cpu.a);
    cpu.psw.set_aux_carry(false);
    cpu.psw.set_carry(false);
}

fn or_accumulator<M: MemoryBus>(cpu: &mut Cpu<M>, operand: u8) {
    cpu.a |= operand;
    cpu.psw.set_zsp(cpu.a);
    cpu.psw.set_aux_carry(false);
    cpu.psw.set_carry(false);
}

pub(crate) fn execute_add<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    add_to_accumulator(cpu, operand, 0);
    cpu.advance_pc(1);
}

pub(crate) fn execute_adc<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    let carry = u8::from(cpu.psw.carry());
    add_to_accumulator(cpu, operand, carry);
    cpu.advance_pc(1);
}

pub(crate) fn execute_sub<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    sub_from_accumulator(cpu, operand, 0, true);
    cpu.advance_pc(1);
}

pub(crate) fn execute_sbb<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    let borrow = u8::from(cpu.psw.carry());
    sub_from_accumulator(cpu, operand, borrow, true);
    cpu.advance_pc(1);
}

pub(crate) fn execute_ana<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    and_accumulator(cpu, operand);
    cpu.advance_pc(1);
}

pub(crate) fn execute_xra<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    xor_accumulator(cpu, operand);
    cpu.advance_pc(1);
}

pub(crate) fn execute_ora<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    or_accumulator(cpu, operand);
    cpu.advance_pc(1);
}

/// CMP r - subtract without storing; flags only.
pub(crate) fn execute_cmp<M: MemoryBus>(cpu: &mut Cpu<M>, opcode: u8) {
    let operand = cpu.reg8(opcode);
    sub_from_accumulator(cpu, operand, 0, false);
    cpu.advance_pc(1);
}

pub(crate) fn execute_adi<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    add_to_accumulator(cpu, operand, 0);
    cpu.advance_pc(2);
}

pub(crate) fn execute_aci<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    let carry = u8::from(cpu.psw.carry());
    add_to_accumulator(cpu, operand, carry);
    cpu.advance_pc(2);
}

pub(crate) fn execute_sui<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    sub_from_accumulator(cpu, operand, 0, true);
    cpu.advance_pc(2);
}

pub(crate) fn execute_sbi<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    let borrow = u8::from(cpu.psw.carry());
    sub_from_accumulator(cpu, operand, borrow, true);
    cpu.advance_pc(2);
}

pub(crate) fn execute_ani<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    and_accumulator(cpu, operand);
    cpu.advance_pc(2);
}

pub(crate) fn execute_xri<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    xor_accumulator(cpu, operand);
    cpu.advance_pc(2);
}

pub(crate) fn execute_ori<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    or_accumulator(cpu, operand);
    cpu.advance_pc(2);
}

pub(crate) fn execute_cpi<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let operand = cpu.immediate_byte();
    sub_from_accumulator(cpu, operand, 0, false);
    cpu.advance_pc(2);
}

/// DAA - decimal adjust the accumulator.
///
/// The two adjustment steps are sequential: the high-nibble test sees the
/// accumulator after any low-nibble correction. Neither step clears its
/// flag when the condition fails.
pub(crate) fn execute_daa<M: MemoryBus>(cpu: &mut Cpu<M>) {
    if cpu.psw.aux_carry() || (cpu.a & 0x0F) > 9 {
        cpu.a = cpu.a.wrapping_add(6);
        cpu.psw.set_aux_carry(true);
    }
    let high = cpu.a >> 4;
    if cpu.psw.carry() || high > 9 || (high >= 9 && (cpu.a & 0x0F) > 9) {
        cpu.a = cpu.a.wrapping_add(0x60);
        cpu.psw.set_carry(true);
    }
    let a = cpu.a;
    cpu.psw.set_zsp(a);
    cpu.advance_pc(1);
}

/// CMA - complement the accumulator; no flags.
pub(crate) fn execute_cma<M: MemoryBus>(cpu: &mut Cpu<M>) {
    cpu.a = !cpu.a;
    cpu.advance_pc(1);
}

/// STC - set carry.
pub(crate) fn execute_stc<M: MemoryBus>(cpu: &mut Cpu<M>) {
    cpu.psw.set_carry(true);
    cpu.advance_pc(1);
}

/// CMC - complement carry.
pub(crate) fn execute_cmc<M: MemoryBus>(cpu: &mut Cpu<M>) {
    let carry = cpu.psw.carry();
    cpu.psw.set_carry(!carry);
    cpu.advance_pc(1);
}
