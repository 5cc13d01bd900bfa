//! # CPU State and Execution
//!
//! The `Cpu` struct holds the 8080 processor state and drives the
//! fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! - **Registers**: accumulator (A) and the six general registers B, C, D,
//!   E, H, L; the pseudo-register M is `memory[HL]`
//! - **Word registers**: program counter (PC) and stack pointer (SP)
//! - **PSW**: five condition flags packed with the 8080's constant bits
//! - **Interrupt state**: interrupts-enabled and halted booleans
//! - **Single-step counter**: armed by `OUT 0x0C`, traps via RST 7
//!
//! ## Execution Model
//!
//! `step(ports)` executes exactly one instruction. The caller owns pacing,
//! interrupt polling and HALT sleeping; devices are reached through the
//! `PortBus` passed in, memory through the bus the CPU owns.
//!
//! Power-on state: PC = 0, SP = 0, flags clear, interrupts disabled, not
//! halted. `reset()` forces PC back to 0 and nothing else, matching the
//! Poly-88 front-panel reset.

use crate::disassembler::{decoder::decode_instruction, formatter::format_instruction};
use crate::instructions::{alu, control, inc_dec, io, rotate, stack, transfer};
use crate::trace::{TraceAction, TraceRule};
use crate::{ExecutionError, MemoryBus, PortBus, Psw};

/// The output port that arms the single-step trap instead of reaching the
/// device bus.
pub const SINGLE_STEP_PORT: u8 = 0x0C;

/// Snapshot of the register file for observers on another thread.
///
/// Snapshots are taken between instructions, but a UI polling a running
/// machine must tolerate values from different instruction boundaries
/// across successive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,
    pub pc: u16,
    pub psw: u8,
    pub halted: bool,
    pub interrupts_enabled: bool,
}

/// Intel 8080 CPU state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait.
///
/// # Examples
///
/// ```
/// use lib8080::{Cpu, FlatMemory, MemoryBus, NullPorts};
///
/// let mut memory = FlatMemory::new();
/// memory.load(0x0000, &[0x01, 0x34, 0x12]); // LXI B,$1234
///
/// let mut cpu = Cpu::new(memory);
/// cpu.step(&mut NullPorts).unwrap();
/// assert_eq!(cpu.bc(), 0x1234);
/// ```
pub struct Cpu<M: MemoryBus> {
    pub(crate) a: u8,
    pub(crate) b: u8,
    pub(crate) c: u8,
    pub(crate) d: u8,
    pub(crate) e: u8,
    pub(crate) h: u8,
    pub(crate) l: u8,
    pub(crate) sp: u16,
    pub(crate) pc: u16,
    pub(crate) psw: Psw,

    halted: bool,
    interrupts_enabled: bool,

    /// Instructions remaining until the single-step RST 7 fires; 0 = idle.
    single_step_counter: u8,
    /// Set by `OUT 0x0C` so the arming instruction itself is not counted.
    pub(crate) single_step_armed: bool,

    traces: Vec<TraceRule>,

    pub(crate) memory: M,
}

impl<M: MemoryBus> Cpu<M> {
    /// Creates a new CPU in 8080 power-on state, owning the given memory.
    pub fn new(memory: M) -> Self {
        Self {
            a: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            psw: Psw::new(),
            halted: false,
            interrupts_enabled: false,
            single_step_counter: 0,
            single_step_armed: false,
            traces: Vec::new(),
            memory,
        }
    }

    /// Executes one instruction.
    ///
    /// Trace rules run first, then fetch/decode/execute against the owned
    /// memory and the supplied port bus. On completion the single-step
    /// counter is serviced; when it reaches zero the CPU injects vector 7
    /// exactly as a hardware RST 7 would.
    ///
    /// # Errors
    ///
    /// `ExecutionError::BadInstruction` for the five byte patterns the 8080
    /// does not decode (`0xCB`, `0xD9`, `0xDD`, `0xED`, `0xFD`). PC has
    /// been advanced past the byte when this is returned.
    pub fn step(&mut self, ports: &mut dyn PortBus) -> Result<(), ExecutionError> {
        self.run_traces();

        let opcode = self.memory.read(self.pc);
        match opcode {
            0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => control::execute_nop(self),
            0x01 | 0x11 | 0x21 | 0x31 => transfer::execute_lxi(self, opcode),
            0x02 | 0x12 => transfer::execute_stax(self, opcode),
            0x03 | 0x13 | 0x23 | 0x33 => inc_dec::execute_inx(self, opcode),
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                inc_dec::execute_inr(self, opcode)
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                inc_dec::execute_dcr(self, opcode)
            }
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                transfer::execute_mvi(self, opcode)
            }
            0x07 => rotate::execute_rlc(self),
            0x09 | 0x19 | 0x29 | 0x39 => inc_dec::execute_dad(self, opcode),
            0x0A | 0x1A => transfer::execute_ldax(self, opcode),
            0x0B | 0x1B | 0x2B | 0x3B => inc_dec::execute_dcx(self, opcode),
            0x0F => rotate::execute_rrc(self),
            0x17 => rotate::execute_ral(self),
            0x1F => rotate::execute_rar(self),
            0x22 => transfer::execute_shld(self),
            0x27 => alu::execute_daa(self),
            0x2A => transfer::execute_lhld(self),
            0x2F => alu::execute_cma(self),
            0x32 => transfer::execute_sta(self),
            0x37 => alu::execute_stc(self),
            0x3A => transfer::execute_lda(self),
            0x3F => alu::execute_cmc(self),
            0x76 => control::execute_hlt(self),
            0x40..=0x7F => transfer::execute_mov(self, opcode),
            0x80..=0x87 => alu::execute_add(self, opcode),
            0x88..=0x8F => alu::execute_adc(self, opcode),
            0x90..=0x97 => alu::execute_sub(self, opcode),
            0x98..=0x9F => alu::execute_sbb(self, opcode),
            0xA0..=0xA7 => alu::execute_ana(self, opcode),
            0xA8..=0xAF => alu::execute_xra(self, opcode),
            0xB0..=0xB7 => alu::execute_ora(self, opcode),
            0xB8..=0xBF => alu::execute_cmp(self, opcode),
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                control::execute_conditional_return(self, opcode)
            }
            0xC1 | 0xD1 | 0xE1 => stack::execute_pop(self, opcode),
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                control::execute_conditional_jump(self, opcode)
            }
            0xC3 => control::execute_jmp(self),
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                control::execute_conditional_call(self, opcode)
            }
            0xC5 | 0xD5 | 0xE5 => stack::execute_push(self, opcode),
            0xC6 => alu::execute_adi(self),
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                control::execute_rst(self, opcode)
            }
            0xC9 => control::execute_ret(self),
            0xCD => control::execute_call(self),
            0xCE => alu::execute_aci(self),
            0xD3 => io::execute_out(self, ports),
            0xD6 => alu::execute_sui(self),
            0xDB => io::execute_in(self, ports),
            0xDE => alu::execute_sbi(self),
            0xE3 => stack::execute_xthl(self),
            0xE6 => alu::execute_ani(self),
            0xE9 => control::execute_pchl(self),
            0xEB => transfer::execute_xchg(self),
            0xEE => alu::execute_xri(self),
            0xF1 => stack::execute_pop_psw(self),
            0xF3 => control::execute_di(self),
            0xF5 => stack::execute_push_psw(self),
            0xF6 => alu::execute_ori(self),
            0xF9 => transfer::execute_sphl(self),
            0xFB => control::execute_ei(self),
            0xFE => alu::execute_cpi(self),
            0xCB | 0xD9 | 0xDD | 0xED | 0xFD => {
                self.pc = self.pc.wrapping_add(1);
                return Err(ExecutionError::BadInstruction(opcode));
            }
        }

        // Single-step countdown. The arming OUT is exempt so that the
        // counter of 3 spans three whole instructions after it.
        if self.single_step_armed {
            self.single_step_armed = false;
        } else if self.single_step_counter > 0 {
            self.single_step_counter -= 1;
            if self.single_step_counter == 0 {
                self.interrupt(7);
            }
        }

        Ok(())
    }

    /// Deliver a vectored interrupt.
    ///
    /// If interrupts are disabled this is a silent no-op returning `false`.
    /// Otherwise the current PC is pushed, PC is set to `vector * 8`,
    /// interrupts are disabled, and `true` is returned.
    pub fn interrupt(&mut self, vector: u8) -> bool {
        debug_assert!(vector < 8, "interrupt vector out of range");
        if !self.interrupts_enabled {
            return false;
        }
        let pc = self.pc;
        self.push(pc);
        self.pc = u16::from(vector) * 8;
        self.interrupts_enabled = false;
        true
    }

    /// Force PC back to 0. Registers, flags and memory are untouched.
    pub fn reset(&mut self) {
        self.pc = 0;
    }

    // ========== Register Accessors ==========

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn bc(&self) -> u16 {
        (u16::from(self.b) << 8) | u16::from(self.c)
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn de(&self) -> u16 {
        (u16::from(self.d) << 8) | u16::from(self.e)
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn hl(&self) -> u16 {
        (u16::from(self.h) << 8) | u16::from(self.l)
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    /// The pseudo-register M: the byte at `memory[HL]`.
    pub fn m(&self) -> u8 {
        self.memory.read(self.hl())
    }

    pub fn set_m(&mut self, value: u8) {
        let hl = self.hl();
        self.memory.write(hl, value);
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// The packed PSW flag byte (bit 1 = 1, bits 3 and 5 = 0).
    pub fn psw(&self) -> Psw {
        self.psw
    }

    pub fn psw_mut(&mut self) -> &mut Psw {
        &mut self.psw
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.interrupts_enabled = enabled;
    }

    /// Instructions remaining before the single-step trap fires (0 = idle).
    pub fn single_step_counter(&self) -> u8 {
        self.single_step_counter
    }

    pub(crate) fn arm_single_step(&mut self) {
        self.single_step_counter = 3;
        self.single_step_armed = true;
    }

    /// Snapshot the register file.
    pub fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            bc: self.bc(),
            de: self.de(),
            hl: self.hl(),
            sp: self.sp,
            pc: self.pc,
            psw: self.psw.to_byte(),
            halted: self.halted,
            interrupts_enabled: self.interrupts_enabled,
        }
    }

    /// Shared access to the memory bus (used by observers and tests).
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable access to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    // ========== Stack ==========

    /// Push a word: SP decreases by 2, the word lands little-endian at the
    /// new SP. SP wraps modulo 2^16.
    pub fn push(&mut self, value: u16) {
        self.sp = self.sp.wrapping_sub(2);
        self.memory.write16(self.sp, value);
    }

    /// Pop a word from SP and advance it by 2.
    pub fn pop(&mut self) -> u16 {
        let value = self.memory.read16(self.sp);
        self.sp = self.sp.wrapping_add(2);
        value
    }

    // ========== Helpers for Instruction Implementations ==========

    /// Read a source/destination register by its 3-bit field
    /// (B C D E H L M A); code 6 reads through HL.
    pub(crate) fn reg8(&self, code: u8) -> u8 {
        match code & 0x07 {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => self.m(),
            _ => self.a,
        }
    }

    pub(crate) fn set_reg8(&mut self, code: u8, value: u8) {
        match code & 0x07 {
            0 => self.b = value,
            1 => self.c = value,
            2 => self.d = value,
            3 => self.e = value,
            4 => self.h = value,
            5 => self.l = value,
            6 => self.set_m(value),
            _ => self.a = value,
        }
    }

    /// Read a register pair by its 2-bit field (BC DE HL SP).
    pub(crate) fn rp16(&self, code: u8) -> u16 {
        match code & 0x03 {
            0 => self.bc(),
            1 => self.de(),
            2 => self.hl(),
            _ => self.sp,
        }
    }

    pub(crate) fn set_rp16(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            0 => self.set_bc(value),
            1 => self.set_de(value),
            2 => self.set_hl(value),
            _ => self.sp = value,
        }
    }

    /// The byte following the opcode.
    pub(crate) fn immediate_byte(&self) -> u8 {
        self.memory.read(self.pc.wrapping_add(1))
    }

    /// The little-endian word following the opcode.
    pub(crate) fn immediate_word(&self) -> u16 {
        self.memory.read16(self.pc.wrapping_add(1))
    }

    pub(crate) fn advance_pc(&mut self, bytes: u16) {
        self.pc = self.pc.wrapping_add(bytes);
    }

    // ========== Tracing ==========

    /// Append a trace rule. Rules are evaluated in insertion order before
    /// every instruction.
    pub fn add_trace(&mut self, rule: TraceRule) {
        self.traces.push(rule);
    }

    /// Discard all trace rules.
    pub fn clear_traces(&mut self) {
        self.traces.clear();
    }

    fn run_traces(&mut self) {
        if self.traces.is_empty() {
            return;
        }
        let mut halt = false;
        for i in 0..self.traces.len() {
            let rule = self.traces[i];
            let value = rule.target.sample(self);
            if !rule.when.matches(value) {
                continue;
            }
            match rule.action {
                // A matching skip rule suppresses all tracing for this
                // instruction, including rules later in the list.
                TraceAction::SkipTracing => return,
                TraceAction::Disassembly => {
                    log::info!("{} {}", self.disassemble_at(self.pc), self.flags_line());
                }
                TraceAction::Dump => {
                    log::info!("{}", self.flags_line());
                }
                TraceAction::Break => {
                    log::info!("breakpoint at pc=0x{:04x}", self.pc);
                }
                TraceAction::Halt => halt = true,
            }
        }
        if halt {
            self.halted = true;
        }
    }

    // ========== Diagnostics ==========

    /// One line of disassembly for the instruction at `pc`:
    /// address, raw bytes, mnemonic and operands.
    pub fn disassemble_at(&self, pc: u16) -> String {
        let bytes = [
            self.memory.read(pc),
            self.memory.read(pc.wrapping_add(1)),
            self.memory.read(pc.wrapping_add(2)),
        ];
        match decode_instruction(&bytes, pc) {
            Some(instr) => {
                let mut hex = format!("{:02x}", bytes[0]);
                for (i, byte) in bytes.iter().enumerate().skip(1) {
                    if (instr.size_bytes as usize) > i {
                        hex.push_str(&format!(" {:02x}", byte));
                    } else {
                        hex.push_str("   ");
                    }
                }
                format!("{:04x}   {}   {}", pc, hex, format_instruction(&instr))
            }
            None => format!("{:04x}   {:02x}         .byte ${:02X}", pc, bytes[0], bytes[0]),
        }
    }

    /// The register/flag summary appended to disassembly trace lines.
    pub fn flags_line(&self) -> String {
        let tos = self.memory.read16(self.sp);
        let mut line = format!(
            "a:{:02x} bc={:04x} de={:04x} hl={:04x} m={:02x} sp={:04x} *sp={:04x}\tpsw=",
            self.a,
            self.bc(),
            self.de(),
            self.hl(),
            self.m(),
            self.sp,
            tos
        );
        line.push_str(if self.psw.zero() { "Z," } else { "NZ," });
        line.push_str(if self.psw.parity() { "PE," } else { "PO," });
        line.push_str(if self.psw.carry() { "C," } else { "NC," });
        line.push_str(if self.psw.aux_carry() { "AC" } else { "NAC" });
        line
    }
}
