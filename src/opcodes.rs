//! # Opcode Metadata Table
//!
//! The complete 256-entry opcode metadata table, the single source of truth
//! for 8080 instruction names, operand kinds and encoded lengths.
//!
//! The table covers:
//! - **All documented 8080 instructions**
//! - **Undocumented NOP aliases** (`0x08`, `0x10`, `0x18`, `0x20`, `0x28`,
//!   `0x30`, `0x38`) - decoded as `NOP`
//! - **Truly absent patterns** (`0xCB`, `0xD9`, `0xDD`, `0xED`, `0xFD`) -
//!   marked with the `???` mnemonic
//!
//! Register fields are baked into the mnemonic (`MOV B,C`, `PUSH PSW`),
//! which keeps both the executor and the disassembler free of register
//! decode tables.

/// How an instruction's trailing bytes are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand bytes; the opcode is self-contained.
    None,
    /// One immediate data byte.
    Immediate,
    /// Two immediate bytes forming a little-endian word.
    Immediate16,
    /// Two immediate bytes forming a little-endian address.
    Address,
    /// One byte naming an I/O port.
    Port,
}

/// Metadata for a single 8080 opcode.
///
/// # Examples
///
/// ```
/// use lib8080::{Operand, OPCODE_TABLE};
///
/// let mvi_b = &OPCODE_TABLE[0x06];
/// assert_eq!(mvi_b.mnemonic, "MVI B");
/// assert_eq!(mvi_b.operand, Operand::Immediate);
/// assert_eq!(mvi_b.size_bytes, 2);
///
/// let jmp = &OPCODE_TABLE[0xC3];
/// assert_eq!(jmp.mnemonic, "JMP");
/// assert_eq!(jmp.size_bytes, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic including any register field
    /// (e.g. "MOV B,C", "ADD M", "???" for absent patterns).
    pub mnemonic: &'static str,

    /// Operand kind for the bytes following the opcode.
    pub operand: Operand,

    /// Total instruction size in bytes (opcode + operands), 1-3.
    pub size_bytes: u8,
}

const fn op(mnemonic: &'static str, operand: Operand) -> OpcodeMetadata {
    let size_bytes = match operand {
        Operand::None => 1,
        Operand::Immediate | Operand::Port => 2,
        Operand::Immediate16 | Operand::Address => 3,
    };
    OpcodeMetadata {
        mnemonic,
        operand,
        size_bytes,
    }
}

use Operand::{Address, Immediate, Immediate16, None as NoOperand, Port};

/// Complete 256-entry opcode metadata table indexed by opcode byte value.
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = [
    op("NOP", NoOperand),       // 0x00
    op("LXI B", Immediate16),   // 0x01
    op("STAX B", NoOperand),    // 0x02
    op("INX B", NoOperand),     // 0x03
    op("INR B", NoOperand),     // 0x04
    op("DCR B", NoOperand),     // 0x05
    op("MVI B", Immediate),     // 0x06
    op("RLC", NoOperand),       // 0x07
    op("NOP", NoOperand),       // 0x08 undocumented alias
    op("DAD B", NoOperand),     // 0x09
    op("LDAX B", NoOperand),    // 0x0A
    op("DCX B", NoOperand),     // 0x0B
    op("INR C", NoOperand),     // 0x0C
    op("DCR C", NoOperand),     // 0x0D
    op("MVI C", Immediate),     // 0x0E
    op("RRC", NoOperand),       // 0x0F
    op("NOP", NoOperand),       // 0x10 undocumented alias
    op("LXI D", Immediate16),   // 0x11
    op("STAX D", NoOperand),    // 0x12
    op("INX D", NoOperand),     // 0x13
    op("INR D", NoOperand),     // 0x14
    op("DCR D", NoOperand),     // 0x15
    op("MVI D", Immediate),     // 0x16
    op("RAL", NoOperand),       // 0x17
    op("NOP", NoOperand),       // 0x18 undocumented alias
    op("DAD D", NoOperand),     // 0x19
    op("LDAX D", NoOperand),    // 0x1A
    op("DCX D", NoOperand),     // 0x1B
    op("INR E", NoOperand),     // 0x1C
    op("DCR E", NoOperand),     // 0x1D
    op("MVI E", Immediate),     // 0x1E
    op("RAR", NoOperand),       // 0x1F
    op("NOP", NoOperand),       // 0x20 undocumented alias
    op("LXI H", Immediate16),   // 0x21
    op("SHLD", Address),        // 0x22
    op("INX H", NoOperand),     // 0x23
    op("INR H", NoOperand),     // 0x24
    op("DCR H", NoOperand),     // 0x25
    op("MVI H", Immediate),     // 0x26
    op("DAA", NoOperand),       // 0x27
    op("NOP", NoOperand),       // 0x28 undocumented alias
    op("DAD H", NoOperand),     // 0x29
    op("LHLD", Address),        // 0x2A
    op("DCX H", NoOperand),     // 0x2B
    op("INR L", NoOperand),     // 0x2C
    op("DCR L", NoOperand),     // 0x2D
    op("MVI L", Immediate),     // 0x2E
    op("CMA", NoOperand),       // 0x2F
    op("NOP", NoOperand),       // 0x30 undocumented alias
    op("LXI SP", Immediate16),  // 0x31
    op("STA", Address),         // 0x32
    op("INX SP", NoOperand),    // 0x33
    op("INR M", NoOperand),     // 0x34
    op("DCR M", NoOperand),     // 0x35
    op("MVI M", Immediate),     // 0x36
    op("STC", NoOperand),       // 0x37
    op("NOP", NoOperand),       // 0x38 undocumented alias
    op("DAD SP", NoOperand),    // 0x39
    op("LDA", Address),         // 0x3A
    op("DCX SP", NoOperand),    // 0x3B
    op("INR A", NoOperand),     // 0x3C
    op("DCR A", NoOperand),     // 0x3D
    op("MVI A", Immediate),     // 0x3E
    op("CMC", NoOperand),       // 0x3F
    op("MOV B,B", NoOperand),   // 0x40
    op("MOV B,C", NoOperand),   // 0x41
    op("MOV B,D", NoOperand),   // 0x42
    op("MOV B,E", NoOperand),   // 0x43
    op("MOV B,H", NoOperand),   // 0x44
    op("MOV B,L", NoOperand),   // 0x45
    op("MOV B,M", NoOperand),   // 0x46
    op("MOV B,A", NoOperand),   // 0x47
    op("MOV C,B", NoOperand),   // 0x48
    op("MOV C,C", NoOperand),   // 0x49
    op("MOV C,D", NoOperand),   // 0x4A
    op("MOV C,E", NoOperand),   // 0x4B
    op("MOV C,H", NoOperand),   // 0x4C
    op("MOV C,L", NoOperand),   // 0x4D
    op("MOV C,M", NoOperand),   // 0x4E
    op("MOV C,A", NoOperand),   // 0x4F
    op("MOV D,B", NoOperand),   // 0x50
    op("MOV D,C", NoOperand),   // 0x51
    op("MOV D,D", NoOperand),   // 0x52
    op("MOV D,E", NoOperand),   // 0x53
    op("MOV D,H", NoOperand),   // 0x54
    op("MOV D,L", NoOperand),   // 0x55
    op("MOV D,M", NoOperand),   // 0x56
    op("MOV D,A", NoOperand),   // 0x57
    op("MOV E,B", NoOperand),   // 0x58
    op("MOV E,C", NoOperand),   // 0x59
    op("MOV E,D", NoOperand),   // 0x5A
    op("MOV E,E", NoOperand),   // 0x5B
    op("MOV E,H", NoOperand),   // 0x5C
    op("MOV E,L", NoOperand),   // 0x5D
    op("MOV E,M", NoOperand),   // 0x5E
    op("MOV E,A", NoOperand),   // 0x5F
    op("MOV H,B", NoOperand),   // 0x60
    op("MOV H,C", NoOperand),   // 0x61
    op("MOV H,D", NoOperand),   // 0x62
    op("MOV H,E", NoOperand),   // 0x63
    op("MOV H,H", NoOperand),   // 0x64
    op("MOV H,L", NoOperand),   // 0x65
    op("MOV H,M", NoOperand),   // 0x66
    op("MOV H,A", NoOperand),   // 0x67
    op("MOV L,B", NoOperand),   // 0x68
    op("MOV L,C", NoOperand),   // 0x69
    op("MOV L,D", NoOperand),   // 0x6A
    op("MOV L,E", NoOperand),   // 0x6B
    op("MOV L,H", NoOperand),   // 0x6C
    op("MOV L,L", NoOperand),   // 0x6D
    op("MOV L,M", NoOperand),   // 0x6E
    op("MOV L,A", NoOperand),   // 0x6F
    op("MOV M,B", NoOperand),   // 0x70
    op("MOV M,C", NoOperand),   // 0x71
    op("MOV M,D", NoOperand),   // 0x72
    op("MOV M,E", NoOperand),   // 0x73
    op("MOV M,H", NoOperand),   // 0x74
    op("MOV M,L", NoOperand),   // 0x75
    op("HLT", NoOperand),       // 0x76
    op("MOV M,A", NoOperand),   // 0x77
    op("MOV A,B", NoOperand),   // 0x78
    op("MOV A,C", NoOperand),   // 0x79
    op("MOV A,D", NoOperand),   // 0x7A
    op("MOV A,E", NoOperand),   // 0x7B
    op("MOV A,H", NoOperand),   // 0x7C
    op("MOV A,L", NoOperand),   // 0x7D
    op("MOV A,M", NoOperand),   // 0x7E
    op("MOV A,A", NoOperand),   // 0x7F
    op("ADD B", NoOperand),     // 0x80
    op("ADD C", NoOperand),     // 0x81
    op("ADD D", NoOperand),     // 0x82
    op("ADD E", NoOperand),     // 0x83
    op("ADD H", NoOperand),     // 0x84
    op("ADD L", NoOperand),     // 0x85
    op("ADD M", NoOperand),     // 0x86
    op("ADD A", NoOperand),     // 0x87
    op("ADC B", NoOperand),     // 0x88
    op("ADC C", NoOperand),     // 0x89
    op("ADC D", NoOperand),     // 0x8A
    op("ADC E", NoOperand),     // 0x8B
    op("ADC H", NoOperand),     // 0x8C
    op("ADC L", NoOperand),     // 0x8D
    op("ADC M", NoOperand),     // 0x8E
    op("ADC A", NoOperand),     // 0x8F
    op("SUB B", NoOperand),     // 0x90
    op("SUB C", NoOperand),     // 0x91
    op("SUB D", NoOperand),     // 0x92
    op("SUB E", NoOperand),     // 0x93
    op("SUB H", NoOperand),     // 0x94
    op("SUB L", NoOperand),     // 0x95
    op("SUB M", NoOperand),     // 0x96
    op("SUB A", NoOperand),     // 0x97
    op("SBB B", NoOperand),     // 0x98
    op("SBB C", NoOperand),     // 0x99
    op("SBB D", NoOperand),     // 0x9A
    op("SBB E", NoOperand),     // 0x9B
    op("SBB H", NoOperand),     // 0x9C
    op("SBB L", NoOperand),     // 0x9D
    op("SBB M", NoOperand),     // 0x9E
    op("SBB A", NoOperand),     // 0x9F
    op("ANA B", NoOperand),     // 0xA0
    op("ANA C", NoOperand),     // 0xA1
    op("ANA D", NoOperand),     // 0xA2
    op("ANA E", NoOperand),     // 0xA3
    op("ANA H", NoOperand),     // 0xA4
    op("ANA L", NoOperand),     // 0xA5
    op("ANA M", NoOperand),     // 0xA6
    op("ANA A", NoOperand),     // 0xA7
    op("XRA B", NoOperand),     // 0xA8
    op("XRA C", NoOperand),     // 0xA9
    op("XRA D", NoOperand),     // 0xAA
    op("XRA E", NoOperand),     // 0xAB
    op("XRA H", NoOperand),     // 0xAC
    op("XRA L", NoOperand),     // 0xAD
    op("XRA M", NoOperand),     // 0xAE
    op("XRA A", NoOperand),     // 0xAF
    op("ORA B", NoOperand),     // 0xB0
    op("ORA C", NoOperand),     // 0xB1
    op("ORA D", NoOperand),     // 0xB2
    op("ORA E", NoOperand),     // 0xB3
    op("ORA H", NoOperand),     // 0xB4
    op("ORA L", NoOperand),     // 0xB5
    op("ORA M", NoOperand),     // 0xB6
    op("ORA A", NoOperand),     // 0xB7
    op("CMP B", NoOperand),     // 0xB8
    op("CMP C", NoOperand),     // 0xB9
    op("CMP D", NoOperand),     // 0xBA
    op("CMP E", NoOperand),     // 0xBB
    op("CMP H", NoOperand),     // 0xBC
    op("CMP L", NoOperand),     // 0xBD
    op("CMP M", NoOperand),     // 0xBE
    op("CMP A", NoOperand),     // 0xBF
    op("RNZ", NoOperand),       // 0xC0
    op("POP B", NoOperand),     // 0xC1
    op("JNZ", Address),         // 0xC2
    op("JMP", Address),         // 0xC3
    op("CNZ", Address),         // 0xC4
    op("PUSH B", NoOperand),    // 0xC5
    op("ADI", Immediate),       // 0xC6
    op("RST 0", NoOperand),     // 0xC7
    op("RZ", NoOperand),        // 0xC8
    op("RET", NoOperand),       // 0xC9
    op("JZ", Address),          // 0xCA
    op("???", NoOperand),       // 0xCB absent
    op("CZ", Address),          // 0xCC
    op("CALL", Address),        // 0xCD
    op("ACI", Immediate),       // 0xCE
    op("RST 1", NoOperand),     // 0xCF
    op("RNC", NoOperand),       // 0xD0
    op("POP D", NoOperand),     // 0xD1
    op("JNC", Address),         // 0xD2
    op("OUT", Port),            // 0xD3
    op("CNC", Address),         // 0xD4
    op("PUSH D", NoOperand),    // 0xD5
    op("SUI", Immediate),       // 0xD6
    op("RST 2", NoOperand),     // 0xD7
    op("RC", NoOperand),        // 0xD8
    op("???", NoOperand),       // 0xD9 absent
    op("JC", Address),          // 0xDA
    op("IN", Port),             // 0xDB
    op("CC", Address),          // 0xDC
    op("???", NoOperand),       // 0xDD absent
    op("SBI", Immediate),       // 0xDE
    op("RST 3", NoOperand),     // 0xDF
    op("RPO", NoOperand),       // 0xE0
    op("POP H", NoOperand),     // 0xE1
    op("JPO", Address),         // 0xE2
    op("XTHL", NoOperand),      // 0xE3
    op("CPO", Address),         // 0xE4
    op("PUSH H", NoOperand),    // 0xE5
    op("ANI", Immediate),       // 0xE6
    op("RST 4", NoOperand),     // 0xE7
    op("RPE", NoOperand),       // 0xE8
    op("PCHL", NoOperand),      // 0xE9
    op("JPE", Address),         // 0xEA
    op("XCHG", NoOperand),      // 0xEB
    op("CPE", Address),         // 0xEC
    op("???", NoOperand),       // 0xED absent
    op("XRI", Immediate),       // 0xEE
    op("RST 5", NoOperand),     // 0xEF
    op("RP", NoOperand),        // 0xF0
    op("POP PSW", NoOperand),   // 0xF1
    op("JP", Address),          // 0xF2
    op("DI", NoOperand),        // 0xF3
    op("CP", Address),          // 0xF4
    op("PUSH PSW", NoOperand),  // 0xF5
    op("ORI", Immediate),       // 0xF6
    op("RST 6", NoOperand),     // 0xF7
    op("RM", NoOperand),        // 0xF8
    op("SPHL", NoOperand),      // 0xF9
    op("JM", Address),          // 0xFA
    op("EI", NoOperand),        // 0xFB
    op("CM", Address),          // 0xFC
    op("???", NoOperand),       // 0xFD absent
    op("CPI", Immediate),       // 0xFE
    op("RST 7", NoOperand),     // 0xFF
];
