//! Tests for PUSH/POP, PUSH PSW/POP PSW and XTHL.

use lib8080::{Cpu, FlatMemory, MemoryBus, NullPorts};

fn setup_cpu(program: &[u8]) -> Cpu<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.load(0x0000, program);
    Cpu::new(memory)
}

#[test]
fn test_push_b_pop_d() {
    // PUSH B / POP D leaves SP where it started and copies the pair.
    let mut cpu = setup_cpu(&[0xC5, 0xD1]);
    cpu.set_sp(0x2400);
    cpu.set_bc(0x1234);

    cpu.step(&mut NullPorts).unwrap();
    assert_eq!(cpu.sp(), 0x23FE);
    assert_eq!(cpu.memory().read(0x23FE), 0x34); // low byte at low address
    assert_eq!(cpu.memory().read(0x23FF), 0x12);

    cpu.step(&mut NullPorts).unwrap();
    assert_eq!(cpu.sp(), 0x2400);
    assert_eq!(cpu.de(), 0x1234);
}

#[test]
fn test_push_pop_psw() {
    let mut cpu = setup_cpu(&[0xF5, 0xAF, 0xF1]); // PUSH PSW / XRA A / POP PSW
    cpu.set_sp(0x2400);
    cpu.set_a(0x9C);
    cpu.psw_mut().set_carry(true);
    cpu.psw_mut().set_sign(true);
    let psw_before = cpu.psw().to_byte();

    cpu.step(&mut NullPorts).unwrap();
    // Stacked word is (A << 8) | flags
    assert_eq!(cpu.memory().read(0x23FE), psw_before);
    assert_eq!(cpu.memory().read(0x23FF), 0x9C);

    cpu.step(&mut NullPorts).unwrap(); // trash A and flags
    assert_eq!(cpu.a(), 0x00);

    cpu.step(&mut NullPorts).unwrap();
    assert_eq!(cpu.a(), 0x9C);
    assert_eq!(cpu.psw().to_byte(), psw_before);
}

#[test]
fn test_pop_psw_scrubs_constant_bits() {
    let mut cpu = setup_cpu(&[0xF1]); // POP PSW
    cpu.set_sp(0x23FE);
    cpu.memory_mut().write(0x23FE, 0xFF); // flags byte with junk in 3/5
    cpu.memory_mut().write(0x23FF, 0x12);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.a(), 0x12);
    assert_eq!(cpu.psw().to_byte(), 0xD7); // bits 3/5 cleared, bit 1 set
}

#[test]
fn test_xthl() {
    let mut cpu = setup_cpu(&[0xE3]); // XTHL
    cpu.set_sp(0x23FE);
    cpu.set_hl(0xAAAA);
    cpu.memory_mut().write16(0x23FE, 0x5555);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.hl(), 0x5555);
    assert_eq!(cpu.memory().read16(0x23FE), 0xAAAA);
    assert_eq!(cpu.sp(), 0x23FE); // unchanged
}

#[test]
fn test_stack_wraps_at_zero() {
    let mut cpu = setup_cpu(&[0xC5]); // PUSH B
    cpu.set_sp(0x0001);
    cpu.set_bc(0xBEEF);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.sp(), 0xFFFF);
    assert_eq!(cpu.memory().read(0xFFFF), 0xEF);
    assert_eq!(cpu.memory().read(0x0000), 0xBE);
}
