//! Tests for the four accumulator rotates. Only carry changes.

use lib8080::{Cpu, FlatMemory, MemoryBus, NullPorts};

fn setup_cpu(opcode: u8) -> Cpu<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0x0000, opcode);
    Cpu::new(memory)
}

#[test]
fn test_rlc() {
    let mut cpu = setup_cpu(0x07);
    cpu.set_a(0xF2);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.a(), 0xE5); // bit 7 wraps to bit 0
    assert!(cpu.psw().carry());
}

#[test]
fn test_rrc() {
    let mut cpu = setup_cpu(0x0F);
    cpu.set_a(0xF2);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.a(), 0x79);
    assert!(!cpu.psw().carry());
}

#[test]
fn test_ral_through_carry() {
    let mut cpu = setup_cpu(0x17);
    cpu.set_a(0xB5);
    cpu.psw_mut().set_carry(false);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.a(), 0x6A); // old carry shifted into bit 0
    assert!(cpu.psw().carry()); // old bit 7
}

#[test]
fn test_rar_through_carry() {
    let mut cpu = setup_cpu(0x1F);
    cpu.set_a(0x6A);
    cpu.psw_mut().set_carry(true);

    cpu.step(&mut NullPorts).unwrap();

    assert_eq!(cpu.a(), 0xB5); // old carry into bit 7
    assert!(!cpu.psw().carry()); // old bit 0
}

#[test]
fn test_rotates_leave_zsp_alone() {
    let mut cpu = setup_cpu(0x07);
    cpu.set_a(0x80);
    cpu.psw_mut().set_zero(true);
    cpu.psw_mut().set_sign(true);
    cpu.psw_mut().set_parity(true);

    cpu.step(&mut NullPorts).unwrap();

    assert!(cpu.psw().zero());
    assert!(cpu.psw().sign());
    assert!(cpu.psw().parity());
}
