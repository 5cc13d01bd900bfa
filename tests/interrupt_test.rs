//! Tests for interrupt injection and prioritized delivery through the
//! device bus.

use lib8080::{Cpu, Device, DeviceBus, FlatMemory, MemoryBus, NullPorts, PortBus};
use std::any::Any;

/// Mock device with a controllable pending flag on a chosen IRQ line.
struct MockIrqDevice {
    line: u8,
    port: u8,
    pending: bool,
}

impl MockIrqDevice {
    fn new(line: u8, port: u8) -> Self {
        Self {
            line,
            port,
            pending: false,
        }
    }
}

impl Device for MockIrqDevice {
    fn name(&self) -> &str {
        "MockIrqDevice"
    }
    fn irq_line(&self) -> Option<u8> {
        Some(self.line)
    }
    fn input_port(&self) -> Option<u8> {
        Some(self.port)
    }
    fn read(&mut self) -> u8 {
        // Reading the data port acknowledges the request
        self.pending = false;
        0
    }
    fn write(&mut self, _value: u8) {}
    fn interrupt_pending(&self) -> bool {
        self.pending
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_interrupt_disabled_is_silent_noop() {
    let mut cpu = Cpu::new(FlatMemory::new());
    cpu.set_pc(0x0C00);
    cpu.set_sp(0x2400);
    cpu.set_interrupts_enabled(false);

    assert!(!cpu.interrupt(3));

    assert_eq!(cpu.pc(), 0x0C00);
    assert_eq!(cpu.sp(), 0x2400);
}

#[test]
fn test_interrupt_pushes_and_vectors() {
    let mut cpu = Cpu::new(FlatMemory::new());
    cpu.set_pc(0x0C00);
    cpu.set_sp(0x2400);
    cpu.set_interrupts_enabled(true);

    assert!(cpu.interrupt(3));

    assert_eq!(cpu.pc(), 0x0018); // 3 * 8
    assert_eq!(cpu.sp(), 0x23FE);
    assert_eq!(cpu.memory().read(0x23FE), 0x00);
    assert_eq!(cpu.memory().read(0x23FF), 0x0C);
    assert!(!cpu.interrupts_enabled());
}

#[test]
fn test_bus_delivers_lowest_pending_line_first() {
    let mut cpu = Cpu::new(FlatMemory::new());
    cpu.set_sp(0x2400);
    cpu.set_interrupts_enabled(true);

    // Raise requests on lines 6 and 4; line 4 must win.
    let mut bus = DeviceBus::new();
    let mut high = MockIrqDevice::new(6, 0x30);
    high.pending = true;
    let mut low = MockIrqDevice::new(4, 0x31);
    low.pending = true;
    bus.add_device(Box::new(high)).unwrap();
    bus.add_device(Box::new(low)).unwrap();

    let delivered = bus.check_interrupts(&mut cpu);

    assert_eq!(delivered, Some(4));
    assert_eq!(cpu.pc(), 0x0020); // 4 * 8
    assert!(!cpu.interrupts_enabled());

    // With interrupts now disabled, the line-6 request stays undelivered.
    assert_eq!(bus.check_interrupts(&mut cpu), None);
    assert!(bus.any_interrupt_pending());
}

#[test]
fn test_bus_respects_interrupt_disable() {
    let mut cpu = Cpu::new(FlatMemory::new());
    cpu.set_interrupts_enabled(false);

    let mut bus = DeviceBus::new();
    let mut device = MockIrqDevice::new(5, 0x40);
    device.pending = true;
    bus.add_device(Box::new(device)).unwrap();

    assert_eq!(bus.check_interrupts(&mut cpu), None);
    assert_eq!(cpu.pc(), 0x0000);
}

#[test]
fn test_isr_ack_through_port_clears_pending() {
    let mut cpu = Cpu::new(FlatMemory::new());
    cpu.set_sp(0x2400);
    cpu.set_interrupts_enabled(true);

    let mut bus = DeviceBus::new();
    let mut device = MockIrqDevice::new(5, 0xF8);
    device.pending = true;
    bus.add_device(Box::new(device)).unwrap();

    assert_eq!(bus.check_interrupts(&mut cpu), Some(5));
    assert!(bus.any_interrupt_pending()); // delivery does not clear

    // The ISR's IN instruction acknowledges.
    bus.input(0xF8);
    assert!(!bus.any_interrupt_pending());
}

#[test]
fn test_interrupted_program_resumes_after_ret() {
    // Program at 0: EI / NOP; ISR at 0x0028 (vector 5): RET
    let mut memory = FlatMemory::new();
    memory.load(0x0000, &[0xFB, 0x00]);
    memory.write(0x0028, 0xC9);
    let mut cpu = Cpu::new(memory);
    cpu.set_sp(0x2400);

    cpu.step(&mut NullPorts).unwrap(); // EI
    assert!(cpu.interrupt(5));
    assert_eq!(cpu.pc(), 0x0028);

    cpu.step(&mut NullPorts).unwrap(); // RET
    assert_eq!(cpu.pc(), 0x0001);
    assert_eq!(cpu.sp(), 0x2400);
}
