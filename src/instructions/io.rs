//! Port I/O.
//!
//! IN and OUT reach peripherals through the `PortBus`. The single exception
//! is `OUT 0x0C`, which arms the CPU's own single-step trap and is never
//! forwarded to the bus; the Poly-88 ROM monitor implements its Step
//! command with the sequence `EI; OUT 0x0C; RET`.

use crate::cpu::SINGLE_STEP_PORT;
use crate::{Cpu, MemoryBus, PortBus};

/// IN port - read a device into the accumulator.
pub(crate) fn execute_in<M: MemoryBus>(cpu: &mut Cpu<M>, ports: &mut dyn PortBus) {
    let port = cpu.immediate_byte();
    cpu.a = ports.input(port);
    cpu.advance_pc(2);
}

/// OUT port - write the accumulator to a device, or arm the single-step
/// trap on port 0x0C.
pub(crate) fn execute_out<M: MemoryBus>(cpu: &mut Cpu<M>, ports: &mut dyn PortBus) {
    let port = cpu.immediate_byte();
    if port == SINGLE_STEP_PORT {
        cpu.arm_single_step();
    } else {
        let a = cpu.a;
        ports.output(port, a);
    }
    cpu.advance_pc(2);
}
