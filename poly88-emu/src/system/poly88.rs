//! Machine wiring and the free-running execute loop.
//!
//! The machine advances in slices of 1,000 instructions. Device polling
//! and interrupt delivery happen once per slice, and the video observer is
//! flushed every 100 slices (100,000 instructions), the cheap coalescing
//! the display can tolerate. A pending device request wakes the CPU from
//! HALT at the next poll.

use crate::devices::{BaudRateGenerator, Keyboard, KeyboardHandle, Timer, Usart, UsartControl};
use crate::media::MediaQueue;
use crate::memory::TieredMemory;
use crate::rom_image::RomImage;
use lib8080::{BusError, Cpu, DeviceBus, ExecutionError, MemoryBus, Registers};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Instructions executed between device polls.
pub const POLL_INTERVAL: u32 = 1_000;
/// Device polls between video observer flushes.
const VIDEO_FLUSH_POLLS: u32 = 100;

/// What a run slice ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    /// The full slice executed.
    Ran,
    /// The CPU is halted waiting for an interrupt.
    Halted,
    /// The CPU fetched a byte the 8080 does not decode; the run stops.
    BadInstruction(u8),
}

/// The assembled Poly-88: CPU, tiered memory, and the device complement.
pub struct Poly88 {
    cpu: Cpu<TieredMemory>,
    bus: DeviceBus,
    keyboard: KeyboardHandle,
    video_observer: Option<Box<dyn FnMut(&[u8]) + Send>>,
    polls_since_flush: u32,
}

impl Poly88 {
    /// Wire the machine: ROM at address 0, keyboard, timer, baud-rate
    /// selector and the USART pair sharing the media queue.
    ///
    /// `shutting_down` aborts any blocking tape-open wait when the shell
    /// tears the machine down.
    pub fn new(
        rom: &RomImage,
        media: Arc<MediaQueue>,
        shutting_down: Arc<AtomicBool>,
    ) -> Result<Self, BusError> {
        let mut memory = TieredMemory::new();
        memory.add_rom(0, rom.bytes().to_vec());
        let cpu = Cpu::new(memory);

        let mut bus = DeviceBus::new();
        let keyboard_device = Keyboard::new();
        let keyboard = keyboard_device.handle();
        bus.add_device(Box::new(keyboard_device))?;
        bus.add_device(Box::new(Timer::new()))?;
        bus.add_device(Box::new(BaudRateGenerator::new()))?;

        let usart = Usart::new();
        let control = UsartControl::new(&usart, media, shutting_down);
        bus.add_device(Box::new(usart))?;
        bus.add_device(Box::new(control))?;

        Ok(Self {
            cpu,
            bus,
            keyboard,
            video_observer: None,
            polls_since_flush: 0,
        })
    }

    /// Start the device complement (spawns the timer thread).
    pub fn start_devices(&mut self) {
        self.bus.start_devices();
    }

    /// Stop the device complement and close tape files.
    pub fn stop_devices(&mut self) {
        self.bus.stop_devices();
    }

    /// Producer handle for the shell's key events.
    pub fn keyboard(&self) -> KeyboardHandle {
        self.keyboard.clone()
    }

    /// Install the callback that receives video RAM after dirty flushes.
    pub fn set_video_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.video_observer = Some(Box::new(observer));
    }

    /// Poll devices, wake a halted CPU if anything is pending, and deliver
    /// the highest-priority interrupt.
    fn service_devices(&mut self) {
        if let Some(keyboard) = self.bus.get_device_mut::<Keyboard>() {
            keyboard.poll();
        }
        if let Some(control) = self.bus.get_device_mut::<UsartControl>() {
            control.poll();
        }
        if self.bus.any_interrupt_pending() {
            self.cpu.set_halted(false);
        }
        self.bus.check_interrupts(&mut self.cpu);
    }

    fn flush_video(&mut self) {
        if self.cpu.memory_mut().take_video_dirty() {
            if let Some(observer) = self.video_observer.as_mut() {
                observer(self.cpu.memory().video_ram());
            }
        }
    }

    /// Run up to one poll interval of instructions.
    ///
    /// Returns early when the CPU halts or fetches a bad instruction; the
    /// caller owns the pacing between slices.
    pub fn run_slice(&mut self) -> SliceOutcome {
        self.service_devices();
        self.polls_since_flush += 1;
        if self.polls_since_flush >= VIDEO_FLUSH_POLLS {
            self.polls_since_flush = 0;
            self.flush_video();
        }

        for _ in 0..POLL_INTERVAL {
            if self.cpu.halted() {
                return SliceOutcome::Halted;
            }
            if let Err(ExecutionError::BadInstruction(opcode)) = self.cpu.step(&mut self.bus) {
                log::error!(
                    "bad instruction 0x{:02X} at pc=0x{:04X}; stopping",
                    opcode,
                    self.cpu.pc()
                );
                return SliceOutcome::BadInstruction(opcode);
            }
        }
        SliceOutcome::Ran
    }

    /// Execute exactly one instruction with a fresh device poll, as the
    /// shell's Step button does.
    pub fn step_once(&mut self) -> SliceOutcome {
        self.service_devices();
        if self.cpu.halted() {
            return SliceOutcome::Halted;
        }
        match self.cpu.step(&mut self.bus) {
            Ok(()) => SliceOutcome::Ran,
            Err(ExecutionError::BadInstruction(opcode)) => SliceOutcome::BadInstruction(opcode),
        }
    }

    /// Force PC back to the monitor entry at 0.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Register snapshot for the shell.
    pub fn registers(&self) -> Registers {
        self.cpu.registers()
    }

    /// Read-only memory view (used by the shell's renderer and inspector).
    pub fn read_memory(&self, addr: u16) -> u8 {
        self.cpu.memory().read(addr)
    }

    /// Little-endian word view.
    pub fn read_memory_word(&self, addr: u16) -> u16 {
        self.cpu.memory().read16(addr)
    }

    /// Copy of the 16x64 display bytes.
    pub fn video_snapshot(&self) -> Vec<u8> {
        self.cpu.memory().video_ram().to_vec()
    }

    /// The CPU, for trace configuration and tests.
    pub fn cpu(&self) -> &Cpu<TieredMemory> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu<TieredMemory> {
        &mut self.cpu
    }

    /// The device bus, for direct device access in tests and tooling.
    pub fn devices(&self) -> &DeviceBus {
        &self.bus
    }

    pub fn devices_mut(&mut self) -> &mut DeviceBus {
        &mut self.bus
    }
}
