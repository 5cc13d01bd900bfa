//! The execution thread and the controls a shell drives from its UI
//! thread.
//!
//! The machine lives behind one mutex. The execution thread takes it for
//! a 1,000-instruction slice at a time; the UI thread takes it briefly
//! between slices for register snapshots and memory reads. Successive UI
//! snapshots may therefore come from different instruction boundaries,
//! which a register display tolerates by design.

use crate::media::MediaQueue;
use crate::rom_image::RomImage;
use crate::system::poly88::{Poly88, SliceOutcome};
use lib8080::{BusError, Registers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// Sleep while stopped or halted.
const IDLE_SLEEP: Duration = Duration::from_millis(50);

/// Owns the execution thread and the shared machine.
///
/// Dropping the emulator requests thread exit, joins it, and stops the
/// devices (closing any tape files).
pub struct Emulator {
    machine: Arc<Mutex<Poly88>>,
    media: Arc<MediaQueue>,
    keyboard: crate::devices::KeyboardHandle,
    running: Arc<AtomicBool>,
    shutting_down: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Emulator {
    /// Build the machine around `rom`, start its devices, and spawn the
    /// execution thread (initially stopped).
    pub fn new(rom: &RomImage, media: Arc<MediaQueue>) -> Result<Self, BusError> {
        let shutting_down = Arc::new(AtomicBool::new(false));
        let mut poly88 = Poly88::new(rom, Arc::clone(&media), Arc::clone(&shutting_down))?;
        poly88.start_devices();
        let keyboard = poly88.keyboard();

        let machine = Arc::new(Mutex::new(poly88));
        let running = Arc::new(AtomicBool::new(false));

        let thread = {
            let machine = Arc::clone(&machine);
            let running = Arc::clone(&running);
            let shutting_down = Arc::clone(&shutting_down);
            std::thread::spawn(move || execution_loop(&machine, &running, &shutting_down))
        };

        Ok(Self {
            machine,
            media,
            keyboard,
            running,
            shutting_down,
            thread: Some(thread),
        })
    }

    /// Start or stop free-running execution.
    pub fn run_stop(&self, run: bool) {
        self.running.store(run, Ordering::SeqCst);
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn toggle_running(&self) {
        self.running.fetch_xor(true, Ordering::SeqCst);
    }

    /// Reset PC to 0. Ignored while free-running, like the front panel.
    pub fn reset(&self) {
        if !self.running() {
            self.machine.lock().unwrap().reset();
        }
    }

    /// Execute one instruction. Ignored while free-running.
    pub fn step_once(&self) {
        if !self.running() {
            self.machine.lock().unwrap().step_once();
        }
    }

    /// Register snapshot for display.
    pub fn registers(&self) -> Registers {
        self.machine.lock().unwrap().registers()
    }

    /// One byte of the machine's memory, through the tiered map.
    pub fn memory_byte(&self, addr: u16) -> u8 {
        self.machine.lock().unwrap().read_memory(addr)
    }

    /// One little-endian word of the machine's memory.
    pub fn memory_word(&self, addr: u16) -> u16 {
        self.machine.lock().unwrap().read_memory_word(addr)
    }

    /// Copy of the display bytes for rendering.
    pub fn video_snapshot(&self) -> Vec<u8> {
        self.machine.lock().unwrap().video_snapshot()
    }

    /// Queue a key octet from the shell.
    pub fn key_press(&self, key: u8) {
        self.keyboard.key_press(key);
    }

    /// Edge-triggered: true once after the machine asked for a tape.
    pub fn media_wanted(&self) -> bool {
        self.media.media_wanted()
    }

    /// The shared media queue, for the shell's picker.
    pub fn media(&self) -> Arc<MediaQueue> {
        Arc::clone(&self.media)
    }

    /// The shared machine, for trace setup and tests.
    pub fn machine(&self) -> Arc<Mutex<Poly88>> {
        Arc::clone(&self.machine)
    }
}

fn execution_loop(
    machine: &Mutex<Poly88>,
    running: &AtomicBool,
    shutting_down: &AtomicBool,
) {
    while !shutting_down.load(Ordering::SeqCst) {
        if !running.load(Ordering::SeqCst) {
            std::thread::park_timeout(IDLE_SLEEP);
            continue;
        }
        let outcome = machine.lock().unwrap().run_slice();
        match outcome {
            SliceOutcome::Ran => {}
            SliceOutcome::Halted => std::thread::sleep(IDLE_SLEEP),
            SliceOutcome::BadInstruction(_) => {
                running.store(false, Ordering::SeqCst);
            }
        }
    }
}

impl Drop for Emulator {
    fn drop(&mut self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("execution thread panicked");
            }
        }
        self.machine.lock().unwrap().stop_devices();
    }
}
