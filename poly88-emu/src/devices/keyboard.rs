//! Parallel keyboard on port 0xF8, interrupt line 5.
//!
//! The shell pushes key octets from its UI thread through a
//! [`KeyboardHandle`]; the execution thread drains them with IN
//! instructions. The interrupt request tracks FIFO occupancy: it is raised
//! whenever the FIFO is non-empty at poll time and cleared by the read
//! that empties it.

use lib8080::Device;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Keyboard data port.
pub const KEYBOARD_PORT: u8 = 0xF8;
/// Keyboard interrupt line.
pub const KEYBOARD_IRQ: u8 = 5;

/// Producer side of the key FIFO, cloned out to the shell thread.
#[derive(Clone)]
pub struct KeyboardHandle {
    keys: Arc<Mutex<VecDeque<u8>>>,
}

impl KeyboardHandle {
    /// Queue one key octet (any value, control codes included).
    pub fn key_press(&self, key: u8) {
        self.keys.lock().unwrap().push_back(key);
    }

    /// Queue a whole string of octets, as pasted text would arrive.
    pub fn key_string(&self, text: &[u8]) {
        let mut keys = self.keys.lock().unwrap();
        keys.extend(text.iter().copied());
    }
}

/// The keyboard device on the execution thread.
pub struct Keyboard {
    keys: Arc<Mutex<VecDeque<u8>>>,
    last_key: u8,
    pending: bool,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(Mutex::new(VecDeque::new())),
            last_key: 0,
            pending: false,
        }
    }

    /// A producer handle for the shell thread.
    pub fn handle(&self) -> KeyboardHandle {
        KeyboardHandle {
            keys: Arc::clone(&self.keys),
        }
    }

    /// Raise the interrupt request if keys are waiting. Called from the
    /// run loop's device poll.
    pub fn poll(&mut self) {
        if !self.keys.lock().unwrap().is_empty() {
            self.pending = true;
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Keyboard {
    fn name(&self) -> &str {
        "Keyboard"
    }

    fn irq_line(&self) -> Option<u8> {
        Some(KEYBOARD_IRQ)
    }

    fn input_port(&self) -> Option<u8> {
        Some(KEYBOARD_PORT)
    }

    /// Pop the head of the FIFO; an empty FIFO repeats the last key, as
    /// the latched hardware port did.
    fn read(&mut self) -> u8 {
        let mut keys = self.keys.lock().unwrap();
        if let Some(key) = keys.pop_front() {
            self.last_key = key;
        }
        if keys.is_empty() {
            self.pending = false;
        }
        self.last_key
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
