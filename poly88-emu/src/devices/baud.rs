//! Baud-rate selector on port 4.
//!
//! The monitor writes 5 here for 2,400 baud and 6 for 300 baud before a
//! tape operation. The emulated transport is paced in software, so the
//! selection is recorded for diagnostics and otherwise ignored.

use lib8080::Device;
use std::any::Any;

/// Baud-rate selector port.
pub const BAUD_PORT: u8 = 0x04;

#[derive(Default)]
pub struct BaudRateGenerator {
    selection: u8,
}

impl BaudRateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last value written to the port.
    pub fn selection(&self) -> u8 {
        self.selection
    }
}

impl Device for BaudRateGenerator {
    fn name(&self) -> &str {
        "Baud rate generator"
    }

    fn input_port(&self) -> Option<u8> {
        Some(BAUD_PORT)
    }

    fn output_port(&self) -> Option<u8> {
        Some(BAUD_PORT)
    }

    fn read(&mut self) -> u8 {
        0
    }

    fn write(&mut self, value: u8) {
        log::debug!("baud rate selection: {:02x}", value);
        self.selection = value;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
