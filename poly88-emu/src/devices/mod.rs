//! Poly-88 peripherals.
//!
//! Four devices hang off the port bus:
//!
//! | Device | IRQ | Input port | Output port |
//! |---|---|---|---|
//! | Keyboard | 5 | 0xF8 | - |
//! | Timer (60 Hz) | 6 | - | 0x08 |
//! | USART data | 4 | 0x00 | 0x00 |
//! | USART control | - | 0x01 | 0x01 |
//! | Baud-rate selector | - | 0x04 | 0x04 |
//!
//! The ISR contract is uniform: a device's own port traffic acknowledges
//! its interrupt (the keyboard by draining its FIFO, the timer by the OUT
//! to port 8, the USART by reading or writing the data port).

mod baud;
mod keyboard;
mod timer;
mod usart;

pub use baud::{BaudRateGenerator, BAUD_PORT};
pub use keyboard::{Keyboard, KeyboardHandle, KEYBOARD_IRQ, KEYBOARD_PORT};
pub use timer::{Timer, TIMER_ACK_PORT, TIMER_IRQ};
pub use usart::{Usart, UsartControl, USART_CONTROL_PORT, USART_DATA_PORT, USART_IRQ};
