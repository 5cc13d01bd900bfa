//! The assembled machine and its execution thread.

mod emulator;
mod poly88;

pub use emulator::Emulator;
pub use poly88::{Poly88, SliceOutcome};
