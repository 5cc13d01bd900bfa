//! # Poly-88 Machine Emulation
//!
//! The Poly-88 was an Intel 8080 microcomputer with a 16x64 character
//! memory-mapped display, a keyboard on a parallel port, a 60 Hz real-time
//! clock, and a cassette interface driven through a USART. This crate wires
//! the `lib8080` CPU core into that machine:
//!
//! - [`memory::TieredMemory`] - the 64 KiB address space with ROM overlay,
//!   guard window and video RAM
//! - [`rom_image::RomImage`] - the textual ROM dump format
//! - [`devices`] - keyboard, timer, USART + control, baud-rate selector
//! - [`media::MediaQueue`] - the ordered tape-file queue the USART consumes
//! - [`system::Poly88`] - the assembled machine and its run loop
//! - [`system::Emulator`] - the execution thread and the controls a shell
//!   calls from its UI thread
//!
//! The graphical shell itself is not part of this crate; it consumes the
//! read-only memory view, register snapshots, run controls and the
//! media-wanted notification exposed by [`system::Emulator`].

pub mod devices;
pub mod media;
pub mod memory;
pub mod rom_image;
pub mod system;

pub use media::{MediaEntry, MediaQueue};
pub use memory::TieredMemory;
pub use rom_image::{RomImage, RomImageError};
pub use system::{Emulator, Poly88, SliceOutcome};
