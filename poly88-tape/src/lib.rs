//! # Poly-88 Cassette Audio Decoding
//!
//! Offline recovery of byte streams from sampled audio of Poly-88
//! cassettes. Two physical encodings are supported:
//!
//! - **300-baud two-tone FSK** ([`fsk`]): a `0` bit is ~4 cycles of a
//!   1,200 Hz tone, a `1` bit ~8 cycles of 2,400 Hz; bytes are framed
//!   with a start bit and two stop bits
//! - **Biphase at 2,400 bit/s** ([`biphase`]): a one-shot samples the
//!   signal sign at 0.75 of each bit cell; cell boundaries carry a
//!   guaranteed transition used to re-synchronize
//!
//! Above the bit layer, [`record`] recovers the Poly-88 record structure
//! (sync bytes, SOH, 13-byte header, payload, zero-sum checksums) and
//! reports checksum failures with the sample indices they span.
//!
//! The pipeline is: WAV file -> [`audio::Audio`] -> bit decoder -> byte
//! framer -> [`record::RecordFramer`] -> records.

pub mod audio;
pub mod biphase;
pub mod fsk;
pub mod record;

pub use audio::{Audio, AudioError};
pub use biphase::BiphaseDecoder;
pub use fsk::FskDecoder;
pub use record::{Record, RecordError, RecordFramer, RecordHeader};
