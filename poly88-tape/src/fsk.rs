//! 300-baud two-tone FSK decoding.
//!
//! A `0` bit is ~4 cycles of a 1,200 Hz tone, a `1` bit ~8 cycles of
//! 2,400 Hz. The bit classifier counts waveform peaks over one bit cell;
//! the byte framer expects a start bit (`0`), 8 data bits LSB-first, and
//! two stop bits (`1`), resynchronizing on the next zero crossing whenever
//! framing fails.

use crate::audio::{Audio, AudioError};
use crate::record::{self, RecordByteSource};

/// Nominal tape speed for byte-framed tapes.
pub const FSK_BIT_RATE: u32 = 300;

/// The `1` tone, whose half-cycle also bounds the classifier window.
const ONE_TONE_HZ: u32 = 2400;

/// Peaks closer than this are echoes of the same crest, not new cycles.
const MIN_PEAK_SPACING: usize = 10;

/// One classified bit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
    /// The peak count fits neither tone; the caller must resynchronize.
    Lost,
}

/// Offline FSK bit and byte decoder over a sample buffer.
///
/// # Examples
///
/// ```no_run
/// use poly88_tape::{Audio, FskDecoder};
/// use std::path::Path;
///
/// let audio = Audio::open(Path::new("side-a.wav")).unwrap();
/// let mut decoder = FskDecoder::new(&audio, 300);
/// decoder.set_start_index(0).unwrap();
/// while let Ok(byte) = decoder.read_byte() {
///     print!("{}", byte as char);
/// }
/// ```
pub struct FskDecoder<'a> {
    audio: &'a Audio,
    bit_rate: u32,
    synced_index: usize,
    debug: bool,
}

impl<'a> FskDecoder<'a> {
    pub fn new(audio: &'a Audio, bit_rate: u32) -> Self {
        Self {
            audio,
            bit_rate,
            synced_index: 0,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Current position as a sample index.
    pub fn sample_position(&self) -> usize {
        self.synced_index
    }

    /// Classify the bit cell starting at `index`.
    ///
    /// Counts peaks over the cell minus one 2,400 Hz half-cycle: on 0 -> 1
    /// tone changes the first cycle of the `1` skews into the current
    /// cell, and the shortened window keeps it out of the count. Returns
    /// the classified bit and the resynchronized index of the next cell
    /// (the zero crossing after the last peak).
    pub fn decode_bit(&self, index: usize) -> (Bit, usize) {
        let samples_per_bit = self.audio.samples_per_bit(self.bit_rate);
        let half_one_cycle = (self.audio.sample_rate() / ONE_TONE_HZ / 2) as usize;
        let window_end = index + samples_per_bit - half_one_cycle;

        let mut full_waves = 0u32;
        let mut last_peak: Option<usize> = None;
        let mut i = index;
        while i < window_end {
            // Count peaks, but not adjacent samples: those are noise on a
            // single crest.
            if self.audio.is_peak(i) && last_peak.map_or(true, |p| i - p > MIN_PEAK_SPACING) {
                full_waves += 1;
                last_peak = Some(i);
            }
            i += 1;
        }

        // Edge cases are hard to get exactly right in the face of signal
        // noise, so the counts are fudged by one cycle either way.
        let bit = match full_waves {
            3..=5 => Bit::Zero,
            7..=9 => Bit::One,
            _ => Bit::Lost,
        };

        let next = match last_peak {
            Some(peak) => self.audio.next_zero_crossing(peak, 0),
            None => index,
        };
        (bit, next)
    }

    /// The index of the next zero crossing that classifies as a valid bit.
    pub fn sync_to_valid_bit(&self, mut index: usize) -> Result<usize, AudioError> {
        let last_index = self
            .audio
            .len()
            .saturating_sub(2 * self.audio.samples_per_bit(self.bit_rate));
        while index < last_index {
            index = self.audio.next_zero_crossing(index, 0);
            let (bit, _) = self.decode_bit(index);
            if bit != Bit::Lost {
                return Ok(index);
            }
            index += 1;
        }
        Err(AudioError::Eof)
    }

    /// Position the decoder at the first valid bit at or after `index`.
    pub fn set_start_index(&mut self, index: usize) -> Result<(), AudioError> {
        self.synced_index = self.sync_to_valid_bit(index)?;
        Ok(())
    }

    /// Try to read start/8-data/2-stop at `index`.
    ///
    /// `None` means framing failed (bad start bit, lost cell, or bad stop
    /// bits); the accompanying index is where the failure was noticed, for
    /// the resync scan.
    fn read_byte_unsynced(&self, index: usize) -> (Option<u8>, usize) {
        let (start_bit, after_start) = self.decode_bit(index);
        if start_bit != Bit::Zero {
            return (None, index);
        }
        let mut index = after_start;

        let mut byte = 0u8;
        for bit_index in 0..8 {
            let (bit, next) = self.decode_bit(index);
            match bit {
                Bit::One => byte |= 1 << bit_index,
                Bit::Zero => {}
                Bit::Lost => return (None, index),
            }
            if self.debug {
                log::debug!(
                    "{}, {:.6}s: data bit #{} = {:?}",
                    index,
                    self.audio.time_offset(index),
                    bit_index,
                    bit
                );
            }
            index = next;
        }

        for _ in 0..2 {
            let (bit, next) = self.decode_bit(index);
            if bit != Bit::One {
                return (None, index);
            }
            index = next;
        }

        (Some(byte), index)
    }

    /// Read the next byte, resynchronizing across framing failures.
    ///
    /// On failure the scan advances a few samples and hunts forward for
    /// the next zero crossing that yields a valid bit; only running out of
    /// audio ends the stream.
    pub fn read_byte(&mut self) -> Result<u8, AudioError> {
        loop {
            if self.debug {
                log::debug!("{}", self.audio.dump(self.synced_index));
            }
            let (byte, next) = self.read_byte_unsynced(self.synced_index);
            match byte {
                Some(byte) => {
                    self.synced_index = next;
                    return Ok(byte);
                }
                None => {
                    self.synced_index += 4;
                    self.synced_index = self.sync_to_valid_bit(self.synced_index)?;
                }
            }
        }
    }
}

impl RecordByteSource for FskDecoder<'_> {
    fn position(&self) -> usize {
        self.synced_index
    }

    /// Byte-framed tapes carry their sync bytes in the ordinary framing,
    /// so the hunt is simply "read until 0xE6".
    fn sync_to_record(&mut self) -> Result<(), AudioError> {
        loop {
            if self.read_byte()? == record::SYNC {
                return Ok(());
            }
        }
    }

    fn read_byte(&mut self) -> Result<u8, AudioError> {
        FskDecoder::read_byte(self)
    }
}
