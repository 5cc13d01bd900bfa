//! Biphase decoding at 2,400 bit/s.
//!
//! The cassette board's one-shot fires at 0.75 of each bit cell and
//! samples the signal sign; that sign is the bit. The line code puts a
//! transition on every cell boundary, so phase is recovered
//! opportunistically: after a `1 -> 0` bit sequence the next transition
//! past the trigger point is exactly a cell boundary, and the decoder
//! snaps to it. Everywhere else the cell index advances open-loop by one
//! cell.
//!
//! Records are framed with `0xE6` sync bytes. The hunt reads candidate
//! bytes and, on mismatch, slips the cell index by a quarter cell until a
//! sync byte latches; the single start bit that follows the latched sync
//! is skipped once for the whole record.

use crate::audio::{Audio, AudioError};
use crate::record::{self, RecordByteSource};

/// Nominal bit rate of the Poly-88 cassette record format.
pub const BIPHASE_BIT_RATE: u32 = 2400;

/// Transition-detector hysteresis, out of the 32,767 sample range. The
/// comparator datasheet asks for about 4 mV on a 1 V line level.
pub const BIPHASE_HYSTERESIS: i32 = 200;

/// Offline biphase bit and byte decoder over a sample buffer.
pub struct BiphaseDecoder<'a> {
    audio: &'a Audio,
    bit_rate: u32,
    cell_index: usize,
    prev_bit: Option<u8>,
    debug: bool,
}

impl<'a> BiphaseDecoder<'a> {
    pub fn new(audio: &'a Audio, bit_rate: u32) -> Self {
        Self {
            audio,
            bit_rate,
            cell_index: 0,
            prev_bit: None,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Position the decoder at a cell boundary (sample index).
    pub fn set_start_index(&mut self, index: usize) {
        self.cell_index = index;
        self.prev_bit = None;
    }

    /// Current position as a sample index.
    pub fn sample_position(&self) -> usize {
        self.cell_index
    }

    fn samples_per_bit(&self) -> usize {
        self.audio.samples_per_bit(self.bit_rate)
    }

    /// Decode the bit cell at the current index and advance.
    pub fn read_bit(&mut self) -> Result<u8, AudioError> {
        let samples_per_bit = self.samples_per_bit();
        let trigger = self.cell_index + (samples_per_bit * 3) / 4;
        if trigger >= self.audio.len() {
            return Err(AudioError::Eof);
        }

        let bit = u8::from(self.audio.value(trigger) > 0);
        if self.debug {
            log::debug!(
                "{}, {:.6}s: bit {}",
                self.cell_index,
                self.audio.time_offset(self.cell_index),
                bit
            );
        }

        if self.prev_bit == Some(1) && bit == 0 {
            // The encoding guarantees that the transition following the
            // trigger is a cell boundary here; snap the phase to it.
            let edge = self.audio.next_transition(trigger, BIPHASE_HYSTERESIS)?;
            self.cell_index = edge + 1;
        } else {
            self.cell_index += samples_per_bit;
        }
        self.prev_bit = Some(bit);
        Ok(bit)
    }

    /// Read 8 data bits, LSB first, with no framing bits.
    pub fn read_raw_byte(&mut self) -> Result<u8, AudioError> {
        let mut byte = 0u8;
        for bit_index in 0..8 {
            byte |= self.read_bit()? << bit_index;
        }
        Ok(byte)
    }
}

impl RecordByteSource for BiphaseDecoder<'_> {
    fn position(&self) -> usize {
        self.cell_index
    }

    /// Hunt for a sync byte by quarter-cell slips, then skip the record's
    /// single start bit.
    fn sync_to_record(&mut self) -> Result<(), AudioError> {
        let quarter_cell = (self.samples_per_bit() / 4).max(1);
        let mut mark = self.cell_index;
        loop {
            self.set_start_index(mark);
            let candidate = self.read_raw_byte()?;
            if candidate == record::SYNC {
                if self.debug {
                    log::debug!("sync byte latched at sample {}", mark);
                }
                // One start bit for the whole record, not one per byte.
                self.read_bit()?;
                return Ok(());
            }
            mark += quarter_cell;
        }
    }

    fn read_byte(&mut self) -> Result<u8, AudioError> {
        self.read_raw_byte()
    }
}
