//! Sampled-audio ingestion and signal search primitives.
//!
//! The decoder works on 16-bit signed mono PCM. The WAV reader honours the
//! fmt chunk's sample rate; anything but 16-bit mono integer samples is
//! rejected. All the searches here are index-based so that errors can be
//! reported in sample positions.

use std::path::Path;

/// Errors from audio ingestion and traversal.
#[derive(Debug)]
pub enum AudioError {
    /// The WAV file could not be opened or its header parsed.
    Open(hound::Error),
    /// The data chunk ended before the promised sample count.
    Truncated(hound::Error),
    /// Not 16-bit signed mono PCM.
    UnsupportedFormat { channels: u16, bits: u16 },
    /// Ran out of samples; normal end of decoding.
    Eof,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AudioError::Open(err) => write!(f, "can't open audio file: {}", err),
            AudioError::Truncated(err) => write!(f, "audio file truncated: {}", err),
            AudioError::UnsupportedFormat { channels, bits } => write!(
                f,
                "unsupported audio format: {} channel(s), {} bits (need 16-bit mono PCM)",
                channels, bits
            ),
            AudioError::Eof => write!(f, "ran out of audio data"),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::Open(err) | AudioError::Truncated(err) => Some(err),
            _ => None,
        }
    }
}

/// A fully-loaded mono sample buffer.
pub struct Audio {
    samples: Vec<i16>,
    sample_rate: u32,
    invert_phase: bool,
}

impl Audio {
    /// Load a RIFF/WAVE file; 16-bit signed mono PCM only.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let mut reader = hound::WavReader::open(path).map_err(AudioError::Open)?;
        let spec = reader.spec();
        if spec.channels != 1
            || spec.bits_per_sample != 16
            || spec.sample_format != hound::SampleFormat::Int
        {
            return Err(AudioError::UnsupportedFormat {
                channels: spec.channels,
                bits: spec.bits_per_sample,
            });
        }

        let samples = reader
            .samples::<i16>()
            .collect::<Result<Vec<i16>, _>>()
            .map_err(AudioError::Truncated)?;

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            invert_phase: false,
        })
    }

    /// Wrap an in-memory sample buffer (tests, synthesized signals).
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            invert_phase: false,
        }
    }

    /// Negate every sample (for tapes recorded with inverted polarity).
    pub fn set_invert_phase(&mut self, invert: bool) {
        self.invert_phase = invert;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sample value at `index`; out-of-range reads are 0.
    pub fn value(&self, index: usize) -> i16 {
        let raw = self.samples.get(index).copied().unwrap_or(0);
        if self.invert_phase {
            raw.saturating_neg()
        } else {
            raw
        }
    }

    pub fn is_negative(&self, index: usize) -> bool {
        self.value(index) < 0
    }

    /// Samples per encoded bit at the given rate.
    pub fn samples_per_bit(&self, bit_rate: u32) -> usize {
        (self.sample_rate / bit_rate) as usize
    }

    /// The time position of a sample index, for diagnostics.
    pub fn time_offset(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }

    /// Index of the next negative-to-positive crossing at or after `index`.
    ///
    /// Returns the last searchable index if no crossing remains; callers
    /// bound their own reads.
    pub fn next_zero_crossing(&self, mut index: usize, hysteresis: i32) -> usize {
        while index + 1 < self.len() {
            if i32::from(self.value(index)) - hysteresis < 0
                && i32::from(self.value(index + 1)) - hysteresis >= 0
            {
                break;
            }
            index += 1;
        }
        index
    }

    /// Index of the next transition of either polarity at or after `index`.
    pub fn next_transition(&self, mut index: usize, hysteresis: i32) -> Result<usize, AudioError> {
        while index + 1 < self.len() {
            let here = i32::from(self.value(index));
            let next = i32::from(self.value(index + 1));
            if (here - hysteresis < 0 && next - hysteresis >= 0)
                || (here + hysteresis >= 0 && next + hysteresis < 0)
            {
                return Ok(index);
            }
            index += 1;
        }
        Err(AudioError::Eof)
    }

    /// Detect a regional high point.
    ///
    /// Plateaus count (`30 40 50 50 50 40 30`), so noisy signals produce
    /// clusters of peaks; callers reject peaks closer than a few samples.
    pub fn is_peak(&self, index: usize) -> bool {
        if index == 0 || index + 1 >= self.len() {
            return false;
        }
        !self.is_negative(index)
            && self.value(index - 1) <= self.value(index)
            && self.value(index) >= self.value(index + 1)
    }

    /// A few samples around `index`, for debug output.
    pub fn dump(&self, index: usize) -> String {
        let mut out = format!("{}, {:.6}s:", index, self.time_offset(index));
        for i in index.saturating_sub(3)..index {
            out.push_str(&format!(" {}", self.value(i)));
        }
        out.push_str(&format!(" ({})", self.value(index)));
        for i in index + 1..index + 4 {
            out.push_str(&format!(" {}", self.value(i)));
        }
        out
    }
}
