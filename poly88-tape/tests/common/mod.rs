//! Waveform synthesis helpers shared by the decoder tests.
#![allow(dead_code)]

/// Amplitude used for synthesized signals.
pub const AMPLITUDE: f64 = 12000.0;

/// Expand bytes to bits, LSB first.
pub fn bytes_to_bits_lsb(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_index in 0..8 {
            bits.push((byte >> bit_index) & 1);
        }
    }
    bits
}

/// Frame one byte the way the 300-baud tapes do: start bit, 8 data bits
/// LSB first, two stop bits.
pub fn fsk_frame_byte(byte: u8) -> Vec<u8> {
    let mut bits = vec![0u8];
    for bit_index in 0..8 {
        bits.push((byte >> bit_index) & 1);
    }
    bits.push(1);
    bits.push(1);
    bits
}

/// Synthesize two-tone FSK: a `0` bit is 1,200 Hz, a `1` bit 2,400 Hz,
/// each bit restarting the tone at phase zero (the tones fit whole cycles
/// per cell, so the waveform stays continuous).
pub fn fsk_samples(bits: &[u8], sample_rate: u32, bit_rate: u32) -> Vec<i16> {
    let samples_per_bit = (sample_rate / bit_rate) as usize;
    let mut samples = Vec::with_capacity(bits.len() * samples_per_bit);
    for &bit in bits {
        let freq = if bit != 0 { 2400.0 } else { 1200.0 };
        for i in 0..samples_per_bit {
            let t = i as f64 / sample_rate as f64;
            let value = (2.0 * std::f64::consts::PI * freq * t).sin();
            samples.push((value * AMPLITUDE) as i16);
        }
    }
    samples
}

/// Frame a whole byte-framed tape: an idle-tone leader, the framed bytes,
/// and a short idle trailer.
pub fn fsk_tape(bytes: &[u8], leader_bits: usize, sample_rate: u32, bit_rate: u32) -> Vec<i16> {
    let mut bits = vec![1u8; leader_bits];
    for &byte in bytes {
        bits.extend(fsk_frame_byte(byte));
    }
    bits.extend([1u8; 4]);
    fsk_samples(&bits, sample_rate, bit_rate)
}

/// Synthesize the biphase line code the one-shot decoder expects: the
/// second half of each cell carries the bit level, the first half carries
/// the complement of the previous bit's level, which puts a transition on
/// every cell boundary.
pub fn biphase_samples(bits: &[u8], samples_per_bit: usize) -> Vec<i16> {
    let amplitude = AMPLITUDE as i16;
    let half = samples_per_bit / 2;
    let mut samples = Vec::with_capacity(bits.len() * samples_per_bit);
    let mut prev = 0u8;
    for &bit in bits {
        let first = if prev != 0 { -amplitude } else { amplitude };
        let second = if bit != 0 { amplitude } else { -amplitude };
        samples.extend(std::iter::repeat(first).take(half));
        samples.extend(std::iter::repeat(second).take(samples_per_bit - half));
        prev = bit;
    }
    samples
}

/// A biphase tape: leading silence (whole cells), then the bit stream,
/// then trailing silence.
pub fn biphase_tape(
    silence_cells: usize,
    bits: &[u8],
    trailer_cells: usize,
    samples_per_bit: usize,
) -> Vec<i16> {
    let mut samples = vec![0i16; silence_cells * samples_per_bit];
    samples.extend(biphase_samples(bits, samples_per_bit));
    samples.extend(vec![0i16; trailer_cells * samples_per_bit]);
    samples
}
