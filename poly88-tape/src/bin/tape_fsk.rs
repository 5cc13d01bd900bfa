//! Dump the byte stream of a 300-baud byte-framed Poly-88 tape to stdout.

use anyhow::Context;
use clap::Parser;
use poly88_tape::audio::AudioError;
use poly88_tape::fsk::FSK_BIT_RATE;
use poly88_tape::{Audio, FskDecoder};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tape-fsk",
    about = "Decode a byte-framed two-tone FSK Poly-88 tape from a 16-bit RIFF WAV file."
)]
struct Args {
    /// 16-bit signed mono RIFF WAV file.
    wav_file: PathBuf,

    /// Enable debug output.
    #[arg(short = 'd')]
    debug: bool,

    /// Invert the signal (for tapes recorded with reversed polarity).
    #[arg(short = 'p')]
    invert_phase: bool,

    /// Override the bit rate.
    #[arg(short = 'b', default_value_t = FSK_BIT_RATE)]
    bit_rate: u32,

    /// Sample index to start decoding from.
    #[arg(short = 'i', default_value_t = 0)]
    start_index: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut audio = Audio::open(&args.wav_file)
        .with_context(|| format!("can't open {}", args.wav_file.display()))?;
    audio.set_invert_phase(args.invert_phase);

    let mut decoder = FskDecoder::new(&audio, args.bit_rate);
    decoder.set_debug(args.debug);
    if let Err(err) = decoder.set_start_index(args.start_index) {
        match err {
            AudioError::Eof => return Ok(()), // nothing decodable at all
            other => return Err(other.into()),
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    loop {
        match decoder.read_byte() {
            Ok(byte) => out.write_all(&[byte])?,
            Err(AudioError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    out.flush()?;
    Ok(())
}
