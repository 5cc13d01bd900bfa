//! Recover checksummed records from a biphase Poly-88 cassette and write
//! the record bytes (header, payload, checksum) to stdout.
//!
//! Checksum failures are reported on stderr with the sample indices they
//! span, and decoding continues at the next record boundary.

use anyhow::Context;
use clap::Parser;
use poly88_tape::biphase::BIPHASE_BIT_RATE;
use poly88_tape::{Audio, BiphaseDecoder, RecordFramer};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tape-biphase",
    about = "Decode Poly-88 biphase cassette records from a 16-bit RIFF WAV file."
)]
struct Args {
    /// 16-bit signed mono RIFF WAV file.
    wav_file: PathBuf,

    /// Enable debug output.
    #[arg(short = 'd')]
    debug: bool,

    /// Invert the signal (usually needed for biphase tapes).
    #[arg(short = 'p')]
    invert_phase: bool,

    /// Override the bit rate.
    #[arg(short = 'b', default_value_t = BIPHASE_BIT_RATE)]
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

    let mut decoder = BiphaseDecoder::new(&audio, args.bit_rate);
    decoder.set_debug(args.debug);
    decoder.set_start_index(args.start_index);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut framer = RecordFramer::new(decoder);
    while let Some(result) = framer.next_record() {
        match result {
            Ok(record) => {
                out.write_all(&record.header.to_bytes())?;
                out.write_all(&record.data)?;
                out.write_all(&[record.data_checksum])?;
            }
            Err(err) => eprintln!("{}", err),
        }
    }
    out.flush()?;
    Ok(())
}
