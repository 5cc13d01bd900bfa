//! End-to-end record recovery, including the WAV-file path.

mod common;

use common::fsk_tape;
use poly88_tape::record::{ByteStream, Record, RecordFramer, RecordType};
use poly88_tape::{Audio, FskDecoder};
use std::path::PathBuf;

const SAMPLE_RATE: u32 = 44_100;
const BIT_RATE: u32 = 300;

fn temp_wav(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "poly88_tape_{}_{}.wav",
        tag,
        std::process::id()
    ))
}

fn write_wav(path: &PathBuf, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// The worked single-record scenario: name "HELLO   ", record 1, three
/// data bytes to load at 0x2000, checksums zero-sum.
fn hello_record() -> Record {
    Record::new(*b"HELLO   ", 0x0001, 0x2000, 0, vec![0x11, 0x22, 0x33])
}

#[test]
fn test_wav_record_round_trip() {
    let record = hello_record();
    let path = temp_wav("hello");
    write_wav(&path, &fsk_tape(&record.encode(6), 16, SAMPLE_RATE, BIT_RATE));

    let audio = Audio::open(&path).unwrap();
    assert_eq!(audio.sample_rate(), SAMPLE_RATE);

    let mut decoder = FskDecoder::new(&audio, BIT_RATE);
    decoder.set_start_index(0).unwrap();
    let mut framer = RecordFramer::new(decoder);

    let decoded = framer.next_record().unwrap().unwrap();

    // The recovered record, field by field.
    assert_eq!(&decoded.header.name, b"HELLO   ");
    assert_eq!(decoded.header.record_number, 0x0001);
    assert_eq!(decoded.header.data_length, 0x03);
    assert_eq!(decoded.header.record_address, 0x2000);
    assert_eq!(decoded.header.record_type(), RecordType::Data);
    assert_eq!(decoded.header.sum(), 0); // header checksum verifies
    assert_eq!(decoded.data, vec![0x11, 0x22, 0x33]);
    assert_eq!(decoded.data_checksum, (0x100u16 - 0x66) as u8);
    assert_eq!(decoded, record);

    assert!(framer.next_record().is_none());
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_wav_unsupported_format_rejected() {
    let path = temp_wav("stereo");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..64 {
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    assert!(matches!(
        Audio::open(&path),
        Err(poly88_tape::AudioError::UnsupportedFormat { channels: 2, .. })
    ));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_wav_is_open_error() {
    let missing = temp_wav("definitely_missing");
    std::fs::remove_file(&missing).ok();
    assert!(matches!(
        Audio::open(&missing),
        Err(poly88_tape::AudioError::Open(_))
    ));
}

#[test]
fn test_two_records_over_audio() {
    let first = hello_record();
    let second = Record::new(*b"HELLO   ", 0x0002, 0x0000, 2, vec![0x00]);
    let mut bytes = first.encode(6);
    bytes.extend(second.encode(6));

    let audio = Audio::from_samples(fsk_tape(&bytes, 16, SAMPLE_RATE, BIT_RATE), SAMPLE_RATE);
    let mut decoder = FskDecoder::new(&audio, BIT_RATE);
    decoder.set_start_index(0).unwrap();
    let mut framer = RecordFramer::new(decoder);

    assert_eq!(framer.next_record().unwrap().unwrap(), first);
    let eof_record = framer.next_record().unwrap().unwrap();
    assert_eq!(eof_record.header.record_type(), RecordType::EndOfFile);
    assert!(framer.next_record().is_none());
}

#[test]
fn test_byte_stream_source_round_trip() {
    // The byte-level round trip without any modulation underneath.
    let records = [
        hello_record(),
        Record::new(*b"AUTOEXEC", 0x0003, 0x0C00, 3, vec![0xC3, 0x00, 0x0C]),
    ];
    let mut bytes = Vec::new();
    for record in &records {
        bytes.extend(record.encode(4));
    }

    let mut framer = RecordFramer::new(ByteStream::new(bytes));
    assert_eq!(framer.next_record().unwrap().unwrap(), records[0]);
    let auto = framer.next_record().unwrap().unwrap();
    assert_eq!(auto.header.record_type(), RecordType::AutoExecute);
    assert_eq!(auto, records[1]);
    assert!(framer.next_record().is_none());
}
