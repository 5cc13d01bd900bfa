//! Poly-88 tape record structure and the record framer.
//!
//! On tape a record is:
//!
//! ```text
//! 0xE6 (>=1 sync) . SOH=0x01 . name[8] . record_number[LE16] .
//! data_length[u8] . record_address[LE16] . type[u8] . header_checksum .
//! data[data_length, 0 meaning 256] . data_checksum
//! ```
//!
//! Both checksums are zero-sum: the 8-bit sum of every covered byte,
//! including the checksum byte itself, is zero. A checksum failure is
//! reported with the sample indices spanning the affected record and
//! decoding resumes at the next record boundary.

use crate::audio::AudioError;

/// Record synchronization byte.
pub const SYNC: u8 = 0xE6;
/// Start-of-header sentinel following the sync run.
pub const SOH: u8 = 0x01;

/// Encoded length of the header, SOH excluded.
pub const HEADER_LEN: usize = 15;

/// Record type field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Data,
    Comment,
    EndOfFile,
    AutoExecute,
    Other(u8),
}

impl From<u8> for RecordType {
    fn from(value: u8) -> Self {
        match value {
            0 => RecordType::Data,
            1 => RecordType::Comment,
            2 => RecordType::EndOfFile,
            3 => RecordType::AutoExecute,
            other => RecordType::Other(other),
        }
    }
}

/// The record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Tape name, space padded.
    pub name: [u8; 8],
    pub record_number: u16,
    /// Payload length; 0 encodes 256.
    pub data_length: u8,
    /// Load address for the payload.
    pub record_address: u16,
    pub record_type: u8,
    /// Makes the 8-bit sum of all header bytes zero.
    pub checksum: u8,
}

impl RecordHeader {
    /// Build a header with its checksum computed.
    pub fn new(
        name: [u8; 8],
        record_number: u16,
        data_length: u8,
        record_address: u16,
        record_type: u8,
    ) -> Self {
        let mut header = Self {
            name,
            record_number,
            data_length,
            record_address,
            record_type,
            checksum: 0,
        };
        header.checksum = 0u8.wrapping_sub(header.sum());
        header
    }

    pub fn record_type(&self) -> RecordType {
        RecordType::from(self.record_type)
    }

    /// Payload length in bytes; the 0 value encodes 256.
    pub fn payload_len(&self) -> usize {
        if self.data_length == 0 {
            256
        } else {
            self.data_length as usize
        }
    }

    /// Wire layout, checksum included.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..8].copy_from_slice(&self.name);
        bytes[8..10].copy_from_slice(&self.record_number.to_le_bytes());
        bytes[10] = self.data_length;
        bytes[11..13].copy_from_slice(&self.record_address.to_le_bytes());
        bytes[13] = self.record_type;
        bytes[14] = self.checksum;
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Self {
        let mut name = [0u8; 8];
        name.copy_from_slice(&bytes[0..8]);
        Self {
            name,
            record_number: u16::from_le_bytes([bytes[8], bytes[9]]),
            data_length: bytes[10],
            record_address: u16::from_le_bytes([bytes[11], bytes[12]]),
            record_type: bytes[13],
            checksum: bytes[14],
        }
    }

    /// 8-bit sum of every header byte including the checksum; zero when
    /// the header is intact.
    pub fn sum(&self) -> u8 {
        self.to_bytes()
            .iter()
            .fold(0u8, |sum, &byte| sum.wrapping_add(byte))
    }
}

/// A recovered record: header, payload, and the trailing checksum byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: RecordHeader,
    pub data: Vec<u8>,
    pub data_checksum: u8,
}

impl Record {
    /// Build a record with both checksums computed.
    ///
    /// `data` must be 1..=256 bytes; 256 encodes as a zero length field.
    pub fn new(
        name: [u8; 8],
        record_number: u16,
        record_address: u16,
        record_type: u8,
        data: Vec<u8>,
    ) -> Self {
        debug_assert!((1..=256).contains(&data.len()));
        let data_length = if data.len() == 256 {
            0
        } else {
            data.len() as u8
        };
        let header = RecordHeader::new(name, record_number, data_length, record_address, record_type);
        let sum = data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte));
        Self {
            header,
            data,
            data_checksum: 0u8.wrapping_sub(sum),
        }
    }

    /// 8-bit sum of the payload plus its checksum byte; zero when intact.
    pub fn payload_sum(&self) -> u8 {
        self.data
            .iter()
            .fold(self.data_checksum, |sum, &byte| sum.wrapping_add(byte))
    }

    /// Serialize to the wire layout with `sync_count` leading sync bytes.
    pub fn encode(&self, sync_count: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(sync_count + 1 + HEADER_LEN + self.data.len() + 1);
        bytes.resize(sync_count, SYNC);
        bytes.push(SOH);
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.data);
        bytes.push(self.data_checksum);
        bytes
    }
}

/// Which region of a record failed its checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumRegion {
    Header,
    Payload,
}

/// Non-fatal per-record decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A zero-sum check failed; `start_index..end_index` spans the
    /// affected region in source positions (sample indices for audio
    /// sources).
    ChecksumMismatch {
        region: ChecksumRegion,
        start_index: usize,
        end_index: usize,
    },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RecordError::ChecksumMismatch {
                region,
                start_index,
                end_index,
            } => {
                let what = match region {
                    ChecksumRegion::Header => "header",
                    ChecksumRegion::Payload => "data",
                };
                write!(
                    f,
                    "{} checksum mismatch in record spanning indices {}..{}",
                    what, start_index, end_index
                )
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// A synchronizable source of record bytes.
///
/// Implemented by both audio decoders and by [`ByteStream`] for
/// already-demodulated data.
pub trait RecordByteSource {
    /// Current position (sample index for audio sources, byte offset for
    /// byte streams), used in checksum reports.
    fn position(&self) -> usize;

    /// Align to and consume the first sync byte of the next record.
    fn sync_to_record(&mut self) -> Result<(), AudioError>;

    /// Read the next byte after synchronization.
    fn read_byte(&mut self) -> Result<u8, AudioError>;
}

/// A byte-stream source for data that is already demodulated (or freshly
/// encoded, for round-trip checks).
pub struct ByteStream {
    bytes: Vec<u8>,
    position: usize,
}

impl ByteStream {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, position: 0 }
    }
}

impl RecordByteSource for ByteStream {
    fn position(&self) -> usize {
        self.position
    }

    fn sync_to_record(&mut self) -> Result<(), AudioError> {
        loop {
            if self.read_byte()? == SYNC {
                return Ok(());
            }
        }
    }

    fn read_byte(&mut self) -> Result<u8, AudioError> {
        match self.bytes.get(self.position) {
            Some(&byte) => {
                self.position += 1;
                Ok(byte)
            }
            None => Err(AudioError::Eof),
        }
    }
}

/// Recovers checksummed records from a byte source.
///
/// The framer walks four phases per record: hunting for sync, consuming
/// the sync run, reading the header, then the payload. Checksum failures
/// are returned per record and the next call resumes hunting at the
/// following record boundary.
pub struct RecordFramer<S: RecordByteSource> {
    source: S,
}

impl<S: RecordByteSource> RecordFramer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying source (for position reporting).
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decode the next record.
    ///
    /// `None` at end of audio; `Some(Err(..))` for a record that framed
    /// but failed a checksum.
    pub fn next_record(&mut self) -> Option<Result<Record, RecordError>> {
        loop {
            match self.source.sync_to_record() {
                Ok(()) => {}
                Err(AudioError::Eof) => return None,
                Err(err) => {
                    log::warn!("tape decode stopped: {}", err);
                    return None;
                }
            }
            let start_index = self.source.position();

            // Consume the rest of the sync run; the first non-sync byte
            // must open the header.
            let mut byte = match self.source.read_byte() {
                Ok(byte) => byte,
                Err(_) => return None,
            };
            while byte == SYNC {
                byte = match self.source.read_byte() {
                    Ok(byte) => byte,
                    Err(_) => return None,
                };
            }
            if byte != SOH {
                log::debug!(
                    "expected SOH after sync at index {}, got {:02x}",
                    self.source.position(),
                    byte
                );
                continue;
            }

            let mut header_bytes = [0u8; HEADER_LEN];
            for slot in header_bytes.iter_mut() {
                match self.source.read_byte() {
                    Ok(byte) => *slot = byte,
                    Err(_) => return None,
                }
            }
            let header = RecordHeader::from_bytes(&header_bytes);
            if header.sum() != 0 {
                return Some(Err(RecordError::ChecksumMismatch {
                    region: ChecksumRegion::Header,
                    start_index,
                    end_index: self.source.position(),
                }));
            }

            let mut data = vec![0u8; header.payload_len()];
            for slot in data.iter_mut() {
                match self.source.read_byte() {
                    Ok(byte) => *slot = byte,
                    Err(_) => return None,
                }
            }
            let data_checksum = match self.source.read_byte() {
                Ok(byte) => byte,
                Err(_) => return None,
            };

            let record = Record {
                header,
                data,
                data_checksum,
            };
            if record.payload_sum() != 0 {
                return Some(Err(RecordError::ChecksumMismatch {
                    region: ChecksumRegion::Payload,
                    start_index,
                    end_index: self.source.position(),
                }));
            }
            return Some(Ok(record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record::new(*b"HELLO   ", 0x0001, 0x2000, 0, vec![0x11, 0x22, 0x33])
    }

    #[test]
    fn test_header_checksum_is_zero_sum() {
        let record = sample_record();
        assert_eq!(record.header.sum(), 0);
        // Concretely: the sum of all other bytes plus the checksum wraps
        // to zero.
        let bytes = record.header.to_bytes();
        let total = bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        assert_eq!(total, 0);
    }

    #[test]
    fn test_payload_checksum_matches_spec_formula() {
        let record = sample_record();
        // 0x100 - (0x11 + 0x22 + 0x33) mod 256
        assert_eq!(record.data_checksum, (0x100u16 - 0x66) as u8);
        assert_eq!(record.payload_sum(), 0);
    }

    #[test]
    fn test_header_wire_layout() {
        let record = sample_record();
        let bytes = record.header.to_bytes();
        assert_eq!(&bytes[0..8], b"HELLO   ");
        assert_eq!(&bytes[8..10], &[0x01, 0x00]); // record number LE
        assert_eq!(bytes[10], 0x03); // data length
        assert_eq!(&bytes[11..13], &[0x00, 0x20]); // load address LE
        assert_eq!(bytes[13], 0x00); // type
        let round_trip = RecordHeader::from_bytes(&bytes);
        assert_eq!(round_trip, record.header);
    }

    #[test]
    fn test_zero_length_means_256() {
        let record = Record::new(*b"BIG     ", 2, 0x3000, 0, vec![0xAB; 256]);
        assert_eq!(record.header.data_length, 0);
        assert_eq!(record.header.payload_len(), 256);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let record = sample_record();
        let mut framer = RecordFramer::new(ByteStream::new(record.encode(4)));

        let decoded = framer.next_record().unwrap().unwrap();
        assert_eq!(decoded, record);
        assert!(framer.next_record().is_none());
    }

    #[test]
    fn test_multiple_records_stream() {
        let first = sample_record();
        let second = Record::new(*b"HELLO   ", 0x0002, 0x2100, 2, vec![0x00]);
        let mut bytes = first.encode(3);
        bytes.extend(second.encode(3));
        let mut framer = RecordFramer::new(ByteStream::new(bytes));

        assert_eq!(framer.next_record().unwrap().unwrap(), first);
        let decoded = framer.next_record().unwrap().unwrap();
        assert_eq!(decoded.header.record_type(), RecordType::EndOfFile);
        assert!(framer.next_record().is_none());
    }

    #[test]
    fn test_header_checksum_mismatch_reports_span_and_resumes() {
        let good = sample_record();
        let mut bad = good.clone();
        bad.header.checksum = bad.header.checksum.wrapping_add(1);

        let mut bytes = bad.encode(2);
        bytes.extend(good.encode(2));
        let mut framer = RecordFramer::new(ByteStream::new(bytes));

        match framer.next_record().unwrap() {
            Err(RecordError::ChecksumMismatch {
                region: ChecksumRegion::Header,
                start_index,
                end_index,
            }) => {
                assert!(start_index < end_index);
            }
            other => panic!("expected header checksum mismatch, got {:?}", other),
        }

        // Decoding continues at the next record boundary.
        assert_eq!(framer.next_record().unwrap().unwrap(), good);
    }

    #[test]
    fn test_payload_checksum_mismatch() {
        let good = sample_record();
        let mut encoded = good.encode(2);
        let len = encoded.len();
        encoded[len - 2] ^= 0xFF; // corrupt the last data byte

        let mut framer = RecordFramer::new(ByteStream::new(encoded));
        match framer.next_record().unwrap() {
            Err(RecordError::ChecksumMismatch {
                region: ChecksumRegion::Payload,
                ..
            }) => {}
            other => panic!("expected payload checksum mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_before_sync_is_skipped() {
        let record = sample_record();
        let mut bytes = vec![0x00, 0xFF, 0x55, 0xAA];
        bytes.extend(record.encode(1));
        let mut framer = RecordFramer::new(ByteStream::new(bytes));

        assert_eq!(framer.next_record().unwrap().unwrap(), record);
    }
}
