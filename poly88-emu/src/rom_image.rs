//! Textual ROM dump format.
//!
//! A ROM image is plain text of whitespace-separated hexadecimal tokens:
//!
//! ```text
//! 0000 c3 00 0c
//! 0003 f3 31 00
//!      24 3e 96
//! # comment lines and blank lines are skipped
//! ```
//!
//! A line whose first token parses as a 4-digit address restarts the
//! cursor check there and carries up to three data bytes; a line without a
//! leading address continues from the running cursor. An explicit address
//! that disagrees with the cursor is a non-fatal warning and the cursor
//! wins. Lines with zero or more than three data bytes are warned about
//! and skipped.

use std::fmt::Write as _;
use std::path::Path;

/// Errors that abort ROM loading.
#[derive(Debug)]
pub enum RomImageError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The accumulated bytes exceed the 64 KiB address space.
    TooLarge { size: usize },
}

impl std::fmt::Display for RomImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RomImageError::Io(err) => write!(f, "failed to read ROM file: {}", err),
            RomImageError::TooLarge { size } => {
                write!(f, "ROM image larger than addressable memory ({} bytes)", size)
            }
        }
    }
}

impl std::error::Error for RomImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RomImageError::Io(err) => Some(err),
            RomImageError::TooLarge { .. } => None,
        }
    }
}

impl From<std::io::Error> for RomImageError {
    fn from(err: std::io::Error) -> Self {
        RomImageError::Io(err)
    }
}

/// A loaded ROM image, based at address 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    bytes: Vec<u8>,
}

impl RomImage {
    /// Load a ROM image from a text file.
    pub fn load(path: &Path) -> Result<Self, RomImageError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse ROM image text.
    ///
    /// Malformed lines are skipped with a warning; only an oversize image
    /// fails the load.
    pub fn parse(text: &str) -> Result<Self, RomImageError> {
        let mut bytes = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let data_tokens = match parse_address_token(tokens[0]) {
                Some(file_addr) => {
                    if file_addr as usize != bytes.len() {
                        log::warn!(
                            "lost sync at address {:04x} (file says {:04x})",
                            bytes.len(),
                            file_addr
                        );
                    }
                    &tokens[1..]
                }
                None => &tokens[..],
            };

            if data_tokens.is_empty() || data_tokens.len() > 3 {
                log::warn!(
                    "wrong number of bytes ({}) at address {:04x}; line skipped",
                    data_tokens.len(),
                    bytes.len()
                );
                continue;
            }

            let mut values = Vec::with_capacity(3);
            let mut malformed = false;
            for token in data_tokens {
                match u8::from_str_radix(token, 16) {
                    Ok(value) => values.push(value),
                    Err(_) => {
                        log::warn!(
                            "unparseable token '{}' at address {:04x}; line skipped",
                            token,
                            bytes.len()
                        );
                        malformed = true;
                        break;
                    }
                }
            }
            if malformed {
                continue;
            }

            bytes.extend_from_slice(&values);
            if bytes.len() > 0x1_0000 {
                return Err(RomImageError::TooLarge { size: bytes.len() });
            }
        }

        Ok(Self { bytes })
    }

    /// The loaded bytes, based at address 0.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Render the image back into the text format, three bytes per line.
    ///
    /// Reparsing the dump reproduces the image exactly.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (line_index, chunk) in self.bytes.chunks(3).enumerate() {
            let _ = write!(out, "{:04x}", line_index * 3);
            for byte in chunk {
                let _ = write!(out, " {:02x}", byte);
            }
            out.push('\n');
        }
        out
    }
}

/// A token is an address only if it is exactly four hex digits; data bytes
/// are written with at most two.
fn parse_address_token(token: &str) -> Option<u16> {
    if token.len() != 4 {
        return None;
    }
    u16::from_str_radix(token, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let image = RomImage::parse("0000 c3 00 0c\n0003 f3 31\n").unwrap();
        assert_eq!(image.bytes(), &[0xC3, 0x00, 0x0C, 0xF3, 0x31]);
    }

    #[test]
    fn test_parse_continuation_lines() {
        let image = RomImage::parse("0000 11 22 33\n44 55 66\n").unwrap();
        assert_eq!(image.bytes(), &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let image = RomImage::parse("# monitor ROM\n\n0000 aa\n; trailer\nbb\n").unwrap();
        assert_eq!(image.bytes(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_address_mismatch_is_nonfatal_and_cursor_wins() {
        // The explicit 0010 disagrees with the cursor (3); bytes continue
        // at the cursor anyway.
        let image = RomImage::parse("0000 11 22 33\n0010 44\n").unwrap();
        assert_eq!(image.bytes(), &[0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_too_many_bytes_skips_line() {
        let image = RomImage::parse("0000 11 22 33 44\nbb\n").unwrap();
        // First line has an address plus four values: skipped entirely.
        assert_eq!(image.bytes(), &[0xBB]);
    }

    #[test]
    fn test_address_only_line_skipped() {
        let image = RomImage::parse("0000\n11\n").unwrap();
        assert_eq!(image.bytes(), &[0x11]);
    }

    #[test]
    fn test_two_digit_tokens_are_data_not_addresses() {
        let image = RomImage::parse("00 01 02\n").unwrap();
        assert_eq!(image.bytes(), &[0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_oversize_fails() {
        let mut text = String::new();
        for _ in 0..=(0x1_0000 / 3) {
            text.push_str("aa bb cc\n");
        }
        match RomImage::parse(&text) {
            Err(RomImageError::TooLarge { .. }) => {}
            other => panic!("expected TooLarge, got {:?}", other.map(|i| i.len())),
        }
    }

    #[test]
    fn test_dump_round_trip() {
        let image = RomImage::parse("0000 c3 00 0c\nf3 31 00\n24\n").unwrap();
        let dumped = image.dump();
        let reloaded = RomImage::parse(&dumped).unwrap();
        assert_eq!(reloaded, image);
    }
}
