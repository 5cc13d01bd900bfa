//! ROM text format round-trip and robustness tests.

use poly88_emu::{RomImage, RomImageError};
use std::path::PathBuf;

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "poly88_rom_{}_{}.txt",
        tag,
        std::process::id()
    ))
}

#[test]
fn test_load_from_file() {
    let path = temp_path("load");
    std::fs::write(&path, "0000 c3 00 0c\n0003 f3 af\n").unwrap();

    let image = RomImage::load(&path).unwrap();
    assert_eq!(image.bytes(), &[0xC3, 0x00, 0x0C, 0xF3, 0xAF]);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let err = RomImage::load(&temp_path("no_such_file_really")).unwrap_err();
    assert!(matches!(err, RomImageError::Io(_)));
}

#[test]
fn test_dump_reload_reproduces_image() {
    // A few hundred bytes with every value class represented.
    let source: Vec<u8> = (0..=255u8).chain(0..=99).collect();
    let mut text = String::new();
    for (i, chunk) in source.chunks(3).enumerate() {
        text.push_str(&format!("{:04x}", i * 3));
        for byte in chunk {
            text.push_str(&format!(" {:02x}", byte));
        }
        text.push('\n');
    }

    let image = RomImage::parse(&text).unwrap();
    assert_eq!(image.bytes(), &source[..]);

    let reloaded = RomImage::parse(&image.dump()).unwrap();
    assert_eq!(reloaded, image);
}

#[test]
fn test_mixed_address_and_continuation_lines() {
    let text = "0000 31 00 24\n3e 96\n0005 d3 01\n";
    let image = RomImage::parse(text).unwrap();
    assert_eq!(image.bytes(), &[0x31, 0x00, 0x24, 0x3E, 0x96, 0xD3, 0x01]);
}

#[test]
fn test_malformed_lines_are_skipped_not_fatal() {
    let text = "0000 11\nzz qq\n22\n0002 33 44 55 66\n33\n";
    let image = RomImage::parse(text).unwrap();
    // The unparseable line and the four-byte line are dropped.
    assert_eq!(image.bytes(), &[0x11, 0x22, 0x33]);
}
