use binrw::Endian;
use bf_celt::error::{Error, Result};
use bf_celt::{CeltFile, CeltOptions};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[rustfmt::skip]
const MEMORY_CAPTURE: [u8; 72] = [
    0x44, 0x41, 0x46, 0x42,  // "DAFB"
    0x02, 0x00,              // Version
    0x01, 0x00,              // Encrypted
    0x80, 0xBB, 0x00, 0x00,  // Total samples
    0x00, 0x77, 0x01, 0x00,  // Bitrate
    0xC0, 0x03,              // Frame size
    0x38, 0x01,              // Reserved
    0x80, 0xBB,              // Sample rate
    0x01, 0x00,              // Reserved
    0xC8, 0x00, 0x00, 0x00,  // Header offset 200
    0x04, 0x00, 0x00, 0x00,  // Header size 4
    0x68, 0x01, 0x00, 0x00,  // Audio offset 360
    0x10, 0x00, 0x00, 0x00,  // Audio size 16
    0xA0, 0xA1, 0xA2, 0xA3, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7,
    0xB8, 0xB9, 0xBA, 0xBB, 0xBC, 0xBD, 0xBE, 0xBF,
];

#[traced_test]
#[test]
fn read_memory_capture() -> Result<()> {
    let input = [MEMORY_CAPTURE.as_slice(), &[0; 16]].concat();
    let celt = CeltFile::from_bytes(&input)?;

    assert_eq!(celt.byte_order(), Endian::Little);
    assert!(celt.is_encrypted());

    let header = celt.header();
    assert_eq!(header.version, 2);
    assert_eq!(header.total_samples, 48000);
    assert_eq!(header.bitrate, 96000);
    assert_eq!(header.frame_size, 960);
    assert_eq!(header.reserved_1, 312);
    assert_eq!(header.sample_rate, 48000);
    assert_eq!(header.reserved_2, 1);
    assert_eq!(header.header_offset, 40);
    assert_eq!(header.audio_offset, 200);

    assert_eq!(celt.header_block().len(), 16);
    assert_eq!(celt.header_data(), [0xA0, 0xA1, 0xA2, 0xA3]);
    assert_eq!(celt.audio_block().len(), 32);
    assert_eq!(celt.audio_data(), &input[56..72]);

    Ok(())
}

#[traced_test]
#[test]
fn truncated_audio_block() {
    let err = CeltFile::from_bytes(&MEMORY_CAPTURE).unwrap_err();
    assert!(matches!(
        err,
        Error::OutOfData {
            offset: 56,
            wanted: 32,
            available: 16
        }
    ));
}

#[traced_test]
#[test]
fn invalid_magic() {
    let mut input = MEMORY_CAPTURE;
    input[..4].copy_from_slice(b"OggS");

    assert!(matches!(
        CeltFile::from_bytes(&input),
        Err(Error::InvalidMagic(0x5367674F))
    ));
}

#[traced_test]
#[test]
fn short_header() {
    let err = CeltFile::from_bytes(&MEMORY_CAPTURE[..20]).unwrap_err();
    assert!(matches!(
        err,
        Error::OutOfData {
            wanted: 40,
            available: 20,
            ..
        }
    ));
}

#[traced_test]
#[test]
fn round_trip_big_endian() -> Result<()> {
    let options = CeltOptions::builder()
        .byte_order(Endian::Big)
        .encrypted(true)
        .total_samples(48000 * 3)
        .build();
    let expected = CeltFile::new(options, &[0x11; 30], &[0x22; 64])?;

    let bytes = expected.to_bytes()?;
    assert_eq!(&bytes[..4], b"BFAD");
    assert_eq!(bytes.len(), 40 + 32 + 80);

    let actual = CeltFile::from_bytes(&bytes)?;
    assert_eq!(actual, expected);
    assert_eq!(actual.to_bytes()?, bytes);

    Ok(())
}

#[traced_test]
#[test]
fn save_and_load() -> Result<()> {
    let path = std::env::temp_dir()
        .join(format!("bf_celt_{}", std::process::id()))
        .join("audio")
        .join("song.celt");

    let expected = CeltFile::new(CeltOptions::default(), &[1, 2, 3], &[4, 5, 6])?;
    bf_celt::save_audio(&path, &expected)?;
    assert_eq!(bf_celt::load_audio(&path)?, expected);

    std::fs::remove_file(&path)?;
    Ok(())
}
