//! This library handles reading from and creating the **CELT** audio containers used by
//! *BandFuse*.
//!
//! # CELT Container Format Documentation
//!
//! A CELT container wraps a CELT encoded audio stream. It consists of a fixed 40 byte header
//! followed by two blocks: a codec header block and the encoded audio block. Both blocks may be
//! encrypted, which this crate does not undo.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x42464144 ("BFAD")                               |
//! | 0x0004         | Version                | 2 bytes: Always 2                                          |
//! | 0x0006         | Encrypted              | 2 bytes: 0 when the blocks are plain, nonzero otherwise    |
//! | 0x0008         | Total Samples          | 4 bytes: Number of samples in the stream                   |
//! | 0x000C         | Bitrate                | 4 bytes: Usually 96000                                     |
//! | 0x0010         | Frame Size             | 2 bytes: Always 960                                        |
//! | 0x0012         | Reserved               | 2 bytes: Always 312                                        |
//! | 0x0014         | Sample Rate            | 2 bytes: Always 48000                                      |
//! | 0x0016         | Reserved               | 2 bytes: Always 1                                          |
//! | 0x0018         | Header Block Offset    | 4 bytes: Offset of the header block                        |
//! | 0x001C         | Header Block Size      | 4 bytes: Unpadded size of the header block                 |
//! | 0x0020         | Audio Block Offset     | 4 bytes: Offset of the audio block                         |
//! | 0x0024         | Audio Block Size       | 4 bytes: Unpadded size of the audio block                  |
//!
//! ### Blocks
//!
//! The header block starts right after the header, and the audio block right after the padded
//! header block. Each block is padded with 1 to 16 bytes, see [`types::padded_size`].
//!
//! ### Offsets
//!
//! Containers dumped from memory carry block offsets relative to wherever they were loaded. When
//! the audio block offset lies past the header, both offsets are rebased so that the header block
//! starts at 40 (see [`types::CeltHeader::normalize_offsets`]).
//!
//! ## Additional Information
//!
//! - **File Extension**: `.celt`
//! - **Endianness**: Either; the magic reads `DAFB` in little-endian files and `BFAD` in
//!   big-endian ones
//!

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::instrument;

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use binrw::Endian;
pub use read::CeltFile;
pub use types::{padded_size, CeltHeader};
pub use write::CeltOptions;

/// Read the audio container at `path`
#[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
pub fn load_audio(path: impl AsRef<Path>) -> error::Result<CeltFile> {
    let file = File::open(path.as_ref())?;
    CeltFile::read(BufReader::new(file))
}

/// Write `celt` to `path`, creating missing parent directories
#[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
pub fn save_audio(path: impl AsRef<Path>, celt: &CeltFile) -> error::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, celt.to_bytes()?)?;
    Ok(())
}
