//! This library handles reading from and creating the **RIFF** containers used by *BandFuse*.
//!
//! # RIFF Container Format Documentation
//!
//! Despite the name, these containers have nothing in common with the multimedia RIFF standard
//! beyond the four magic bytes. A container is an indexed collection of typed records
//! ("ZObjects"): path indices, song catalogs, package definitions, timed sections and localized
//! string tables. Containers are typically identified with the `.rif` extension.
//!
//! ## Byte Order
//!
//! Containers exist in both byte orders. The magic is written as an integer in the container's
//! byte order, so the first four bytes read `FFIR` in little-endian containers and `RIFF` in
//! big-endian ones. Every multi-byte field after that uses the same order.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x52494646 ("RIFF")                               |
//! | 0x0004         | Body Size              | 4 bytes: File length minus 8                               |
//! | 0x0008         | INDX chunk             | Index of every record                                      |
//! | ...            | ZOBJ chunks            | One chunk per record                                       |
//!
//! Every chunk starts with a 4 byte tag and a 4 byte payload size.
//!
//! ### Index Chunk
//!
//! Tagged `0x494E4458` ("INDX"). The payload starts with the record count and a constant entries
//! offset of `4`, followed by one entry per record:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Index Key              | 8 bytes: Hashed path of the record                      |
//! | 0x0008         | Chunk Offset           | 4 bytes: Offset of the ZOBJ chunk from start of file    |
//! | 0x000C         | Reserved               | 4 bytes: Always 0                                       |
//!
//! ### Object Chunks
//!
//! Tagged `0x5A4F424A` ("ZOBJ"). Each payload opens with a 32 byte header and is followed by the
//! record body, which must fill the rest of the chunk exactly:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Index Key              | 8 bytes: Hashed path of the record                      |
//! | 0x0008         | Parent Key             | 8 bytes: Hashed path of the record's directory          |
//! | 0x0010         | Type                   | 8 bytes: Hashed name of the record kind                 |
//! | 0x0018         | Reserved               | 8 bytes: Always 0                                       |
//!
//! The type is the hash of one of the following kind names:
//!
//! - `Index2`: [`records::PathIndex`]
//! - `Catalog2`: [`records::Catalog`]
//! - `PackageDef`: [`records::PackageDefinition`]
//! - `Section`: [`records::TimedSection`]
//! - `StringTable`: [`records::LocalizedStrings`]
//!
//! ## Hashing
//!
//! Paths and texts are referenced by a 64-bit CRC (CRC-64/ECMA-182) of their lowercased bytes.
//! Decoding a container publishes every text it carries into a [`StringTable`], which turns those
//! keys back into readable paths.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rif`
//! - **Endianness**: Either, selected by the magic
//! - **Names**: Fixed 256 byte NUL-padded fields, kept verbatim
//!

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::instrument;

pub mod chunk;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod library;
pub mod read;
pub mod records;
pub mod strings;
pub mod types;
pub mod write;

#[cfg(feature = "serde")]
mod serde;

pub use cursor::ByteOrder;
pub use hash::{hash, HashKey};
pub use library::Library;
pub use read::RiffFile;
pub use records::{Record, RecordData, RecordRegistry};
pub use strings::{Locale, StringEntry, StringTable};
pub use write::{RiffWriter, RiffWriterOptions};

/// Read and decode the container at `path`, publishing its strings into `table`
#[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
pub fn load_container(path: impl AsRef<Path>, table: &StringTable) -> error::Result<RiffFile> {
    let file = File::open(path.as_ref())?;
    RiffFile::read(BufReader::new(file), table)
}

/// Encode `file` and write it to `path`, creating missing parent directories
#[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
pub fn save_container(path: impl AsRef<Path>, file: &RiffFile) -> error::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, file.to_bytes()?)?;
    Ok(())
}
