//! Base types for the structure of a RIFF container.

use std::borrow::Cow;
use std::fmt;

use binrw::{BinRead, BinWrite};

use crate::error::{Error, Result};
use crate::hash::HashKey;

/// "RIFF", written as an integer in the container's byte order
pub const RIFF_MAGIC: u32 = 0x52494646;

/// Tag of the chunk listing every record in the container
pub const INDX_TAG: u32 = 0x494E4458;

/// Tag of a chunk holding a single record
pub const ZOBJ_TAG: u32 = 0x5A4F424A;

/// Size of a chunk's tag and size fields
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Constant distance from the index count to its first entry
pub const INDEX_ENTRIES_OFFSET: u32 = 4;

/// Length of fixed-size name fields, including the terminator
pub const NAME_LENGTH: usize = 256;

/// Header of the INDX chunk payload
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
pub struct IndexHeader {
    /// Number of records in the container
    pub count: u32,

    /// Always [`INDEX_ENTRIES_OFFSET`]
    pub entries_offset: u32,
}

/// Location of a single record inside the container
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
pub struct IndexEntry {
    /// Index key of the record
    pub key: HashKey,

    /// Offset of the record's ZOBJ chunk from the start of the file
    pub offset: u32,

    #[allow(dead_code)]
    pub reserved: u32,
}

/// Framing shared by every record inside a ZOBJ chunk
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
pub struct ObjectHeader {
    /// Path of the record itself
    pub key: HashKey,

    /// Path of the directory the record lives in
    pub parent: HashKey,

    /// Discriminator selecting the record's decoder
    pub kind: HashKey,

    #[allow(dead_code)]
    pub reserved: u64,
}

/// A NUL-padded name stored in a fixed 256 byte field.
///
/// The bytes after the terminator are kept as read so they survive a round trip.
#[derive(BinRead, BinWrite, Clone, PartialEq, Eq)]
pub struct PaddedName([u8; NAME_LENGTH]);

impl PaddedName {
    /// Build a zero-padded name. Fails if `text` leaves no room for a terminator.
    pub fn new(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        if bytes.len() >= NAME_LENGTH {
            return Err(Error::NameTooLong {
                length: bytes.len(),
                capacity: NAME_LENGTH,
            });
        }

        let mut raw = [0u8; NAME_LENGTH];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(PaddedName(raw))
    }

    pub const fn from_bytes(raw: [u8; NAME_LENGTH]) -> Self {
        PaddedName(raw)
    }

    pub fn as_bytes(&self) -> &[u8; NAME_LENGTH] {
        &self.0
    }

    /// Bytes up to the first NUL
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(NAME_LENGTH);
        &self.0[..end]
    }

    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(self.name_bytes())?)
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }
}

impl fmt::Debug for PaddedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaddedName({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for PaddedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
