//! CRC-64 hashing of path keys.
//!
//! Every path, type name and string identifier inside a container is stored as a 64-bit
//! CRC of its lowercased text. The checksum is CRC-64/ECMA-182 (polynomial
//! `0x42F0E1EBA9EA3693`, zero init, no reflection, no final xor).

use binrw::{BinRead, BinWrite};
use crc::{Crc, CRC_64_ECMA_182};
use derive_more::derive::{Display, From, Into};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);

/// Hash a byte sequence, optionally lowercasing ASCII letters first.
pub fn hash(text: impl AsRef<[u8]>, case_insensitive: bool) -> u64 {
    let bytes = text.as_ref();
    if case_insensitive {
        CRC64.checksum(&bytes.to_ascii_lowercase())
    } else {
        CRC64.checksum(bytes)
    }
}

/// A content-addressed key for a path or string
///
/// Keys are treated as unique, though nothing prevents two texts from colliding.
#[derive(
    BinRead,
    BinWrite,
    Display,
    From,
    Into,
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
#[display("{:016X}", _0)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct HashKey(u64);

impl HashKey {
    /// Wrap a raw key value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Derive the key for a path, ignoring case
    pub fn from_path(path: impl AsRef<str>) -> Self {
        Self(hash(path.as_ref(), true))
    }

    /// The raw key value
    pub const fn value(self) -> u64 {
        self.0
    }
}
