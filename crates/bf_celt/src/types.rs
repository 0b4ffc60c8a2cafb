//! Base types for structure of CELT audio containers.

use binrw::{BinRead, BinWrite};
use tracing::warn;

/// "BFAD", written as an integer in the file's byte order
pub const CELT_MAGIC: u32 = 0x42464144;

/// Size of [`CeltHeader`] on disk, magic included
pub const HEADER_SIZE: u32 = 40;

/// Size of a block once padded.
///
/// Blocks are always padded with 1 to 16 bytes, so a size that is already a multiple of 16
/// gains a full 16 bytes.
pub const fn padded_size(size: u32) -> u32 {
    size.saturating_add(16 - (size & 15))
}

/// CELT container header
///
/// Describes the stream and locates the (possibly encrypted) header and audio blocks that
/// follow it.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = 0x42464144u32)]
pub struct CeltHeader {
    /// Always 2
    pub version: u16,

    /// Whether both blocks are encrypted
    #[br(map = |raw: u16| raw != 0)]
    #[bw(map = |encrypted: &bool| u16::from(*encrypted))]
    pub encrypted: bool,

    pub total_samples: u32,
    pub bitrate: u32,

    /// Uncompressed samples per frame, always 960
    pub frame_size: u16,

    /// Always 312
    pub reserved_1: u16,

    pub sample_rate: u16,

    /// Always 1
    pub reserved_2: u16,

    /// Offset of the header block from the start of the file
    pub header_offset: u32,

    /// Unpadded size of the header block
    pub header_size: u32,

    /// Offset of the audio block from the start of the file
    pub audio_offset: u32,

    /// Unpadded size of the audio block
    pub audio_size: u32,
}

impl CeltHeader {
    /// Rebase the block offsets onto the end of the header.
    ///
    /// Headers captured from memory carry offsets of wherever the blocks happened to be loaded.
    /// Returns whether anything changed; offsets at or before the header end are left alone.
    pub fn normalize_offsets(&mut self) -> bool {
        if self.audio_offset <= HEADER_SIZE {
            return false;
        }

        if self.audio_offset < self.header_offset {
            warn!(
                header_offset = self.header_offset,
                audio_offset = self.audio_offset,
                "audio block precedes header block"
            );
        }

        self.audio_offset = self
            .audio_offset
            .wrapping_sub(self.header_offset)
            .wrapping_add(HEADER_SIZE);
        self.header_offset = HEADER_SIZE;
        true
    }

    /// Length of the header block as stored
    pub const fn padded_header_size(&self) -> u32 {
        padded_size(self.header_size)
    }

    /// Length of the audio block as stored
    pub const fn padded_audio_size(&self) -> u32 {
        padded_size(self.audio_size)
    }
}
