//! Types for writing CELT audio containers
//!

use std::io::{Cursor, Write};

use binrw::{BinWrite, Endian};
use bon::Builder;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::read::CeltFile;
use crate::types::{padded_size, CeltHeader, HEADER_SIZE};

/// Stream parameters for a new audio container
///
/// ```
/// use bf_celt::write::CeltOptions;
///
/// let options = CeltOptions::builder().total_samples(48000 * 180).build();
/// assert_eq!(options.sample_rate, 48000);
/// ```
#[derive(Debug, Clone, Copy, Builder)]
pub struct CeltOptions {
    #[builder(default = Endian::Little)]
    pub byte_order: Endian,

    #[builder(default = 2)]
    pub version: u16,

    #[builder(default)]
    pub encrypted: bool,

    #[builder(default)]
    pub total_samples: u32,

    #[builder(default = 96000)]
    pub bitrate: u32,

    #[builder(default = 960)]
    pub frame_size: u16,

    #[builder(default = 312)]
    pub reserved_1: u16,

    #[builder(default = 48000)]
    pub sample_rate: u16,

    #[builder(default = 1)]
    pub reserved_2: u16,
}

impl Default for CeltOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Size of an unpadded block, as long as its padded size still fits in a u32
fn block_size(context: &'static str, length: usize) -> Result<u32> {
    u32::try_from(length)
        .ok()
        .filter(|size| *size <= u32::MAX - 16)
        .ok_or(Error::BlockTooLarge { context, length })
}

fn padded(data: &[u8], size: u32) -> Vec<u8> {
    let mut block = data.to_vec();
    block.resize(padded_size(size) as usize, 0);
    block
}

impl CeltFile {
    /// Build a container from unpadded blocks, zero-filling each to its padded size
    ///
    /// Fails with [`Error::BlockTooLarge`] when a block or the audio offset would not fit
    /// the header's 32-bit fields.
    pub fn new(options: CeltOptions, header_data: &[u8], audio_data: &[u8]) -> Result<CeltFile> {
        let header_size = block_size("header block", header_data.len())?;
        let audio_size = block_size("audio block", audio_data.len())?;
        let audio_offset = HEADER_SIZE
            .checked_add(padded_size(header_size))
            .ok_or(Error::BlockTooLarge {
                context: "header block",
                length: header_data.len(),
            })?;

        let header_block = padded(header_data, header_size);
        let audio_block = padded(audio_data, audio_size);

        let header = CeltHeader {
            version: options.version,
            encrypted: options.encrypted,
            total_samples: options.total_samples,
            bitrate: options.bitrate,
            frame_size: options.frame_size,
            reserved_1: options.reserved_1,
            sample_rate: options.sample_rate,
            reserved_2: options.reserved_2,
            header_offset: HEADER_SIZE,
            header_size,
            audio_offset,
            audio_size,
        };

        Ok(CeltFile {
            byte_order: options.byte_order,
            header,
            header_block,
            audio_block,
        })
    }

    /// Write the header and both padded blocks verbatim
    #[instrument(skip_all, err)]
    pub fn write<W: Write>(&self, mut writer: W) -> Result<W> {
        check_block("header block", self.header.header_size, &self.header_block)?;
        check_block("audio block", self.header.audio_size, &self.audio_block)?;

        let mut header = Cursor::new(Vec::with_capacity(HEADER_SIZE as usize));
        self.header.write_options(&mut header, self.byte_order, ())?;

        writer.write_all(header.get_ref())?;
        writer.write_all(&self.header_block)?;
        writer.write_all(&self.audio_block)?;
        Ok(writer)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write(Vec::new())
    }
}

fn check_block(context: &'static str, size: u32, block: &[u8]) -> Result<()> {
    let declared = padded_size(size) as usize;
    if block.len() != declared {
        return Err(Error::InconsistentCount {
            context,
            declared,
            actual: block.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use binrw::Endian;
    use pretty_assertions::assert_eq;

    use super::{block_size, CeltOptions};
    use crate::error::{Error, Result};
    use crate::read::CeltFile;

    #[test]
    fn builder_defaults() {
        let options = CeltOptions::default();
        assert_eq!(options.version, 2);
        assert!(!options.encrypted);
        assert_eq!(options.bitrate, 96000);
        assert_eq!(options.frame_size, 960);
        assert_eq!(options.reserved_1, 312);
        assert_eq!(options.sample_rate, 48000);
        assert_eq!(options.reserved_2, 1);
        assert_eq!(options.byte_order, Endian::Little);
    }

    #[test]
    fn new_pads_blocks() -> Result<()> {
        let celt = CeltFile::new(CeltOptions::default(), &[1; 16], &[2; 17])?;
        let header = celt.header();

        assert_eq!(header.header_offset, 40);
        assert_eq!(header.header_size, 16);
        assert_eq!(celt.header_block().len(), 32);
        assert_eq!(header.audio_offset, 72);
        assert_eq!(header.audio_size, 17);
        assert_eq!(celt.audio_block().len(), 32);
        assert_eq!(celt.audio_data(), [2; 17].as_slice());
        assert_eq!(celt.audio_block()[17..], [0; 15]);
        Ok(())
    }

    #[test]
    fn oversized_block() -> Result<()> {
        assert_eq!(block_size("audio block", 100)?, 100);
        assert_eq!(block_size("audio block", (u32::MAX - 16) as usize)?, u32::MAX - 16);

        let err = block_size("audio block", u32::MAX as usize - 15).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockTooLarge {
                context: "audio block",
                ..
            }
        ));

        let err = block_size("header block", u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockTooLarge {
                context: "header block",
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn reject_unpadded_block() -> Result<()> {
        let mut celt = CeltFile::new(CeltOptions::default(), &[1; 4], &[2; 4])?;
        celt.audio_block.truncate(4);

        let err = celt.to_bytes().unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentCount {
                context: "audio block",
                declared: 16,
                actual: 4
            }
        ));
        Ok(())
    }

    #[test]
    fn write_length() -> Result<()> {
        let celt = CeltFile::new(CeltOptions::default(), &[], &[0xAA; 100])?;
        assert_eq!(celt.to_bytes()?.len(), 40 + 16 + 112);
        Ok(())
    }
}
