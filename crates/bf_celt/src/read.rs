//! Types for reading CELT audio containers
//!

use std::io::{Cursor, Read};

use binrw::{BinRead, Endian};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{CeltHeader, CELT_MAGIC, HEADER_SIZE};

/// A CELT audio container with both of its blocks
///
/// ```no_run
/// fn describe(data: &[u8]) -> bf_celt::error::Result<()> {
///     let celt = bf_celt::CeltFile::from_bytes(data)?;
///     let header = celt.header();
///
///     println!(
///         "{} samples at {} Hz, encrypted: {}",
///         header.total_samples, header.sample_rate, header.encrypted
///     );
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CeltFile {
    pub(crate) byte_order: Endian,
    pub(crate) header: CeltHeader,
    pub(crate) header_block: Vec<u8>,
    pub(crate) audio_block: Vec<u8>,
}

/// Select the byte order from the magic, read as a little-endian integer
fn detect_byte_order(data: &[u8]) -> Result<Endian> {
    let head: [u8; 4] = data
        .get(..4)
        .and_then(|head| head.try_into().ok())
        .ok_or(Error::OutOfData {
            offset: 0,
            wanted: 4,
            available: data.len(),
        })?;

    match u32::from_le_bytes(head) {
        CELT_MAGIC => Ok(Endian::Little),
        value if value == CELT_MAGIC.swap_bytes() => Ok(Endian::Big),
        value => Err(Error::InvalidMagic(value)),
    }
}

fn take_block(data: &[u8], offset: usize, len: usize) -> Result<Vec<u8>> {
    data.get(offset..)
        .and_then(|rest| rest.get(..len))
        .map(<[u8]>::to_vec)
        .ok_or(Error::OutOfData {
            offset,
            wanted: len,
            available: data.len().saturating_sub(offset),
        })
}

impl CeltFile {
    /// Read a whole audio container from `reader`
    pub fn read<R: Read>(mut reader: R) -> Result<CeltFile> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Decode an audio container, normalizing offsets of in-memory captures
    #[instrument(skip_all, fields(size = data.len()), err)]
    pub fn from_bytes(data: &[u8]) -> Result<CeltFile> {
        let byte_order = detect_byte_order(data)?;

        if data.len() < HEADER_SIZE as usize {
            return Err(Error::OutOfData {
                offset: 0,
                wanted: HEADER_SIZE as usize,
                available: data.len(),
            });
        }

        let mut header = CeltHeader::read_options(&mut Cursor::new(data), byte_order, ())?;
        if header.normalize_offsets() {
            debug!(
                header_offset = header.header_offset,
                audio_offset = header.audio_offset,
                "normalized block offsets"
            );
        }

        let header_len = header.padded_header_size() as usize;
        let audio_len = header.padded_audio_size() as usize;
        let header_block = take_block(data, HEADER_SIZE as usize, header_len)?;
        let audio_block = take_block(data, HEADER_SIZE as usize + header_len, audio_len)?;

        debug!(?byte_order, header_len, audio_len, "read audio container");
        Ok(CeltFile {
            byte_order,
            header,
            header_block,
            audio_block,
        })
    }

    pub fn byte_order(&self) -> Endian {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: Endian) {
        self.byte_order = byte_order;
    }

    pub fn header(&self) -> &CeltHeader {
        &self.header
    }

    /// Padded header block, as stored
    pub fn header_block(&self) -> &[u8] {
        &self.header_block
    }

    /// Padded audio block, as stored
    pub fn audio_block(&self) -> &[u8] {
        &self.audio_block
    }

    /// Header block without its padding
    pub fn header_data(&self) -> &[u8] {
        let len = (self.header.header_size as usize).min(self.header_block.len());
        &self.header_block[..len]
    }

    /// Audio block without its padding
    pub fn audio_data(&self) -> &[u8] {
        let len = (self.header.audio_size as usize).min(self.audio_block.len());
        &self.audio_block[..len]
    }

    pub fn is_encrypted(&self) -> bool {
        self.header.encrypted
    }
}
