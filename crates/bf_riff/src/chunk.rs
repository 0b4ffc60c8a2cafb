//! Flat chunk framing that follows the container header.

use tracing::trace;
use winnow::binary::{u32, Endianness};
use winnow::combinator::seq;
use winnow::error::{ContextError, ErrMode};
use winnow::token::take;
use winnow::Parser;

use crate::cursor::ByteOrder;
use crate::error::{Error, Result};
use crate::types::CHUNK_HEADER_SIZE;

/// A tagged, size-prefixed region of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: u32,
    /// Offset of the chunk's tag from the start of the file
    pub offset: usize,
    pub data: &'a [u8],
}

type ParseResult<T> = std::result::Result<T, ErrMode<ContextError>>;

struct RawChunk<'a> {
    tag: u32,
    size: u32,
    data: &'a [u8],
}

fn parse_chunk<'s>(input: &mut &'s [u8], endian: Endianness) -> ParseResult<RawChunk<'s>> {
    seq!(RawChunk {
        tag: u32(endian),
        size: u32(endian),
        data: take(size),
    })
    .parse_next(input)
}

fn declared_size(input: &[u8], endian: Endianness) -> Option<u32> {
    let mut header = input.get(..CHUNK_HEADER_SIZE)?;
    let parsed: ParseResult<(u32, u32)> = (u32(endian), u32(endian)).parse_next(&mut header);
    parsed.ok().map(|(_, size)| size)
}

/// Split `data` into consecutive chunks. `base` is the file offset of `data`.
pub fn read_chunks(data: &[u8], base: usize, order: ByteOrder) -> Result<Vec<Chunk<'_>>> {
    let endian = Endianness::from(order);
    let mut input = data;
    let mut chunks = Vec::new();

    while !input.is_empty() {
        let before = input;
        let offset = base + (data.len() - before.len());

        let raw = parse_chunk(&mut input, endian).map_err(|_| Error::OutOfData {
            offset,
            wanted: declared_size(before, endian)
                .map_or(CHUNK_HEADER_SIZE, |size| size as usize + CHUNK_HEADER_SIZE),
            available: before.len(),
        })?;

        trace!(tag = raw.tag, offset, size = raw.size, "chunk");
        chunks.push(Chunk {
            tag: raw.tag,
            offset,
            data: raw.data,
        });
    }

    Ok(chunks)
}
