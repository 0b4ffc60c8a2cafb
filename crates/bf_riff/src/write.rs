//! Types for writing RIFF containers
//!

use std::io::Write;

use bon::Builder;
use tracing::{debug, instrument};

use crate::cursor::{ByteOrder, Writer};
use crate::error::Result;
use crate::hash::HashKey;
use crate::read::RiffFile;
use crate::records::Record;
use crate::types::{
    IndexEntry, IndexHeader, ObjectHeader, CHUNK_HEADER_SIZE, INDEX_ENTRIES_OFFSET, INDX_TAG,
    RIFF_MAGIC, ZOBJ_TAG,
};

/// Size of one entry in the INDX chunk
const INDEX_ENTRY_SIZE: usize = 16;

/// Options for how the container should be written
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct RiffWriterOptions {
    /// Byte order of every multi-byte field
    #[builder(default)]
    pub byte_order: ByteOrder,
}

/// RIFF container generator
///
/// ```
/// # fn doit() -> bf_riff::error::Result<()>
/// # {
/// use bf_riff::records::{Record, SectionEntry, TimedSection};
/// use bf_riff::write::{RiffWriter, RiffWriterOptions};
/// use bf_riff::{ByteOrder, HashKey};
///
/// let mut riff = RiffWriter::new(
///     Vec::new(),
///     RiffWriterOptions::builder().byte_order(ByteOrder::Big).build(),
/// );
///
/// riff.add(&Record::from_path(
///     "songs.adaytoremember.fused",
///     TimedSection::new(vec![SectionEntry {
///         start: 0.0,
///         end: 12.5,
///         event_name: HashKey::from_path("Intro"),
///     }]),
/// ))?;
///
/// let bytes = riff.finish()?;
/// assert_eq!(&bytes[..4], b"RIFF");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct RiffWriter<W: Write> {
    inner: W,
    options: RiffWriterOptions,
    keys: Vec<HashKey>,
    objects: Vec<Vec<u8>>,
}

impl<W: Write> RiffWriter<W> {
    pub fn new(inner: W, options: RiffWriterOptions) -> RiffWriter<W> {
        RiffWriter {
            inner,
            options,
            keys: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Number of records added so far
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Encode a record into its own ZOBJ chunk payload
    #[instrument(skip_all, fields(key = %record.key, kind = record.kind()), err)]
    pub fn add(&mut self, record: &Record) -> Result<()> {
        let mut payload = Writer::new(self.options.byte_order);
        payload.write_struct(&ObjectHeader {
            key: record.key,
            parent: record.parent,
            kind: record.data.discriminator(),
            reserved: 0,
        })?;
        record.data.encode(&mut payload)?;

        self.keys.push(record.key);
        self.objects.push(payload.into_inner());
        Ok(())
    }

    /// Write the header, the index and every record, returning the inner writer
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        let index_size = 8 + INDEX_ENTRY_SIZE * self.objects.len();
        let mut offset = 2 * CHUNK_HEADER_SIZE + index_size;

        let mut index = Writer::new(self.options.byte_order);
        index.write_struct(&IndexHeader {
            count: self.objects.len() as u32,
            entries_offset: INDEX_ENTRIES_OFFSET,
        })?;
        for (key, object) in self.keys.iter().zip(&self.objects) {
            index.write_struct(&IndexEntry {
                key: *key,
                offset: offset as u32,
                reserved: 0,
            })?;
            offset += CHUNK_HEADER_SIZE + object.len();
        }

        let mut out = Writer::new(self.options.byte_order);
        out.write_u32(RIFF_MAGIC);
        out.write_u32((offset - CHUNK_HEADER_SIZE) as u32);
        write_chunk(&mut out, INDX_TAG, index.as_slice());
        for object in &self.objects {
            write_chunk(&mut out, ZOBJ_TAG, object);
        }

        debug!(records = self.objects.len(), size = out.len(), "wrote container");
        self.inner.write_all(out.as_slice())?;
        Ok(self.inner)
    }
}

fn write_chunk(out: &mut Writer, tag: u32, payload: &[u8]) {
    out.write_u32(tag);
    out.write_u32(payload.len() as u32);
    out.write_bytes(payload);
}

impl RiffFile {
    /// Write this container in its own byte order
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        let options = RiffWriterOptions::builder()
            .byte_order(self.byte_order())
            .build();

        let mut riff = RiffWriter::new(writer, options);
        for record in self.iter() {
            riff.add(record)?;
        }
        riff.finish()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write(Vec::new())
    }
}
