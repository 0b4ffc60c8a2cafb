//! Types for reading RIFF containers
//!

use std::collections::{HashMap, HashSet};
use std::io::Read;

use tracing::{debug, instrument};

use crate::chunk::{read_chunks, Chunk};
use crate::cursor::{ByteOrder, Reader};
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::records::{Record, RecordData, RecordRegistry};
use crate::strings::StringTable;
use crate::types::{
    IndexEntry, IndexHeader, ObjectHeader, CHUNK_HEADER_SIZE, INDEX_ENTRIES_OFFSET, INDX_TAG,
    RIFF_MAGIC, ZOBJ_TAG,
};

/// A fully decoded RIFF container
///
/// ```no_run
/// use bf_riff::{RiffFile, StringTable};
///
/// fn list_records(data: &[u8]) -> bf_riff::error::Result<()> {
///     let table = StringTable::new();
///     let riff = RiffFile::from_bytes(data, &table)?;
///
///     for record in riff.iter() {
///         println!("{}: {}", table.resolve(record.key), record.kind());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiffFile {
    byte_order: ByteOrder,
    records: Vec<Record>,
}

impl RiffFile {
    /// Create an in-memory container, ready to be written
    pub fn new(byte_order: ByteOrder, records: Vec<Record>) -> Self {
        RiffFile {
            byte_order,
            records,
        }
    }

    /// Read a whole container from `reader`
    pub fn read<R: Read>(mut reader: R, table: &StringTable) -> Result<RiffFile> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data, table)
    }

    /// Decode a container using every record kind this crate knows
    pub fn from_bytes(data: &[u8], table: &StringTable) -> Result<RiffFile> {
        Self::from_bytes_with(data, table, &RecordRegistry::default())
    }

    /// Decode a container, dispatching record bodies through `registry`
    #[instrument(skip_all, fields(size = data.len()), err)]
    pub fn from_bytes_with(
        data: &[u8],
        table: &StringTable,
        registry: &RecordRegistry,
    ) -> Result<RiffFile> {
        let byte_order = ByteOrder::detect(data, RIFF_MAGIC)?;
        debug!(?byte_order, "detected byte order");

        let mut header = Reader::new(data, byte_order);
        let _magic = header.read_u32()?;
        let body_size = header.read_u32()? as usize;
        if body_size != header.remaining() {
            return Err(Error::InconsistentCount {
                context: "body size",
                declared: body_size,
                actual: header.remaining(),
            });
        }

        let chunks = read_chunks(header.read_rest(), CHUNK_HEADER_SIZE, byte_order)?;
        let (index_chunk, objects) = chunks.split_first().ok_or(Error::InvalidChunk {
            offset: 8,
            reason: "missing index chunk".to_owned(),
        })?;

        if index_chunk.tag != INDX_TAG {
            return Err(unexpected_tag(index_chunk, INDX_TAG));
        }
        if let Some(chunk) = objects.iter().find(|chunk| chunk.tag != ZOBJ_TAG) {
            return Err(unexpected_tag(chunk, ZOBJ_TAG));
        }

        let index = read_index(index_chunk, byte_order)?;
        if index.len() != objects.len() {
            return Err(Error::InconsistentCount {
                context: "records",
                declared: index.len(),
                actual: objects.len(),
            });
        }

        let by_offset: HashMap<usize, &Chunk<'_>> =
            objects.iter().map(|chunk| (chunk.offset, chunk)).collect();

        let mut consumed = HashSet::with_capacity(index.len());
        let mut records = Vec::with_capacity(index.len());
        for entry in &index {
            let offset = entry.offset as usize;
            let chunk = by_offset.get(&offset).ok_or_else(|| Error::InvalidChunk {
                offset,
                reason: format!("index entry {} does not point at a record", entry.key),
            })?;
            if !consumed.insert(offset) {
                return Err(Error::InvalidChunk {
                    offset,
                    reason: format!("index entry {} points at an already claimed record", entry.key),
                });
            }
            records.push(read_record(chunk, entry.key, byte_order, table, registry)?);
        }

        // Strings are only trusted once the whole container has decoded
        for record in &records {
            if let RecordData::LocalizedStrings(strings) = &record.data {
                strings.publish(table);
            }
        }

        debug!(count = records.len(), "read container");
        Ok(RiffFile {
            byte_order,
            records,
        })
    }

    /// Byte order the container was read in, or will be written in
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Number of records contained in this container.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this container holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in index order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Try to get a record by its index key
    pub fn by_key(&self, key: HashKey) -> Option<&Record> {
        self.records.iter().find(|record| record.key == key)
    }

    /// Try to get a record by its path
    pub fn by_path(&self, path: impl AsRef<str>) -> Option<&Record> {
        self.by_key(HashKey::from_path(path))
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RiffFile {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn unexpected_tag(chunk: &Chunk<'_>, expected: u32) -> Error {
    Error::InvalidChunk {
        offset: chunk.offset,
        reason: format!("expected tag {expected:#010X}, found {:#010X}", chunk.tag),
    }
}

fn read_index(chunk: &Chunk<'_>, byte_order: ByteOrder) -> Result<Vec<IndexEntry>> {
    let mut reader = Reader::with_base(chunk.data, byte_order, chunk.offset + CHUNK_HEADER_SIZE);
    let header = reader.read_struct::<IndexHeader>()?;
    if header.entries_offset != INDEX_ENTRIES_OFFSET {
        return Err(Error::UnexpectedValue {
            field: "index entries offset",
            expected: INDEX_ENTRIES_OFFSET.into(),
            actual: header.entries_offset.into(),
        });
    }

    let entries = (0..header.count)
        .map(|_| reader.read_struct::<IndexEntry>())
        .collect::<Result<Vec<_>>>()?;

    if !reader.is_empty() {
        return Err(Error::InconsistentCount {
            context: "index size",
            declared: chunk.data.len(),
            actual: reader.position(),
        });
    }

    Ok(entries)
}

fn read_record(
    chunk: &Chunk<'_>,
    key: HashKey,
    byte_order: ByteOrder,
    table: &StringTable,
    registry: &RecordRegistry,
) -> Result<Record> {
    let mut reader = Reader::with_base(chunk.data, byte_order, chunk.offset + CHUNK_HEADER_SIZE);
    let header = reader.read_struct::<ObjectHeader>()?;

    if header.key != key {
        return Err(Error::InvalidChunk {
            offset: chunk.offset,
            reason: format!("index key {key} does not match record key {}", header.key),
        });
    }

    let data = registry.decode(header.kind, &mut reader, table)?;
    if !reader.is_empty() {
        return Err(Error::InconsistentCount {
            context: "record body",
            declared: chunk.data.len(),
            actual: reader.position(),
        });
    }

    Ok(Record {
        key: header.key,
        parent: header.parent,
        data,
    })
}
