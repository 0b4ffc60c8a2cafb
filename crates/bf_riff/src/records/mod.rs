//! Typed records ("ZObjects") stored in a container.
//!
//! Every record shares the same framing: an index key, the key of its parent directory and
//! a discriminator naming its kind. The discriminator is the hash of the kind name and is
//! mapped to a decoder through a [`RecordRegistry`].

pub mod catalog;
pub mod index;
pub mod package;
pub mod section;
pub mod strings;

use std::collections::HashMap;

use derive_more::derive::From;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use catalog::{Catalog, CatalogEntry};
pub use index::{PackageRef, PathIndex, PathIndexEntry};
pub use package::PackageDefinition;
pub use section::{SectionEntry, TimeEntry, TimedSection};
pub use strings::{LocalizedString, LocalizedStrings};

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::strings::StringTable;
use crate::types::INDEX_ENTRIES_OFFSET;

/// Binary layout of one kind of record body
pub trait RecordBody: Sized {
    /// Name whose hash is the record's discriminator
    const KIND: &'static str;

    /// Decode the body without touching `table`; the container publishes learned strings
    /// only after every record has decoded
    fn decode(reader: &mut Reader<'_>, table: &StringTable) -> Result<Self>;

    fn encode(&self, writer: &mut Writer) -> Result<()>;

    fn discriminator() -> HashKey {
        HashKey::from_path(Self::KIND)
    }
}

/// Payload of a record, one variant per known kind
#[derive(Debug, Clone, PartialEq, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordData {
    PathIndex(PathIndex),
    Catalog(Catalog),
    PackageDefinition(PackageDefinition),
    TimedSection(TimedSection),
    LocalizedStrings(LocalizedStrings),
}

impl RecordData {
    /// Name of this record's kind
    pub fn kind(&self) -> &'static str {
        match self {
            RecordData::PathIndex(_) => PathIndex::KIND,
            RecordData::Catalog(_) => Catalog::KIND,
            RecordData::PackageDefinition(_) => PackageDefinition::KIND,
            RecordData::TimedSection(_) => TimedSection::KIND,
            RecordData::LocalizedStrings(_) => LocalizedStrings::KIND,
        }
    }

    pub fn discriminator(&self) -> HashKey {
        HashKey::from_path(self.kind())
    }

    pub(crate) fn encode(&self, writer: &mut Writer) -> Result<()> {
        match self {
            RecordData::PathIndex(body) => body.encode(writer),
            RecordData::Catalog(body) => body.encode(writer),
            RecordData::PackageDefinition(body) => body.encode(writer),
            RecordData::TimedSection(body) => body.encode(writer),
            RecordData::LocalizedStrings(body) => body.encode(writer),
        }
    }
}

/// A single record of a container
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Path of the record, hashed
    pub key: HashKey,

    /// Path of the directory holding the record, hashed
    pub parent: HashKey,

    pub data: RecordData,
}

impl Record {
    pub fn new(key: HashKey, parent: HashKey, data: impl Into<RecordData>) -> Self {
        Record {
            key,
            parent,
            data: data.into(),
        }
    }

    /// Build a record from its path, deriving the parent from everything before the last `.`
    pub fn from_path(path: &str, data: impl Into<RecordData>) -> Self {
        let parent = path.rfind('.').map_or("", |dot| &path[..dot]);
        Self::new(HashKey::from_path(path), HashKey::from_path(parent), data)
    }

    pub fn kind(&self) -> &'static str {
        self.data.kind()
    }
}

type DecodeFn = fn(&mut Reader<'_>, &StringTable) -> Result<RecordData>;

fn decode_into<T>(reader: &mut Reader<'_>, table: &StringTable) -> Result<RecordData>
where
    T: RecordBody + Into<RecordData>,
{
    T::decode(reader, table).map(Into::into)
}

/// Maps record discriminators to their decoders
#[derive(Debug, Clone)]
pub struct RecordRegistry {
    decoders: HashMap<HashKey, (&'static str, DecodeFn)>,
}

impl Default for RecordRegistry {
    /// A registry knowing every record kind in this crate
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register::<PathIndex>();
        registry.register::<Catalog>();
        registry.register::<PackageDefinition>();
        registry.register::<TimedSection>();
        registry.register::<LocalizedStrings>();
        registry
    }
}

impl RecordRegistry {
    /// A registry that rejects every record
    pub fn empty() -> Self {
        RecordRegistry {
            decoders: HashMap::new(),
        }
    }

    pub fn register<T>(&mut self)
    where
        T: RecordBody + Into<RecordData>,
    {
        self.decoders
            .insert(T::discriminator(), (T::KIND, decode_into::<T>));
    }

    pub fn contains(&self, discriminator: HashKey) -> bool {
        self.decoders.contains_key(&discriminator)
    }

    /// Name of the kind registered for `discriminator`
    pub fn kind(&self, discriminator: HashKey) -> Option<&'static str> {
        self.decoders.get(&discriminator).map(|(kind, _)| *kind)
    }

    pub fn decode(
        &self,
        discriminator: HashKey,
        reader: &mut Reader<'_>,
        table: &StringTable,
    ) -> Result<RecordData> {
        let (kind, decode) = self
            .decoders
            .get(&discriminator)
            .ok_or(Error::UnknownRecordType(discriminator))?;

        trace!(kind, offset = reader.offset(), "decoding record body");
        decode(reader, table)
    }
}

/// Read the `count, entries offset` pair that opens list-shaped bodies
pub(crate) fn read_list_header(reader: &mut Reader<'_>) -> Result<u32> {
    let count = reader.read_u32()?;
    reader.expect_u32("entries offset", INDEX_ENTRIES_OFFSET)?;
    Ok(count)
}

pub(crate) fn write_list_header(writer: &mut Writer, count: usize) {
    writer.write_u32(count as u32);
    writer.write_u32(INDEX_ENTRIES_OFFSET);
}
