//! The song catalog ("Catalog2"): one fixed-size entry per song.

use binrw::{BinRead, BinWrite};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{read_list_header, write_list_header, RecordBody};
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::strings::StringTable;

/// Size in bytes of one [`CatalogEntry`]
pub const CATALOG_ENTRY_SIZE: usize = 64;

/// Song metadata. Text fields are string table keys.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogEntry {
    pub identifier: HashKey,
    pub title: HashKey,
    pub artist: HashKey,
    pub album: HashKey,
    pub description: HashKey,
    pub genre: HashKey,
    pub year: u32,

    /// Length of the song in seconds
    pub length: f32,

    pub kind: u32,
    pub flags: u32,
}

impl CatalogEntry {
    /// Title resolved through `table`
    pub fn title(&self, table: &StringTable) -> String {
        table.resolve(self.title)
    }

    /// Artist resolved through `table`
    pub fn artist(&self, table: &StringTable) -> String {
        table.resolve(self.artist)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    pub fn get(&self, identifier: HashKey) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.identifier == identifier)
    }
}

impl RecordBody for Catalog {
    const KIND: &'static str = "Catalog2";

    fn decode(reader: &mut Reader<'_>, _table: &StringTable) -> Result<Self> {
        let count = read_list_header(reader)? as usize;

        if reader.remaining() != count * CATALOG_ENTRY_SIZE {
            return Err(Error::InconsistentCount {
                context: "catalog entries",
                declared: count,
                actual: reader.remaining() / CATALOG_ENTRY_SIZE,
            });
        }

        let entries = (0..count)
            .map(|_| reader.read_struct::<CatalogEntry>())
            .collect::<Result<Vec<_>>>()?;

        Ok(Catalog { entries })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_list_header(writer, self.entries.len());
        for entry in &self.entries {
            writer.write_struct(entry)?;
        }
        Ok(())
    }
}
