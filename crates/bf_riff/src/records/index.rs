//! The path index ("Index2") mapping internal paths to the packages holding their data.

use binrw::{BinRead, BinWrite};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{read_list_header, write_list_header, RecordBody};
use crate::cursor::{Reader, Writer};
use crate::error::Result;
use crate::hash::HashKey;
use crate::strings::StringTable;
use crate::types::PaddedName;

/// A slice of an external package file
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackageRef {
    /// Path of the package on disk, e.g. `songs/adaytoremember/adaytoremember_fused.rif`
    pub external_path: PaddedName,
    pub offset: u32,
    pub size: u32,
}

impl PackageRef {
    pub fn new(external_path: &str, offset: u32, size: u32) -> Result<Self> {
        Ok(PackageRef {
            external_path: PaddedName::new(external_path)?,
            offset,
            size,
        })
    }
}

/// One internal path and where its data lives
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathIndexEntry {
    /// Hashed internal path, e.g. `songs.adaytoremember.fused`
    pub internal: HashKey,

    /// Hashed type name of the referenced object
    pub kind: HashKey,

    pub packages: Vec<PackageRef>,
}

impl PathIndexEntry {
    /// Whether the first package is a `.rif` container
    pub fn is_container(&self) -> bool {
        self.packages.first().is_some_and(|package| {
            package
                .external_path
                .name_bytes()
                .to_ascii_lowercase()
                .ends_with(b".rif")
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathIndex {
    pub entries: Vec<PathIndexEntry>,
}

impl PathIndex {
    pub fn new(entries: Vec<PathIndexEntry>) -> Self {
        PathIndex { entries }
    }

    pub fn get(&self, internal: HashKey) -> Option<&PathIndexEntry> {
        self.entries.iter().find(|entry| entry.internal == internal)
    }
}

impl RecordBody for PathIndex {
    const KIND: &'static str = "Index2";

    fn decode(reader: &mut Reader<'_>, _table: &StringTable) -> Result<Self> {
        let count = read_list_header(reader)?;

        let mut entries = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            let internal = reader.read_struct::<HashKey>()?;
            let kind = reader.read_struct::<HashKey>()?;
            let package_count = reader.read_u32()?;
            let _reserved = reader.read_u32()?;

            let packages = (0..package_count)
                .map(|_| reader.read_struct::<PackageRef>())
                .collect::<Result<Vec<_>>>()?;

            entries.push(PathIndexEntry {
                internal,
                kind,
                packages,
            });
        }

        Ok(PathIndex { entries })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_list_header(writer, self.entries.len());

        for entry in &self.entries {
            writer.write_struct(&entry.internal)?;
            writer.write_struct(&entry.kind)?;
            writer.write_u32(entry.packages.len() as u32);
            writer.write_u32(0);

            for package in &entry.packages {
                writer.write_struct(package)?;
            }
        }

        Ok(())
    }
}
