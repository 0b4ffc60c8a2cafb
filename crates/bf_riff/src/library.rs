//! Collects the well-known meta records of a song library and teaches the string table the
//! paths they imply.
//!
//! Containers reference their string tables only by hash. Given one readable hierarchical key
//! such as `songs.adaytoremember.fused`, the paths `songs.adaytoremember` and
//! `songs.adaytoremember.stringTable@enUS` (and the other five locales) can be reconstructed and
//! registered, which is what makes most other keys resolvable.

use std::collections::HashSet;

use tracing::{debug, instrument, trace};

use crate::hash::HashKey;
use crate::read::RiffFile;
use crate::records::{Catalog, PackageDefinition, PathIndex, RecordData};
use crate::strings::{Locale, StringTable, UNRESOLVED};

/// Joins a directory path and a locale suffix in string table paths
pub const STRING_TABLE_SEPARATOR: &str = ".stringTable@";

/// Everything before the last `.`, or `None` for keys without one
pub fn directory_of(hkey: &str) -> Option<&str> {
    hkey.rfind('.').map(|dot| &hkey[..dot])
}

/// Register the directory of `hkey` and its six string table paths, all locales set to the
/// path itself. Returns the registered keys, directory first.
pub fn derive_hkey_strings(table: &StringTable, hkey: &str) -> Vec<HashKey> {
    if hkey == UNRESOLVED {
        return Vec::new();
    }
    let Some(directory) = directory_of(hkey) else {
        return Vec::new();
    };

    let mut keys = Vec::with_capacity(1 + Locale::ALL.len());
    keys.push(table.register_text(directory));
    for locale in Locale::ALL {
        let path = format!("{directory}{STRING_TABLE_SEPARATOR}{}", locale.suffix());
        keys.push(table.register_text(&path));
    }

    trace!(directory, "derived string table paths");
    keys
}

#[derive(Debug, Clone)]
struct Retained<T> {
    key: HashKey,
    body: T,
}

/// The index, catalog and package definition of a song library
#[derive(Debug)]
pub struct Library<'t> {
    table: &'t StringTable,
    index: Option<Retained<PathIndex>>,
    catalog: Option<Retained<Catalog>>,
    package: Option<Retained<PackageDefinition>>,
    seen: HashSet<HashKey>,
}

impl<'t> Library<'t> {
    pub fn new(table: &'t StringTable) -> Self {
        Library {
            table,
            index: None,
            catalog: None,
            package: None,
            seen: HashSet::new(),
        }
    }

    pub fn table(&self) -> &'t StringTable {
        self.table
    }

    /// Retain the meta records of `file`. Each distinct path index is used once to derive
    /// string table paths for the containers it lists.
    #[instrument(skip_all, fields(records = file.len()))]
    pub fn register(&mut self, file: &RiffFile) {
        for record in file.iter() {
            match &record.data {
                RecordData::PathIndex(index) => {
                    if self.seen.insert(record.key) {
                        self.load_string_table_paths(index);
                    }
                    self.index = Some(Retained {
                        key: record.key,
                        body: index.clone(),
                    });
                }
                RecordData::Catalog(catalog) => {
                    self.catalog = Some(Retained {
                        key: record.key,
                        body: catalog.clone(),
                    });
                }
                RecordData::PackageDefinition(package) => {
                    self.package = Some(Retained {
                        key: record.key,
                        body: package.clone(),
                    });
                }
                _ => {}
            }
        }
    }

    fn load_string_table_paths(&self, index: &PathIndex) {
        let mut derived = 0;
        for entry in index.entries.iter().filter(|entry| entry.is_container()) {
            let path = self.table.resolve(entry.internal);
            derived += derive_hkey_strings(self.table, &path).len();
        }
        debug!(entries = index.entries.len(), derived, "loaded string table paths");
    }

    /// Run the path derivation on the retained records' own keys
    pub fn register_meta_keys(&self) -> Vec<HashKey> {
        [
            self.index.as_ref().map(|r| r.key),
            self.catalog.as_ref().map(|r| r.key),
            self.package.as_ref().map(|r| r.key),
        ]
        .into_iter()
        .flatten()
        .flat_map(|key| derive_hkey_strings(self.table, &self.table.resolve(key)))
        .collect()
    }

    pub fn index(&self) -> Option<&PathIndex> {
        self.index.as_ref().map(|r| &r.body)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref().map(|r| &r.body)
    }

    pub fn package_definition(&self) -> Option<&PackageDefinition> {
        self.package.as_ref().map(|r| &r.body)
    }
}
