//! Process-wide table of known strings keyed by their [`HashKey`].
//!
//! Containers only store hashes of the paths and texts they reference. Whenever a decoder
//! or the caller learns the plain text behind a hash it is published here, so later lookups
//! can turn opaque keys back into readable paths.
//!
//! The table is shared by reference. Entry creation and publication happen under a single
//! lock, so two containers decoded on different threads can never create diverging entries
//! for the same key. When two different texts are published for one key and locale the
//! last one wins.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::hash::HashKey;

/// Placeholder returned for keys whose text has never been learned
pub const UNRESOLVED: &str = "???";

/// Languages a string can be localized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Locale {
    English,
    Japanese,
    German,
    Italian,
    Spanish,
    French,
}

impl Locale {
    /// Every locale, in on-disk code order
    pub const ALL: [Locale; 6] = [
        Locale::English,
        Locale::Japanese,
        Locale::German,
        Locale::Italian,
        Locale::Spanish,
        Locale::French,
    ];

    /// Suffix used in string table paths, e.g. `enUS`
    pub const fn suffix(self) -> &'static str {
        match self {
            Locale::English => "enUS",
            Locale::Japanese => "jaJP",
            Locale::German => "deDE",
            Locale::Italian => "itIT",
            Locale::Spanish => "esES",
            Locale::French => "frFR",
        }
    }

    /// Numeric code stored in string table records
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Locale> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn from_suffix(suffix: &str) -> Option<Locale> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.suffix().eq_ignore_ascii_case(suffix))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A key together with whatever localized texts are known for it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StringEntry {
    key: HashKey,
    values: IndexMap<Locale, String>,
}

impl StringEntry {
    pub fn new(key: HashKey) -> Self {
        StringEntry {
            key,
            values: IndexMap::new(),
        }
    }

    pub fn key(&self) -> HashKey {
        self.key
    }

    /// Text for one locale, if known
    pub fn value(&self, locale: Locale) -> Option<&str> {
        self.values.get(&locale).map(String::as_str)
    }

    /// Best available text, preferring English
    pub fn text(&self) -> Option<&str> {
        self.value(Locale::English)
            .or_else(|| self.values.values().next().map(String::as_str))
    }

    pub fn values(&self) -> impl Iterator<Item = (Locale, &str)> {
        self.values.iter().map(|(locale, text)| (*locale, text.as_str()))
    }

    /// Attach or replace the text for one locale.
    ///
    /// This only changes this copy; use [`StringTable::add_string`] to publish it.
    pub fn set_value(&mut self, text: impl Into<String>, locale: Locale) {
        self.values.insert(locale, text.into());
    }

    /// Use the same text for every locale
    pub fn set_all(&mut self, text: &str) {
        for locale in Locale::ALL {
            self.set_value(text, locale);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Registry of every [`StringEntry`] learned so far
#[derive(Debug, Default)]
pub struct StringTable {
    entries: RwLock<HashMap<HashKey, StringEntry>>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the entry for `key`, registering an empty one first if needed
    pub fn find_or_create(&self, key: HashKey) -> StringEntry {
        self.entries
            .write()
            .entry(key)
            .or_insert_with(|| StringEntry::new(key))
            .clone()
    }

    /// Publish an entry, merging its texts into any entry already registered for its key.
    ///
    /// Publishing the same entry twice is a no-op.
    pub fn add_string(&self, entry: StringEntry) {
        let mut entries = self.entries.write();
        let current = entries
            .entry(entry.key)
            .or_insert_with(|| StringEntry::new(entry.key));

        for (locale, text) in entry.values {
            match current.values.get(&locale) {
                Some(existing) if *existing == text => continue,
                Some(existing) => debug!(
                    key = %entry.key,
                    %locale,
                    old = %existing,
                    new = %text,
                    "replacing text for colliding key"
                ),
                None => {}
            }
            current.values.insert(locale, text);
        }
    }

    /// Learn `text` for every locale under its own hash and return that hash
    pub fn register_text(&self, text: &str) -> HashKey {
        let key = HashKey::from_path(text);
        let mut entry = self.find_or_create(key);
        entry.set_all(text);
        self.add_string(entry);
        key
    }

    /// Best-effort text for a key, or [`UNRESOLVED`]
    pub fn resolve(&self, key: HashKey) -> String {
        self.entries
            .read()
            .get(&key)
            .and_then(StringEntry::text)
            .unwrap_or(UNRESOLVED)
            .to_owned()
    }

    /// Text for a key in one locale, if known
    pub fn resolve_locale(&self, key: HashKey, locale: Locale) -> Option<String> {
        self.entries
            .read()
            .get(&key)
            .and_then(|entry| entry.value(locale))
            .map(str::to_owned)
    }

    pub fn get(&self, key: HashKey) -> Option<StringEntry> {
        self.entries.read().get(&key).cloned()
    }

    pub fn contains(&self, key: HashKey) -> bool {
        self.entries.read().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::{Locale, StringTable, UNRESOLVED};
    use crate::hash::HashKey;

    #[test]
    fn unresolved_key() {
        let table = StringTable::new();
        assert_eq!(table.resolve(HashKey::new(42)), UNRESOLVED);
        assert!(table.is_empty());
    }

    #[test]
    fn find_or_create_registers_empty_entry() {
        let table = StringTable::new();
        let entry = table.find_or_create(HashKey::new(7));
        assert!(entry.is_empty());
        assert!(table.contains(HashKey::new(7)));
        assert_eq!(table.resolve(HashKey::new(7)), UNRESOLVED);
    }

    #[test]
    fn set_value_is_local_until_published() {
        let table = StringTable::new();
        let key = HashKey::from_path("songs.test");

        let mut entry = table.find_or_create(key);
        entry.set_value("songs.test", Locale::German);
        assert_eq!(table.resolve_locale(key, Locale::German), None);

        table.add_string(entry.clone());
        table.add_string(entry);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.resolve_locale(key, Locale::German).as_deref(),
            Some("songs.test")
        );
        // No English text, falls back to any known locale
        assert_eq!(table.resolve(key), "songs.test");
    }

    #[test]
    fn last_write_wins() {
        let table = StringTable::new();
        let key = HashKey::new(1);

        let mut first = table.find_or_create(key);
        first.set_value("first", Locale::English);
        first.set_value("erste", Locale::German);
        table.add_string(first);

        let mut second = table.find_or_create(key);
        second.set_value("second", Locale::English);
        table.add_string(second);

        assert_eq!(table.resolve(key), "second");
        assert_eq!(
            table.resolve_locale(key, Locale::German).as_deref(),
            Some("erste")
        );
    }

    #[test]
    fn locale_codes() {
        assert_eq!(Locale::from_code(0), Some(Locale::English));
        assert_eq!(Locale::from_code(5), Some(Locale::French));
        assert_eq!(Locale::from_code(6), None);
        assert_eq!(Locale::from_suffix("jajp"), Some(Locale::Japanese));
        assert_eq!(Locale::Spanish.to_string(), "esES");
    }

    #[test]
    fn concurrent_publication() {
        let table = Arc::new(StringTable::new());

        let handles = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for i in 0..100 {
                        table.register_text(&format!("songs.track{i}"));
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.len(), 100);
        assert_eq!(
            table.resolve(HashKey::from_path("songs.track42")),
            "songs.track42"
        );
    }
}
