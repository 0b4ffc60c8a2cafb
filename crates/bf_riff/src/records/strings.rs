//! Localized string records ("StringTable"): one locale's texts for a set of keys.
//!
//! Decoding does not touch the shared [`StringTable`]; the container publishes each record
//! with [`LocalizedStrings::publish`] once every record in it has decoded.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::RecordBody;
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::strings::{Locale, StringTable};

/// Size in bytes of one key/offset slot
pub const STRING_SLOT_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalizedString {
    pub key: HashKey,
    pub text: String,
}

/// Slot offsets and blob as they were decoded, kept so an unmodified record re-encodes
/// byte-for-byte (shared offsets and trailing padding included)
#[derive(Debug, Clone)]
struct BlobLayout {
    offsets: Vec<u32>,
    blob: Vec<u8>,
}

/// Equality compares the locale and the entries only; the decoded blob layout is ignored.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalizedStrings {
    pub locale: Locale,
    pub entries: Vec<LocalizedString>,
    #[cfg_attr(feature = "serde", serde(skip))]
    layout: Option<BlobLayout>,
}

impl PartialEq for LocalizedStrings {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale && self.entries == other.entries
    }
}

impl Eq for LocalizedStrings {}

impl LocalizedStrings {
    pub fn new(locale: Locale) -> Self {
        LocalizedStrings {
            locale,
            entries: Vec::new(),
            layout: None,
        }
    }

    /// Add the text for `key`
    pub fn insert(&mut self, key: HashKey, text: impl Into<String>) {
        self.entries.push(LocalizedString {
            key,
            text: text.into(),
        });
    }

    pub fn get(&self, key: HashKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.text.as_str())
    }

    /// Publish every text into `table` under this record's locale
    pub fn publish(&self, table: &StringTable) {
        for entry in &self.entries {
            let mut string = table.find_or_create(entry.key);
            string.set_value(entry.text.as_str(), self.locale);
            table.add_string(string);
        }
        debug!(locale = %self.locale, count = self.entries.len(), "published localized strings");
    }

    /// The decoded layout, if it still describes the current entries
    fn verbatim_layout(&self) -> Option<&BlobLayout> {
        let layout = self.layout.as_ref()?;
        if layout.offsets.len() != self.entries.len() {
            return None;
        }
        let unchanged = self.entries.iter().zip(&layout.offsets).all(|(entry, offset)| {
            string_at(&layout.blob, *offset as usize, 0).is_ok_and(|text| text == entry.text)
        });
        unchanged.then_some(layout)
    }
}

fn string_at(blob: &[u8], offset: usize, base: usize) -> Result<&str> {
    let tail = blob.get(offset..).ok_or(Error::OutOfData {
        offset: base + offset,
        wanted: 1,
        available: 0,
    })?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(Error::OutOfData {
            offset: base + blob.len(),
            wanted: 1,
            available: 0,
        })?;
    Ok(std::str::from_utf8(&tail[..end])?)
}

impl RecordBody for LocalizedStrings {
    const KIND: &'static str = "StringTable";

    fn decode(reader: &mut Reader<'_>, _table: &StringTable) -> Result<Self> {
        let code = reader.read_u32()?;
        let locale = Locale::from_code(code).ok_or(Error::UnknownLocale(code))?;
        let count = reader.read_u32()? as usize;

        if reader.remaining() < count * STRING_SLOT_SIZE {
            return Err(Error::InconsistentCount {
                context: "string slots",
                declared: count,
                actual: reader.remaining() / STRING_SLOT_SIZE,
            });
        }

        let mut slots = Vec::with_capacity(count);
        for _ in 0..count {
            let key = reader.read_struct::<HashKey>()?;
            let offset = reader.read_u32()? as usize;
            let _reserved = reader.read_u32()?;
            slots.push((key, offset));
        }

        let base = reader.offset();
        let blob = reader.read_rest();
        let entries = slots
            .iter()
            .map(|&(key, offset)| {
                Ok(LocalizedString {
                    key,
                    text: string_at(blob, offset, base)?.to_owned(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LocalizedStrings {
            locale,
            entries,
            layout: Some(BlobLayout {
                offsets: slots.iter().map(|&(_, offset)| offset as u32).collect(),
                blob: blob.to_vec(),
            }),
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_u32(self.locale.code());
        writer.write_u32(self.entries.len() as u32);

        if let Some(layout) = self.verbatim_layout() {
            for (entry, offset) in self.entries.iter().zip(&layout.offsets) {
                writer.write_struct(&entry.key)?;
                writer.write_u32(*offset);
                writer.write_u32(0);
            }
            writer.write_bytes(&layout.blob);
            return Ok(());
        }

        let mut blob = Vec::new();
        for entry in &self.entries {
            writer.write_struct(&entry.key)?;
            writer.write_u32(blob.len() as u32);
            writer.write_u32(0);

            blob.extend_from_slice(entry.text.as_bytes());
            blob.push(0);
        }

        writer.write_bytes(&blob);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::LocalizedStrings;
    use crate::cursor::{ByteOrder, Reader, Writer};
    use crate::error::{Error, Result};
    use crate::hash::HashKey;
    use crate::records::RecordBody;
    use crate::strings::{Locale, StringTable};

    #[rustfmt::skip]
    const TWO_STRINGS: [u8; 48] = [
        0x00, 0x00, 0x00, 0x00,  // Locale enUS
        0x02, 0x00, 0x00, 0x00,  // Count
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,  // Key 1
        0x00, 0x00, 0x00, 0x00,  // Offset
        0x00, 0x00, 0x00, 0x00,  // Reserved
        0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,  // Key 2
        0x03, 0x00, 0x00, 0x00,  // Offset
        0x00, 0x00, 0x00, 0x00,  // Reserved
        b'H', b'i', 0x00,
        b'Y', b'o', 0x00,
        0x00, 0x00,
    ];

    #[traced_test]
    #[test]
    fn decode_then_publish() -> Result<()> {
        let table = StringTable::new();
        let strings =
            LocalizedStrings::decode(&mut Reader::new(&TWO_STRINGS, ByteOrder::Little), &table)?;

        assert_eq!(strings.locale, Locale::English);
        assert_eq!(strings.get(HashKey::new(2)), Some("Yo"));
        assert!(table.is_empty());

        strings.publish(&table);
        assert_eq!(table.resolve(HashKey::new(1)), "Hi");
        assert_eq!(
            table.resolve_locale(HashKey::new(2), Locale::English),
            Some("Yo".to_owned())
        );
        assert_eq!(table.resolve_locale(HashKey::new(2), Locale::French), None);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn locales_merge() -> Result<()> {
        let table = StringTable::new();
        let key = HashKey::from_path("songs.adaytoremember.title");

        let mut english = LocalizedStrings::new(Locale::English);
        english.insert(key, "A Day to Remember");
        let mut german = LocalizedStrings::new(Locale::German);
        german.insert(key, "Ein Tag zum Erinnern");

        for strings in [english, german] {
            let mut writer = Writer::new(ByteOrder::Big);
            strings.encode(&mut writer)?;
            LocalizedStrings::decode(&mut Reader::new(writer.as_slice(), ByteOrder::Big), &table)?
                .publish(&table);
        }

        assert_eq!(table.resolve(key), "A Day to Remember");
        assert_eq!(
            table.resolve_locale(key, Locale::German),
            Some("Ein Tag zum Erinnern".to_owned())
        );

        Ok(())
    }

    #[test]
    fn reencode_keeps_blob_layout() -> Result<()> {
        let table = StringTable::new();
        let strings =
            LocalizedStrings::decode(&mut Reader::new(&TWO_STRINGS, ByteOrder::Little), &table)?;

        let mut writer = Writer::new(ByteOrder::Little);
        strings.encode(&mut writer)?;
        assert_eq!(writer.as_slice(), &TWO_STRINGS[..]);

        Ok(())
    }

    #[test]
    fn reencode_keeps_shared_offsets() -> Result<()> {
        let mut input = TWO_STRINGS;
        input[32] = 0x00;

        let table = StringTable::new();
        let strings =
            LocalizedStrings::decode(&mut Reader::new(&input, ByteOrder::Little), &table)?;
        assert_eq!(strings.get(HashKey::new(2)), Some("Hi"));

        let mut writer = Writer::new(ByteOrder::Little);
        strings.encode(&mut writer)?;
        assert_eq!(writer.as_slice(), &input[..]);

        Ok(())
    }

    #[test]
    fn edited_text_rebuilds_blob() -> Result<()> {
        let table = StringTable::new();
        let mut strings =
            LocalizedStrings::decode(&mut Reader::new(&TWO_STRINGS, ByteOrder::Little), &table)?;
        strings.entries[1].text = "Hey".to_owned();

        let mut writer = Writer::new(ByteOrder::Little);
        strings.encode(&mut writer)?;
        assert_eq!(&writer.as_slice()[40..], b"Hi\0Hey\0");

        let decoded = LocalizedStrings::decode(
            &mut Reader::new(writer.as_slice(), ByteOrder::Little),
            &table,
        )?;
        assert_eq!(decoded, strings);

        Ok(())
    }

    #[test]
    fn unknown_locale() {
        let mut input = TWO_STRINGS;
        input[0] = 9;

        let table = StringTable::new();
        let err = LocalizedStrings::decode(&mut Reader::new(&input, ByteOrder::Little), &table)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownLocale(9)));
        assert!(table.is_empty());
    }

    #[test]
    fn offset_outside_blob() {
        let mut input = TWO_STRINGS;
        input[32] = 0x40;

        let table = StringTable::new();
        let err = LocalizedStrings::decode(&mut Reader::new(&input, ByteOrder::Little), &table)
            .unwrap_err();
        assert!(matches!(err, Error::OutOfData { .. }));
    }
}
