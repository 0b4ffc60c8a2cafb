//! Timed sections: ordered, labelled intervals of a song ("Intro", "Verse 1", ...).

use binrw::{BinRead, BinWrite};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{read_list_header, write_list_header, RecordBody};
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::strings::StringTable;

/// Format tag opening every section body
pub const SECTION_FORMAT: u32 = 3;

/// Size in bytes of one [`SectionEntry`]
pub const SECTION_ENTRY_SIZE: u32 = 16;

/// Anything spanning an interval of song time, in seconds
pub trait TimeEntry {
    fn start(&self) -> f32;
    fn end(&self) -> f32;

    fn duration(&self) -> f32 {
        self.end() - self.start()
    }

    fn contains(&self, time: f32) -> bool {
        self.start() <= time && time < self.end()
    }
}

/// A labelled interval
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SectionEntry {
    pub start: f32,
    pub end: f32,

    /// Hashed name of the section
    pub event_name: HashKey,
}

impl TimeEntry for SectionEntry {
    fn start(&self) -> f32 {
        self.start
    }

    fn end(&self) -> f32 {
        self.end
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedSection {
    pub entries: Vec<SectionEntry>,
}

impl TimedSection {
    pub fn new(entries: Vec<SectionEntry>) -> Self {
        TimedSection { entries }
    }

    /// The section playing at `time`, if any
    pub fn at(&self, time: f32) -> Option<&SectionEntry> {
        self.entries.iter().find(|entry| entry.contains(time))
    }
}

impl RecordBody for TimedSection {
    const KIND: &'static str = "Section";

    fn decode(reader: &mut Reader<'_>, _table: &StringTable) -> Result<Self> {
        reader.expect_u32("section format", SECTION_FORMAT)?;
        reader.expect_u32("section entry size", SECTION_ENTRY_SIZE)?;
        let count = read_list_header(reader)? as usize;

        let expected = count * SECTION_ENTRY_SIZE as usize;
        if reader.remaining() != expected {
            return Err(Error::InconsistentCount {
                context: "section entries",
                declared: count,
                actual: reader.remaining() / SECTION_ENTRY_SIZE as usize,
            });
        }

        let entries = (0..count)
            .map(|_| reader.read_struct::<SectionEntry>())
            .collect::<Result<Vec<_>>>()?;

        for entry in entries.iter().filter(|entry| entry.start > entry.end) {
            warn!(
                start = entry.start,
                end = entry.end,
                event = %entry.event_name,
                "section ends before it starts"
            );
        }

        Ok(TimedSection { entries })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_u32(SECTION_FORMAT);
        writer.write_u32(SECTION_ENTRY_SIZE);
        write_list_header(writer, self.entries.len());

        for entry in &self.entries {
            writer.write_struct(entry)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{SectionEntry, TimeEntry, TimedSection};
    use crate::cursor::{ByteOrder, Reader, Writer};
    use crate::error::{Error, Result};
    use crate::hash::HashKey;
    use crate::records::RecordBody;
    use crate::strings::StringTable;

    #[rustfmt::skip]
    const SINGLE_ENTRY: [u8; 32] = [
        0x03, 0x00, 0x00, 0x00,  // Format
        0x10, 0x00, 0x00, 0x00,  // Entry size
        0x01, 0x00, 0x00, 0x00,  // Count
        0x04, 0x00, 0x00, 0x00,  // Entries offset
        0x00, 0x00, 0x00, 0x00,  // Start 0.0
        0x00, 0x00, 0x20, 0x41,  // End 10.0
        0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01,  // Event name
    ];

    #[traced_test]
    #[test]
    fn read_section() -> Result<()> {
        let table = StringTable::new();
        let mut reader = Reader::new(&SINGLE_ENTRY, ByteOrder::Little);

        let section = TimedSection::decode(&mut reader, &table)?;
        assert!(reader.is_empty());
        assert_eq!(
            section.entries,
            vec![SectionEntry {
                start: 0.0,
                end: 10.0,
                event_name: HashKey::new(0x0102030405060708),
            }]
        );
        assert_eq!(section.entries[0].duration(), 10.0);
        assert!(section.at(5.0).is_some());
        assert!(section.at(10.0).is_none());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_section() -> Result<()> {
        let section = TimedSection::new(vec![SectionEntry {
            start: 0.0,
            end: 10.0,
            event_name: HashKey::new(0x0102030405060708),
        }]);

        let mut writer = Writer::new(ByteOrder::Little);
        section.encode(&mut writer)?;
        assert_eq!(writer.as_slice(), SINGLE_ENTRY.as_slice());

        Ok(())
    }

    #[traced_test]
    #[test]
    fn reject_format_drift() {
        let mut input = SINGLE_ENTRY;
        input[4] = 0x14;

        let table = StringTable::new();
        let err = TimedSection::decode(&mut Reader::new(&input, ByteOrder::Little), &table)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedValue {
                field: "section entry size",
                expected: 16,
                actual: 20
            }
        ));
    }

    #[traced_test]
    #[test]
    fn reject_count_mismatch() {
        let mut input = SINGLE_ENTRY;
        input[8] = 0x02;

        let table = StringTable::new();
        let err = TimedSection::decode(&mut Reader::new(&input, ByteOrder::Little), &table)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InconsistentCount {
                declared: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[traced_test]
    #[test]
    fn reversed_interval_is_kept() -> Result<()> {
        let section = TimedSection::new(vec![SectionEntry {
            start: 4.0,
            end: 2.0,
            event_name: HashKey::new(1),
        }]);

        let mut writer = Writer::new(ByteOrder::Big);
        section.encode(&mut writer)?;

        let table = StringTable::new();
        let decoded =
            TimedSection::decode(&mut Reader::new(writer.as_slice(), ByteOrder::Big), &table)?;
        assert_eq!(decoded, section);
        assert!(logs_contain("section ends before it starts"));

        Ok(())
    }
}
