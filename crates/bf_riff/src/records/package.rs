//! Package definitions ("PackageDef"): a named, versioned list of member files.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::RecordBody;
use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::strings::StringTable;
use crate::types::{PaddedName, NAME_LENGTH};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackageDefinition {
    pub name: PaddedName,
    pub version: u32,
    pub members: Vec<PaddedName>,
}

impl PackageDefinition {
    pub fn new<'a>(
        name: &str,
        version: u32,
        members: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        Ok(PackageDefinition {
            name: PaddedName::new(name)?,
            version,
            members: members
                .into_iter()
                .map(PaddedName::new)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl RecordBody for PackageDefinition {
    const KIND: &'static str = "PackageDef";

    fn decode(reader: &mut Reader<'_>, _table: &StringTable) -> Result<Self> {
        let name = reader.read_struct::<PaddedName>()?;
        let version = reader.read_u32()?;
        let count = reader.read_u32()? as usize;

        if reader.remaining() != count * NAME_LENGTH {
            return Err(Error::InconsistentCount {
                context: "package members",
                declared: count,
                actual: reader.remaining() / NAME_LENGTH,
            });
        }

        let members = (0..count)
            .map(|_| reader.read_struct::<PaddedName>())
            .collect::<Result<Vec<_>>>()?;

        Ok(PackageDefinition {
            name,
            version,
            members,
        })
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.write_struct(&self.name)?;
        writer.write_u32(self.version);
        writer.write_u32(self.members.len() as u32);
        for member in &self.members {
            writer.write_struct(member)?;
        }
        Ok(())
    }
}
