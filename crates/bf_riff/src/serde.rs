use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Serialize,
};

use crate::types::PaddedName;

impl Serialize for PaddedName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

struct PaddedNameVisitor;

impl Visitor<'_> for PaddedNameVisitor {
    type Value = PaddedName;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string shorter than 256 bytes")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        PaddedName::new(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for PaddedName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(PaddedNameVisitor)
    }
}
