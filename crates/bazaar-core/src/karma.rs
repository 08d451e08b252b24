//! Karma classification for viewer actions

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How an action affects the colony, used for karma-typed cooldown caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KarmaType {
    Good,
    #[default]
    Neutral,
    Bad,
    Doom,
}

impl KarmaType {
    /// Persisted names, in declaration order
    const TABLE: [(KarmaType, &'static str); 4] = [
        (KarmaType::Good, "Good"),
        (KarmaType::Neutral, "Neutral"),
        (KarmaType::Bad, "Bad"),
        (KarmaType::Doom, "Doom"),
    ];

    /// All karma types
    pub fn all() -> impl Iterator<Item = KarmaType> {
        Self::TABLE.iter().map(|(k, _)| *k)
    }

    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("Neutral")
    }
}

impl FromStr for KarmaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::TABLE
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(k, _)| *k)
            .ok_or_else(|| Error::UnknownVariant {
                kind: "karma type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for KarmaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for KarmaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KarmaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
