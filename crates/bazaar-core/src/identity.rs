//! Identity types for catalog entries and host definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a catalog entry or usage record
///
/// Unique within one catalog, stable across runs. Derived from the source
/// definition name, optionally suffixed with a variant (e.g. a trait degree).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(pub String);

impl EntryKey {
    /// Create a new entry key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for a definition with a variant suffix
    pub fn with_variant(def: &DefName, variant: impl fmt::Display) -> Self {
        Self(format!("{}_{}", def.as_str(), variant))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check for the empty key, which is never valid
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntryKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&DefName> for EntryKey {
    fn from(def: &DefName) -> Self {
        Self(def.0.clone())
    }
}

/// Name of a definition in the host's definition database
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DefName(pub String);

impl DefName {
    /// Create a new definition name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DefName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DefName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key() {
        let key = EntryKey::new("MealSimple");
        assert_eq!(key.as_str(), "MealSimple");
        assert_eq!(format!("{}", key), "MealSimple");
        assert!(!key.is_empty());
        assert!(EntryKey::new("  ").is_empty());
    }

    #[test]
    fn test_variant_key() {
        let def = DefName::new("Nerves");
        assert_eq!(EntryKey::with_variant(&def, -1).as_str(), "Nerves_-1");
        assert_eq!(EntryKey::from(&def).as_str(), "Nerves");
    }

    #[test]
    fn test_keys_serialize_transparently() {
        let json = serde_json::to_string(&EntryKey::new("Gold")).unwrap();
        assert_eq!(json, "\"Gold\"");
    }
}
