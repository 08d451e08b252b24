//! Hub configuration
//!
//! Read from a RON file at startup. Every field has a default, so a config
//! only names what it changes.

use crate::error::Result;
use bazaar_catalog::{CatalogKind, CatalogRules, StoreItems, Traits, Weathers};
use bazaar_cooldown::LEDGER_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of a hub
///
/// # Example
///
/// ```
/// use bazaar_hub::HubConfig;
///
/// let config = HubConfig::from_ron_str("(save_queue_capacity: 4)").unwrap();
/// assert_eq!(config.save_queue_capacity, 4);
/// assert_eq!(config.items_file, "StoreItems.json");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Directory of the on-disk store, for [`crate::Hub::open_dir`]
    pub data_dir: PathBuf,
    /// Saves that may wait in the background queue before callers block
    pub save_queue_capacity: usize,
    /// Catalog filtering and classification rules
    pub rules: CatalogRules,
    pub items_file: String,
    pub traits_file: String,
    pub weather_file: String,
    pub ledger_file: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("bazaar"),
            save_queue_capacity: 16,
            rules: CatalogRules::default(),
            items_file: StoreItems::FILE_NAME.to_string(),
            traits_file: Traits::FILE_NAME.to_string(),
            weather_file: Weathers::FILE_NAME.to_string(),
            ledger_file: LEDGER_FILE.to_string(),
        }
    }
}

impl HubConfig {
    /// Parse a RON config
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Read a RON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&source)
    }

    /// Use a different data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_catalog::NamePattern;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.save_queue_capacity, 16);
        assert_eq!(config.weather_file, "Weather.json");
        assert_eq!(config.ledger_file, "CooldownLedger.json");
    }

    #[test]
    fn test_ron_overrides() {
        let config = HubConfig::from_ron_str(
            r#"(
                data_dir: "saves/bazaar",
                rules: (
                    denied_races: ["Human", "Android"],
                    vehicle_patterns: [Prefix("Mech_")],
                ),
            )"#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("saves/bazaar"));
        assert_eq!(config.rules.denied_races, vec!["Human", "Android"]);
        assert_eq!(config.rules.vehicle_patterns, vec![NamePattern::Prefix("Mech_".into())]);
        // Untouched rule lists keep their defaults
        assert!(!config.rules.placeholder_graphics.is_empty());
        assert_eq!(config.save_queue_capacity, 16);
    }

    #[test]
    fn test_invalid_config() {
        assert!(HubConfig::from_ron_str("(save_queue_capacity: \"many\")").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.ron");
        std::fs::write(&path, "(items_file: \"Items.json\")").unwrap();
        assert_eq!(HubConfig::load(&path).unwrap().items_file, "Items.json");
        assert!(HubConfig::load(dir.path().join("missing.ron")).is_err());
    }
}
