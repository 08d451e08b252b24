//! Catalog membership rules
//!
//! Denylists and pattern lists behind the filtering policy, plus the race
//! category rules. Everything is data so hosts can extend it from config.

use crate::category::{CategoryRule, ItemCategory};
use bazaar_core::RaceClass;
use serde::{Deserialize, Serialize};

/// Name pattern matched case-insensitively against definition names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamePattern {
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl NamePattern {
    /// Check a definition name against the pattern
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        match self {
            NamePattern::Prefix(p) => name.starts_with(&p.to_ascii_lowercase()),
            NamePattern::Suffix(p) => name.ends_with(&p.to_ascii_lowercase()),
            NamePattern::Contains(p) => name.contains(&p.to_ascii_lowercase()),
        }
    }
}

/// Rules deciding catalog membership and derived categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRules {
    /// Race definitions never sold as items
    pub denied_races: Vec<String>,
    /// Substrings of race definition names never sold as items
    pub denied_race_keywords: Vec<String>,
    /// Graphic paths known to be placeholders
    pub placeholder_graphics: Vec<String>,
    /// Patterns identifying vehicles and their parts
    pub vehicle_patterns: Vec<NamePattern>,
    /// Category overrides by race class
    pub category_rules: Vec<CategoryRule>,
    /// Trait definitions never offered
    pub denied_traits: Vec<String>,
    /// Weather definitions never offered
    pub denied_weathers: Vec<String>,
}

impl Default for CatalogRules {
    fn default() -> Self {
        Self {
            denied_races: vec!["Human".to_string()],
            denied_race_keywords: vec!["Corpse".to_string(), "Dummy".to_string()],
            placeholder_graphics: vec!["BadTex".to_string(), "Placeholder".to_string()],
            vehicle_patterns: vec![
                NamePattern::Prefix("VVE_".to_string()),
                NamePattern::Contains("Vehicle".to_string()),
                NamePattern::Suffix("_Turret".to_string()),
                NamePattern::Suffix("_Wheel".to_string()),
            ],
            category_rules: vec![
                CategoryRule {
                    race_class: RaceClass::Animal,
                    category: ItemCategory::Animals,
                },
                CategoryRule {
                    race_class: RaceClass::Insectoid,
                    category: ItemCategory::Animals,
                },
                CategoryRule {
                    race_class: RaceClass::Mechanoid,
                    category: ItemCategory::Mechs,
                },
            ],
            denied_traits: Vec::new(),
            denied_weathers: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_patterns() {
        assert!(NamePattern::Prefix("VVE_".into()).matches("vve_Truck"));
        assert!(NamePattern::Suffix("_Turret".into()).matches("Tank_TURRET"));
        assert!(NamePattern::Contains("Vehicle".into()).matches("MyVehicleFrame"));
        assert!(!NamePattern::Prefix("VVE_".into()).matches("Steel"));
    }

    #[test]
    fn test_partial_rules_keep_defaults() {
        let rules: CatalogRules =
            serde_json::from_str(r#"{"denied_traits": ["Psychopath"]}"#).unwrap();
        assert_eq!(rules.denied_traits, vec!["Psychopath".to_string()]);
        assert_eq!(rules.denied_races, CatalogRules::default().denied_races);
        assert_eq!(rules.category_rules.len(), 3);
    }
}
