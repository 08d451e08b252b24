//! Buyable weather

use crate::error::{Error, Result};
use crate::filter::{self, Rejection};
use crate::kind::{refresh, repair_price, CatalogEntry, CatalogKind};
use crate::migration::{insert_missing, legacy_number, MigrationStep};
use crate::pricing;
use crate::rules::CatalogRules;
use bazaar_core::{EntryKey, Favorability, KarmaType, SourceEnumerator, SourceError, WeatherCandidate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn default_true() -> bool {
    true
}

/// A weather viewers can summon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuyableWeather {
    pub def_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_cost: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub custom_name: bool,
    #[serde(default)]
    pub favorability: Favorability,
    /// User override; `None` derives karma from favorability
    #[serde(default)]
    pub karma_type: Option<KarmaType>,
    #[serde(default)]
    pub mod_source: String,
    #[serde(default)]
    pub version: String,
}

impl BuyableWeather {
    /// Karma charged for summoning
    pub fn effective_karma(&self) -> KarmaType {
        self.karma_type
            .unwrap_or_else(|| pricing::weather_karma(self.favorability))
    }
}

impl CatalogEntry for BuyableWeather {
    fn key(&self) -> &str {
        &self.def_name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn rename_cost(object: &mut Map<String, Value>) {
    if let Some(cost) = legacy_number(object, "Cost") {
        insert_missing(object, "BaseCost", json!(cost.clamp(0, i32::MAX as i64)));
    }
    object.remove("Cost");
    insert_missing(object, "BaseCost", json!(0));
}

fn add_karma_override(object: &mut Map<String, Value>) {
    insert_missing(object, "KarmaType", Value::Null);
}

static WEATHER_MIGRATIONS: [MigrationStep; 2] = [
    MigrationStep {
        version: 1,
        marker: "BaseCost",
        upgrade: rename_cost,
    },
    MigrationStep {
        version: 2,
        marker: "KarmaType",
        upgrade: add_karma_override,
    },
];

/// Catalog kind for weather
#[derive(Debug, Clone, Copy, Default)]
pub struct Weathers;

impl CatalogKind for Weathers {
    type Candidate = WeatherCandidate;
    type Entry = BuyableWeather;

    const FILE_NAME: &'static str = "Weather.json";
    const LABEL: &'static str = "weather";
    const KEY_FIELD: &'static str = "DefName";

    fn candidates(source: &dyn SourceEnumerator) -> std::result::Result<Vec<WeatherCandidate>, SourceError> {
        source.weathers()
    }

    fn candidate_name(candidate: &WeatherCandidate) -> &str {
        candidate.def_name.as_str()
    }

    fn screen(candidate: &WeatherCandidate, rules: &CatalogRules) -> std::result::Result<(), Rejection> {
        filter::screen_weather(candidate, rules)
    }

    fn derive(candidate: &WeatherCandidate, _rules: &CatalogRules) -> Vec<(EntryKey, Result<BuyableWeather>)> {
        let key = EntryKey::from(&candidate.def_name);
        let entry = if candidate.label.trim().is_empty() {
            Err(Error::InvalidEntry {
                key: key.to_string(),
                reason: "weather has no label".to_string(),
            })
        } else {
            Ok(BuyableWeather {
                def_name: key.to_string(),
                name: candidate.label.clone(),
                description: candidate.description.clone(),
                base_cost: pricing::weather_cost(candidate.favorability),
                enabled: true,
                custom_name: false,
                favorability: candidate.favorability,
                karma_type: None,
                mod_source: candidate.mod_source.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
        };
        vec![(key, entry)]
    }

    fn correct(existing: &mut BuyableWeather, fresh: &BuyableWeather) -> Vec<&'static str> {
        let mut changed = Vec::new();
        refresh(&mut existing.favorability, &fresh.favorability, "Favorability", &mut changed);
        refresh(&mut existing.mod_source, &fresh.mod_source, "ModSource", &mut changed);
        if !existing.custom_name {
            refresh(&mut existing.name, &fresh.name, "Name", &mut changed);
            refresh(&mut existing.description, &fresh.description, "Description", &mut changed);
        }
        repair_price(&mut existing.base_cost, fresh.base_cost, "BaseCost", &mut changed);
        changed
    }

    fn migrations() -> &'static [MigrationStep] {
        &WEATHER_MIGRATIONS
    }
}
