//! Weather definition schema

use bazaar_core::{DefName, Favorability, WeatherCandidate};
use serde::{Deserialize, Serialize};

/// Definition of a weather type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDef {
    pub def_name: DefName,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub favorability: Favorability,
    #[serde(default)]
    pub mod_content_pack: Option<String>,
}

impl WeatherDef {
    /// Describe this definition as a source candidate
    pub fn to_candidate(&self, default_pack: &str) -> WeatherCandidate {
        WeatherCandidate {
            def_name: self.def_name.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            favorability: self.favorability,
            mod_source: self
                .mod_content_pack
                .clone()
                .unwrap_or_else(|| default_pack.to_string()),
        }
    }
}

/// A collection of weather definitions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherDefs {
    pub weathers: Vec<WeatherDef>,
}
