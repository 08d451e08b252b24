//! Trait definition schema

use bazaar_core::{DefName, TraitCandidate, TraitDegree};
use serde::{Deserialize, Serialize};

/// Definition of a character trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitDef {
    pub def_name: DefName,
    pub degrees: Vec<TraitDegree>,
    /// Only granted by scripted events, never by choice
    #[serde(default)]
    pub force_only: bool,
    /// Cannot be removed once gained
    #[serde(default)]
    pub permanent: bool,
    #[serde(default)]
    pub mod_content_pack: Option<String>,
}

impl TraitDef {
    /// Describe this definition as a source candidate
    pub fn to_candidate(&self, default_pack: &str) -> TraitCandidate {
        TraitCandidate {
            def_name: self.def_name.clone(),
            degrees: self.degrees.clone(),
            can_gain: !self.force_only,
            can_lose: !self.permanent,
            mod_source: self
                .mod_content_pack
                .clone()
                .unwrap_or_else(|| default_pack.to_string()),
        }
    }
}

/// A collection of trait definitions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraitDefs {
    pub traits: Vec<TraitDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_def_ron() {
        let ron_str = r#"
        (
            def_name: "Nerves",
            degrees: [
                (degree: -2, label: "volatile"),
                (degree: -1, label: "nervous"),
                (degree: 1, label: "steadfast"),
                (degree: 2, label: "iron-willed"),
            ],
            permanent: true,
        )
        "#;

        let def: TraitDef = ron::from_str(ron_str).unwrap();
        let candidate = def.to_candidate("Core");
        assert!(candidate.has_degrees());
        assert!(candidate.can_gain);
        assert!(!candidate.can_lose);
        assert_eq!(candidate.degrees[1].label, "nervous");
    }
}
