//! Thing definition schema

use bazaar_core::{DefName, RaceClass, RaceInfo, ThingCandidate};
use serde::{Deserialize, Serialize};

/// Who may trade a thing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tradeability {
    /// Never traded
    Never,
    /// Only sold by the colony
    Sellable,
    /// Only bought by the colony
    Buyable,
    #[default]
    All,
}

/// Race properties of a thing that is a character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceProps {
    pub class: RaceClass,
    #[serde(default = "default_true")]
    pub playable: bool,
}

fn default_true() -> bool {
    true
}

/// Definition of a thing as the host describes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingDef {
    pub def_name: DefName,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Base market value
    #[serde(default)]
    pub market_value: f64,
    #[serde(default)]
    pub tradeability: Tradeability,
    /// Texture path; things without one cannot be shown
    #[serde(default)]
    pub graphic_path: Option<String>,
    #[serde(default)]
    pub thing_categories: Vec<String>,
    #[serde(default)]
    pub race: Option<RaceProps>,
    #[serde(default)]
    pub ingestible: bool,
    #[serde(default)]
    pub is_apparel: bool,
    #[serde(default)]
    pub is_weapon: bool,
    /// Component class names (e.g. "CompUsable")
    #[serde(default)]
    pub comps: Vec<String>,
    #[serde(default = "default_stack_limit")]
    pub stack_limit: u32,
    #[serde(default)]
    pub mod_content_pack: Option<String>,
}

fn default_stack_limit() -> u32 {
    1
}

impl ThingDef {
    fn has_comp(&self, comp: &str) -> bool {
        self.comps.iter().any(|c| c == comp)
    }

    /// Describe this definition as a source candidate
    pub fn to_candidate(&self, default_pack: &str) -> ThingCandidate {
        ThingCandidate {
            def_name: self.def_name.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            categories: self.thing_categories.clone(),
            market_value: self.market_value,
            tradeable: self.tradeability != Tradeability::Never,
            graphic: self.graphic_path.clone(),
            race: self.race.as_ref().map(|race| RaceInfo {
                def_name: self.def_name.clone(),
                class: race.class,
                playable: race.playable,
            }),
            usable: self.ingestible || self.has_comp("CompUsable"),
            wearable: self.is_apparel,
            equippable: self.is_weapon || self.has_comp("CompEquippable"),
            stack_limit: self.stack_limit,
            mod_source: self
                .mod_content_pack
                .clone()
                .unwrap_or_else(|| default_pack.to_string()),
        }
    }
}

/// A collection of thing definitions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThingDefs {
    pub things: Vec<ThingDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thing_def_ron() {
        let ron_str = r#"
        (
            def_name: "MealSimple",
            label: "simple meal",
            market_value: 10.0,
            graphic_path: Some("Things/Item/Meal/Simple"),
            thing_categories: ["FoodMeals"],
            ingestible: true,
            stack_limit: 10,
        )
        "#;

        let def: ThingDef = ron::from_str(ron_str).unwrap();
        assert_eq!(def.def_name.as_str(), "MealSimple");
        assert_eq!(def.tradeability, Tradeability::All);

        let candidate = def.to_candidate("Core");
        assert!(candidate.usable);
        assert!(candidate.tradeable);
        assert!(!candidate.equippable);
        assert_eq!(candidate.stack_limit, 10);
        assert_eq!(candidate.mod_source, "Core");
    }

    #[test]
    fn test_race_and_comps() {
        let ron_str = r#"
        (
            def_name: "Mech_Scyther",
            label: "scyther",
            market_value: 1200.0,
            tradeability: Never,
            race: Some((class: Mechanoid, playable: false)),
            comps: ["CompEquippable"],
            mod_content_pack: Some("Royalty"),
        )
        "#;

        let def: ThingDef = ron::from_str(ron_str).unwrap();
        let candidate = def.to_candidate("Core");
        let race = candidate.race.unwrap();
        assert_eq!(race.class, RaceClass::Mechanoid);
        assert!(!race.playable);
        assert!(!candidate.tradeable);
        assert!(candidate.equippable);
        assert_eq!(candidate.mod_source, "Royalty");
    }
}
