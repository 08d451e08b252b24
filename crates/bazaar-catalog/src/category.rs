//! Item categories
//!
//! The host classifies things into many fine-grained groups; the store
//! knows a closed set of categories. Both directions go through explicit
//! tables so the persisted strings stay stable.

use crate::rules::CatalogRules;
use bazaar_core::{RaceClass, ThingCandidate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Store category of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemCategory {
    Apparel,
    Weapons,
    Foods,
    Drugs,
    Medicine,
    Resources,
    Manufactured,
    Artifacts,
    BodyParts,
    Furniture,
    Animals,
    Mechs,
    #[default]
    Misc,
}

/// Persisted names
const NAMES: [(ItemCategory, &str); 13] = [
    (ItemCategory::Apparel, "Apparel"),
    (ItemCategory::Weapons, "Weapons"),
    (ItemCategory::Foods, "Foods"),
    (ItemCategory::Drugs, "Drugs"),
    (ItemCategory::Medicine, "Medicine"),
    (ItemCategory::Resources, "Resources"),
    (ItemCategory::Manufactured, "Manufactured"),
    (ItemCategory::Artifacts, "Artifacts"),
    (ItemCategory::BodyParts, "BodyParts"),
    (ItemCategory::Furniture, "Furniture"),
    (ItemCategory::Animals, "Animals"),
    (ItemCategory::Mechs, "Mechs"),
    (ItemCategory::Misc, "Misc"),
];

/// Host classification groups and the category they land in
const HOST_GROUPS: [(&str, ItemCategory); 22] = [
    ("Headgear", ItemCategory::Apparel),
    ("ApparelArmor", ItemCategory::Apparel),
    ("ApparelUtility", ItemCategory::Apparel),
    ("WeaponsMelee", ItemCategory::Weapons),
    ("WeaponsRanged", ItemCategory::Weapons),
    ("Grenades", ItemCategory::Weapons),
    ("FoodMeals", ItemCategory::Foods),
    ("FoodRaw", ItemCategory::Foods),
    ("MeatRaw", ItemCategory::Foods),
    ("PlantFoodRaw", ItemCategory::Foods),
    ("AnimalProductRaw", ItemCategory::Foods),
    ("ResourcesRaw", ItemCategory::Resources),
    ("StoneBlocks", ItemCategory::Resources),
    ("Textiles", ItemCategory::Resources),
    ("Leathers", ItemCategory::Resources),
    ("Items", ItemCategory::Misc),
    ("ItemsMisc", ItemCategory::Misc),
    ("BodyPartsProsthetic", ItemCategory::BodyParts),
    ("BodyPartsBionic", ItemCategory::BodyParts),
    ("BodyPartsNatural", ItemCategory::BodyParts),
    ("BuildingsFurniture", ItemCategory::Furniture),
    ("Neurotrainers", ItemCategory::Artifacts),
];

impl ItemCategory {
    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        NAMES
            .iter()
            .find(|(c, _)| c == self)
            .map(|(_, s)| *s)
            .unwrap_or("Misc")
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(name.trim()))
            .map(|(c, _)| *c)
    }

    /// Map a host classification group (persisted names are accepted too)
    pub fn from_group(group: &str) -> Option<Self> {
        Self::from_name(group).or_else(|| {
            HOST_GROUPS
                .iter()
                .find(|(g, _)| g.eq_ignore_ascii_case(group.trim()))
                .map(|(_, c)| *c)
        })
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemCategory {
    /// Unknown names fall back to `Misc`; reconciliation re-derives the category.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_group(&s).unwrap_or_default())
    }
}

/// Category override applied when a candidate is a character of some race class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub race_class: RaceClass,
    pub category: ItemCategory,
}

/// Category a thing candidate belongs in, if any
///
/// Race rules win over host groups; otherwise the first recognized group is used.
pub fn classify(candidate: &ThingCandidate, rules: &CatalogRules) -> Option<ItemCategory> {
    let by_race = candidate.race.as_ref().and_then(|race| {
        rules
            .category_rules
            .iter()
            .find(|rule| rule.race_class == race.class)
            .map(|rule| rule.category)
    });
    by_race.or_else(|| {
        candidate
            .categories
            .iter()
            .find_map(|group| ItemCategory::from_group(group))
    })
}
