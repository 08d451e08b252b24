//! Buyable traits

use crate::error::{Error, Result};
use crate::filter::{self, Rejection};
use crate::kind::{refresh, repair_price, CatalogEntry, CatalogKind};
use crate::migration::{insert_missing, legacy_number, MigrationStep};
use crate::pricing;
use crate::rules::CatalogRules;
use bazaar_core::{EntryKey, KarmaType, SourceEnumerator, SourceError, TraitCandidate, TraitDegree};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn default_true() -> bool {
    true
}

/// A trait viewers can give to or take from their character
///
/// Multi-degree traits get one entry per degree, keyed `DefName_degree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuyableTrait {
    pub key: String,
    pub def_name: String,
    #[serde(default)]
    pub degree: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub add_price: i32,
    #[serde(default)]
    pub remove_price: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub can_add: bool,
    #[serde(default = "default_true")]
    pub can_remove: bool,
    #[serde(default)]
    pub custom_name: bool,
    /// User override of the karma of adding
    #[serde(default)]
    pub karma_type_for_adding: Option<KarmaType>,
    /// User override of the karma of removing
    #[serde(default)]
    pub karma_type_for_removing: Option<KarmaType>,
    #[serde(default)]
    pub mod_source: String,
    #[serde(default)]
    pub version: String,
}

impl BuyableTrait {
    /// Karma of adding the trait
    pub fn adding_karma(&self) -> KarmaType {
        self.karma_type_for_adding.unwrap_or(KarmaType::Good)
    }

    /// Karma of removing the trait
    pub fn removing_karma(&self) -> KarmaType {
        self.karma_type_for_removing.unwrap_or(KarmaType::Good)
    }
}

impl CatalogEntry for BuyableTrait {
    fn key(&self) -> &str {
        &self.key
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Single `Cost` becomes separate add and remove prices
fn split_cost(object: &mut Map<String, Value>) {
    if let Some(cost) = legacy_number(object, "Cost") {
        let cost = cost.clamp(0, i32::MAX as i64);
        insert_missing(object, "AddPrice", json!(cost));
        insert_missing(object, "RemovePrice", json!(cost));
    }
    object.remove("Cost");
    insert_missing(object, "AddPrice", json!(0));
    insert_missing(object, "RemovePrice", json!(0));
}

/// Capability flags; re-derived during reconciliation
fn add_capabilities(object: &mut Map<String, Value>) {
    insert_missing(object, "CanAdd", json!(true));
    insert_missing(object, "CanRemove", json!(true));
}

static TRAIT_MIGRATIONS: [MigrationStep; 2] = [
    MigrationStep {
        version: 1,
        marker: "AddPrice",
        upgrade: split_cost,
    },
    MigrationStep {
        version: 2,
        marker: "CanAdd",
        upgrade: add_capabilities,
    },
];

/// Catalog kind for traits
#[derive(Debug, Clone, Copy, Default)]
pub struct Traits;

impl CatalogKind for Traits {
    type Candidate = TraitCandidate;
    type Entry = BuyableTrait;

    const FILE_NAME: &'static str = "Traits.json";
    const LABEL: &'static str = "traits";
    const KEY_FIELD: &'static str = "Key";

    fn candidates(source: &dyn SourceEnumerator) -> std::result::Result<Vec<TraitCandidate>, SourceError> {
        source.traits()
    }

    fn candidate_name(candidate: &TraitCandidate) -> &str {
        candidate.def_name.as_str()
    }

    fn screen(candidate: &TraitCandidate, rules: &CatalogRules) -> std::result::Result<(), Rejection> {
        filter::screen_trait(candidate, rules)
    }

    fn derive(candidate: &TraitCandidate, _rules: &CatalogRules) -> Vec<(EntryKey, Result<BuyableTrait>)> {
        let multi = candidate.has_degrees();
        candidate
            .degrees
            .iter()
            .map(|degree| {
                let key = if multi {
                    EntryKey::with_variant(&candidate.def_name, degree.degree)
                } else {
                    EntryKey::from(&candidate.def_name)
                };
                let entry = build_trait(candidate, degree, &key, multi);
                (key, entry)
            })
            .collect()
    }

    fn correct(existing: &mut BuyableTrait, fresh: &BuyableTrait) -> Vec<&'static str> {
        let mut changed = Vec::new();
        refresh(&mut existing.def_name, &fresh.def_name, "DefName", &mut changed);
        refresh(&mut existing.degree, &fresh.degree, "Degree", &mut changed);
        refresh(&mut existing.can_add, &fresh.can_add, "CanAdd", &mut changed);
        refresh(&mut existing.can_remove, &fresh.can_remove, "CanRemove", &mut changed);
        refresh(&mut existing.mod_source, &fresh.mod_source, "ModSource", &mut changed);
        if !existing.custom_name {
            refresh(&mut existing.name, &fresh.name, "Name", &mut changed);
            refresh(&mut existing.description, &fresh.description, "Description", &mut changed);
        }
        repair_price(&mut existing.add_price, fresh.add_price, "AddPrice", &mut changed);
        repair_price(&mut existing.remove_price, fresh.remove_price, "RemovePrice", &mut changed);
        changed
    }

    fn migrations() -> &'static [MigrationStep] {
        &TRAIT_MIGRATIONS
    }
}

fn build_trait(
    candidate: &TraitCandidate,
    degree: &TraitDegree,
    key: &EntryKey,
    multi: bool,
) -> Result<BuyableTrait> {
    let name = degree.label.trim();
    if name.is_empty() {
        return Err(Error::InvalidEntry {
            key: key.to_string(),
            reason: "degree has no label".to_string(),
        });
    }
    let (add_price, remove_price) = pricing::trait_prices(degree.degree, multi);

    Ok(BuyableTrait {
        key: key.to_string(),
        def_name: candidate.def_name.to_string(),
        degree: degree.degree,
        name: name.to_string(),
        description: degree.description.clone(),
        add_price,
        remove_price,
        enabled: true,
        can_add: candidate.can_gain,
        can_remove: candidate.can_lose,
        custom_name: false,
        karma_type_for_adding: None,
        karma_type_for_removing: None,
        mod_source: candidate.mod_source.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::DefName;

    fn degree(degree: i32, label: &str) -> TraitDegree {
        TraitDegree {
            degree,
            label: label.to_string(),
            description: String::new(),
        }
    }

    fn candidate(name: &str, degrees: Vec<TraitDegree>) -> TraitCandidate {
        TraitCandidate {
            def_name: DefName::new(name),
            degrees,
            can_gain: true,
            can_lose: false,
            mod_source: "Core".to_string(),
        }
    }

    #[test]
    fn test_single_degree_uses_def_name() {
        let kind = candidate("Kind", vec![degree(0, "kind")]);
        let derived = Traits::derive(&kind, &CatalogRules::default());
        assert_eq!(derived.len(), 1);
        let entry = derived[0].1.as_ref().unwrap();
        assert_eq!(entry.key, "Kind");
        assert_eq!((entry.add_price, entry.remove_price), (3500, 5500));
        assert!(entry.can_add);
        assert!(!entry.can_remove);
    }

    #[test]
    fn test_degrees_get_their_own_keys() {
        let nerves = candidate(
            "Nerves",
            vec![degree(-2, "volatile"), degree(-1, "nervous"), degree(2, "iron-willed")],
        );
        let derived = Traits::derive(&nerves, &CatalogRules::default());
        let keys: Vec<&str> = derived.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Nerves_-2", "Nerves_-1", "Nerves_2"]);

        let volatile = derived[0].1.as_ref().unwrap();
        assert_eq!(volatile.add_price, 7000);
        assert_eq!(volatile.name, "volatile");
    }

    #[test]
    fn test_unlabelled_degree_fails_alone() {
        let odd = candidate("Odd", vec![degree(1, "odd"), degree(2, " ")]);
        let derived = Traits::derive(&odd, &CatalogRules::default());
        assert!(derived[0].1.is_ok());
        assert!(derived[1].1.is_err());
    }

    #[test]
    fn test_correct_keeps_prices_and_overrides() {
        let kind = candidate("Kind", vec![degree(0, "kind")]);
        let fresh = Traits::derive(&kind, &CatalogRules::default()).remove(0).1.unwrap();
        let mut existing = fresh.clone();
        existing.add_price = 1;
        existing.karma_type_for_adding = Some(KarmaType::Bad);
        existing.can_remove = true;

        let changed = Traits::correct(&mut existing, &fresh);

        assert_eq!(changed, vec!["CanRemove"]);
        assert_eq!(existing.add_price, 1);
        assert_eq!(existing.adding_karma(), KarmaType::Bad);
    }

    #[test]
    fn test_migrations() {
        let mut object = json!({"Key": "Kind", "Cost": 2000});
        split_cost(object.as_object_mut().unwrap());
        add_capabilities(object.as_object_mut().unwrap());
        assert_eq!(
            object,
            json!({"Key": "Kind", "AddPrice": 2000, "RemovePrice": 2000, "CanAdd": true, "CanRemove": true})
        );

        let mut no_cost = json!({"Key": "Kind"});
        split_cost(no_cost.as_object_mut().unwrap());
        assert_eq!(no_cost["AddPrice"], json!(0));
    }
}
