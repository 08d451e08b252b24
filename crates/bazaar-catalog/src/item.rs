//! Store items

use crate::category::{self, ItemCategory};
use crate::error::{Error, Result};
use crate::filter::{self, Rejection};
use crate::kind::{refresh, repair_price, CatalogEntry, CatalogKind};
use crate::migration::{insert_missing, legacy_number, MigrationStep};
use crate::pricing;
use crate::rules::CatalogRules;
use bazaar_core::{EntryKey, SourceEnumerator, SourceError, ThingCandidate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;

/// How the purchase quantity limit of an item is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LimitMode {
    /// `QuantityLimit` units
    PerUnit,
    /// One full stack
    #[default]
    OneStack,
    /// Three full stacks
    ThreeStacks,
    /// Five full stacks
    FiveStacks,
}

const LIMIT_MODES: [(LimitMode, &str); 4] = [
    (LimitMode::PerUnit, "Unit"),
    (LimitMode::OneStack, "OneStack"),
    (LimitMode::ThreeStacks, "ThreeStacks"),
    (LimitMode::FiveStacks, "FiveStacks"),
];

impl LimitMode {
    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        LIMIT_MODES
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, s)| *s)
            .unwrap_or("OneStack")
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        LIMIT_MODES
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(name.trim()))
            .map(|(m, _)| *m)
    }

    fn stacks(&self) -> Option<u32> {
        match self {
            LimitMode::PerUnit => None,
            LimitMode::OneStack => Some(1),
            LimitMode::ThreeStacks => Some(3),
            LimitMode::FiveStacks => Some(5),
        }
    }
}

impl fmt::Display for LimitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LimitMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LimitMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unknown limit mode, using one stack");
            LimitMode::OneStack
        }))
    }
}

fn default_true() -> bool {
    true
}

fn default_stack_limit() -> u32 {
    1
}

/// An item viewers can buy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreItem {
    pub def_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub base_price: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Name and description were set by the user
    #[serde(default)]
    pub custom_name: bool,
    #[serde(default)]
    pub is_usable: bool,
    #[serde(default)]
    pub is_wearable: bool,
    #[serde(default)]
    pub is_equippable: bool,
    #[serde(default)]
    pub quantity_limit: i32,
    #[serde(default)]
    pub limit_mode: LimitMode,
    #[serde(default = "default_stack_limit")]
    pub stack_limit: u32,
    #[serde(default)]
    pub mod_source: String,
    #[serde(default)]
    pub version: String,
}

impl StoreItem {
    /// Most units one purchase may take, never below 1
    pub fn resolved_quantity_limit(&self) -> u32 {
        let limit = match self.limit_mode.stacks() {
            Some(stacks) => self.stack_limit.saturating_mul(stacks),
            None => u32::try_from(self.quantity_limit).unwrap_or(0),
        };
        limit.max(1)
    }

    /// Price of `quantity` units
    pub fn price_for(&self, quantity: u32) -> i64 {
        i64::from(self.base_price) * i64::from(quantity)
    }
}

impl CatalogEntry for StoreItem {
    fn key(&self) -> &str {
        &self.def_name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

/// `Price` (negative meant disabled) becomes `BasePrice` + `Enabled`
fn split_legacy_price(object: &mut Map<String, Value>) {
    if let Some(price) = legacy_number(object, "Price") {
        if price < 0 {
            insert_missing(object, "Enabled", json!(false));
        }
        let base = price.unsigned_abs().min(i32::MAX as u64);
        insert_missing(object, "BasePrice", json!(base));
    }
    object.remove("Price");
    insert_missing(object, "BasePrice", json!(0));
    insert_missing(object, "Enabled", json!(true));
}

/// Limit fields; a zero limit is repaired during reconciliation
fn add_limits(object: &mut Map<String, Value>) {
    insert_missing(object, "LimitMode", json!(LimitMode::OneStack.as_str()));
    insert_missing(object, "QuantityLimit", json!(0));
}

/// Capability flags; re-derived during reconciliation
fn add_capabilities(object: &mut Map<String, Value>) {
    for flag in ["IsUsable", "IsWearable", "IsEquippable"] {
        insert_missing(object, flag, json!(false));
    }
}

static ITEM_MIGRATIONS: [MigrationStep; 3] = [
    MigrationStep {
        version: 1,
        marker: "BasePrice",
        upgrade: split_legacy_price,
    },
    MigrationStep {
        version: 2,
        marker: "LimitMode",
        upgrade: add_limits,
    },
    MigrationStep {
        version: 3,
        marker: "IsUsable",
        upgrade: add_capabilities,
    },
];

/// Catalog kind for store items
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreItems;

impl CatalogKind for StoreItems {
    type Candidate = ThingCandidate;
    type Entry = StoreItem;

    const FILE_NAME: &'static str = "StoreItems.json";
    const LABEL: &'static str = "items";
    const KEY_FIELD: &'static str = "DefName";

    fn candidates(source: &dyn SourceEnumerator) -> std::result::Result<Vec<ThingCandidate>, SourceError> {
        source.things()
    }

    fn candidate_name(candidate: &ThingCandidate) -> &str {
        candidate.def_name.as_str()
    }

    fn screen(candidate: &ThingCandidate, rules: &CatalogRules) -> std::result::Result<(), Rejection> {
        filter::screen_thing(candidate, rules)
    }

    fn derive(candidate: &ThingCandidate, rules: &CatalogRules) -> Vec<(EntryKey, Result<StoreItem>)> {
        let key = EntryKey::from(&candidate.def_name);
        let entry = build_item(candidate, rules);
        vec![(key, entry)]
    }

    fn correct(existing: &mut StoreItem, fresh: &StoreItem) -> Vec<&'static str> {
        let mut changed = Vec::new();
        refresh(&mut existing.category, &fresh.category, "Category", &mut changed);
        refresh(&mut existing.is_usable, &fresh.is_usable, "IsUsable", &mut changed);
        refresh(&mut existing.is_wearable, &fresh.is_wearable, "IsWearable", &mut changed);
        refresh(&mut existing.is_equippable, &fresh.is_equippable, "IsEquippable", &mut changed);
        refresh(&mut existing.stack_limit, &fresh.stack_limit, "StackLimit", &mut changed);
        refresh(&mut existing.mod_source, &fresh.mod_source, "ModSource", &mut changed);
        if !existing.custom_name {
            refresh(&mut existing.name, &fresh.name, "Name", &mut changed);
            refresh(&mut existing.description, &fresh.description, "Description", &mut changed);
        }
        repair_price(&mut existing.base_price, fresh.base_price, "BasePrice", &mut changed);
        if existing.quantity_limit <= 0 {
            existing.quantity_limit = fresh.quantity_limit.max(1);
            changed.push("QuantityLimit");
        }
        changed
    }

    fn migrations() -> &'static [MigrationStep] {
        &ITEM_MIGRATIONS
    }
}

fn build_item(candidate: &ThingCandidate, rules: &CatalogRules) -> Result<StoreItem> {
    let def_name = candidate.def_name.as_str();
    let category = category::classify(candidate, rules).ok_or_else(|| Error::InvalidEntry {
        key: def_name.to_string(),
        reason: "no recognized category".to_string(),
    })?;
    let stack_limit = candidate.stack_limit.max(1);

    Ok(StoreItem {
        def_name: def_name.to_string(),
        name: candidate.label.clone(),
        description: candidate.description.clone(),
        category,
        base_price: pricing::item_price(def_name, candidate.market_value)?,
        enabled: true,
        custom_name: false,
        is_usable: candidate.usable,
        is_wearable: candidate.wearable,
        is_equippable: candidate.equippable,
        quantity_limit: i32::try_from(stack_limit).unwrap_or(i32::MAX),
        limit_mode: LimitMode::OneStack,
        stack_limit,
        mod_source: candidate.mod_source.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration;

    fn meal() -> StoreItem {
        let candidate = ThingCandidate::item("MealSimple", 10.0, "Foods");
        let mut derived = StoreItems::derive(&candidate, &CatalogRules::default());
        derived.remove(0).1.unwrap()
    }

    #[test]
    fn test_derive_item() {
        let item = meal();
        assert_eq!(item.def_name, "MealSimple");
        assert_eq!(item.category, ItemCategory::Foods);
        assert_eq!(item.base_price, 10);
        assert!(item.enabled);
        assert_eq!(item.limit_mode, LimitMode::OneStack);
        assert!(item.resolved_quantity_limit() > 0);
        assert_eq!(item.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_derive_failure_keeps_key() {
        let candidate = ThingCandidate::item("Glitch", f64::INFINITY, "Foods");
        let derived = StoreItems::derive(&candidate, &CatalogRules::default());
        assert_eq!(derived[0].0.as_str(), "Glitch");
        assert!(derived[0].1.is_err());
    }

    #[test]
    fn test_resolved_quantity_limit() {
        let mut item = meal();
        item.stack_limit = 10;
        item.limit_mode = LimitMode::ThreeStacks;
        assert_eq!(item.resolved_quantity_limit(), 30);

        item.limit_mode = LimitMode::PerUnit;
        item.quantity_limit = 0;
        assert_eq!(item.resolved_quantity_limit(), 1);
        item.quantity_limit = -4;
        assert_eq!(item.resolved_quantity_limit(), 1);
        item.quantity_limit = 7;
        assert_eq!(item.resolved_quantity_limit(), 7);
    }

    #[test]
    fn test_correct_preserves_user_fields() {
        let fresh = meal();
        let mut existing = fresh.clone();
        existing.base_price = 99;
        existing.enabled = false;
        existing.custom_name = true;
        existing.name = "Mystery stew".to_string();
        existing.category = ItemCategory::Misc;
        existing.is_usable = true;

        let changed = StoreItems::correct(&mut existing, &fresh);

        assert_eq!(changed, vec!["Category", "IsUsable"]);
        assert_eq!(existing.base_price, 99);
        assert!(!existing.enabled);
        assert_eq!(existing.name, "Mystery stew");
        assert_eq!(existing.category, ItemCategory::Foods);
    }

    #[test]
    fn test_correct_repairs_non_positive_values() {
        let fresh = meal();
        let mut existing = fresh.clone();
        existing.base_price = 0;
        existing.quantity_limit = 0;

        let changed = StoreItems::correct(&mut existing, &fresh);

        assert_eq!(changed, vec!["BasePrice", "QuantityLimit"]);
        assert_eq!(existing.base_price, 10);
        assert!(existing.quantity_limit > 0);
        assert!(StoreItems::correct(&mut existing, &fresh).is_empty());
    }

    #[test]
    fn test_legacy_price_migration() {
        let mut disabled = json!({"DefName": "Beer", "Price": -25});
        split_legacy_price(disabled.as_object_mut().unwrap());
        assert_eq!(disabled, json!({"DefName": "Beer", "Enabled": false, "BasePrice": 25}));

        let mut enabled = json!({"DefName": "Beer", "Price": 12});
        split_legacy_price(enabled.as_object_mut().unwrap());
        assert_eq!(enabled["BasePrice"], json!(12));
        assert_eq!(enabled["Enabled"], json!(true));
    }

    #[test]
    fn test_limit_and_capability_migrations() {
        let mut object = json!({"BasePrice": 5, "QuantityLimit": 20});
        add_limits(object.as_object_mut().unwrap());
        assert_eq!(object["LimitMode"], json!("OneStack"));
        assert_eq!(object["QuantityLimit"], json!(20));

        add_capabilities(object.as_object_mut().unwrap());
        assert_eq!(object["IsWearable"], json!(false));
    }

    #[test]
    fn test_v1_entry_decodes_after_migration() {
        let legacy = json!({"DefName": "Beer", "Price": -25, "Category": "Drugs"});
        let (value, migrated) = migration::migrate(StoreItems::migrations(), "Beer", legacy).unwrap();
        assert!(migrated);

        let item: StoreItem = serde_json::from_value(value).unwrap();
        assert_eq!(item.base_price, 25);
        assert!(!item.enabled);
        assert_eq!(item.category, ItemCategory::Drugs);
        assert_eq!(item.limit_mode, LimitMode::OneStack);
        assert_eq!(item.resolved_quantity_limit(), 1);
    }

    #[test]
    fn test_limit_mode_names() {
        assert_eq!(serde_json::to_value(LimitMode::PerUnit).unwrap(), json!("Unit"));
        let mode: LimitMode = serde_json::from_value(json!("fivestacks")).unwrap();
        assert_eq!(mode, LimitMode::FiveStacks);
        let mode: LimitMode = serde_json::from_value(json!("Pallet")).unwrap();
        assert_eq!(mode, LimitMode::OneStack);
    }
}
