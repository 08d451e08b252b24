//! Versioned schema migration for persisted entries
//!
//! Each catalog kind declares an ordered list of [`MigrationStep`]s. The
//! schema version of a persisted entry is detected from which marker
//! fields it carries: the first step whose marker is absent tells the
//! version the entry is at. From there every remaining step is applied in
//! order until the entry is current.
//!
//! ```text
//! { Price }                      v1 ──► { BasePrice, Enabled }
//! { BasePrice }                  v2 ──► + { LimitMode, QuantityLimit }
//! { BasePrice, LimitMode }       v3 ──► + { IsUsable, IsWearable, IsEquippable }
//! ```
//!
//! Upgrades are pure functions over the JSON object and only insert what is
//! missing, so an entry that already has a later field keeps it.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// One upgrade from `version` to `version + 1`
#[derive(Clone, Copy)]
pub struct MigrationStep {
    /// Version this step upgrades from
    pub version: u32,
    /// Field whose absence means the entry is still at `version`
    pub marker: &'static str,
    /// The upgrade itself
    pub upgrade: fn(&mut Map<String, Value>),
}

impl std::fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("version", &self.version)
            .field("marker", &self.marker)
            .finish()
    }
}

/// Version every entry ends up at
pub fn current_version(steps: &[MigrationStep]) -> u32 {
    steps.last().map(|s| s.version + 1).unwrap_or(1)
}

/// Detect the schema version of an entry
pub fn schema_version(steps: &[MigrationStep], object: &Map<String, Value>) -> u32 {
    steps
        .iter()
        .find(|step| !object.contains_key(step.marker))
        .map(|step| step.version)
        .unwrap_or_else(|| current_version(steps))
}

/// Bring one persisted entry up to the current schema
///
/// Returns the upgraded value and whether anything had to be done.
pub fn migrate(steps: &[MigrationStep], key: &str, value: Value) -> Result<(Value, bool)> {
    let Value::Object(mut object) = value else {
        return Err(Error::NotAnObject {
            key: key.to_string(),
        });
    };

    let from = schema_version(steps, &object);
    let to = current_version(steps);
    if from == to {
        return Ok((Value::Object(object), false));
    }

    for step in steps.iter().filter(|step| step.version >= from) {
        (step.upgrade)(&mut object);
    }
    tracing::debug!(key, from, to, "migrated entry");
    Ok((Value::Object(object), true))
}

/// Insert `value` under `field` unless the field is already there
pub(crate) fn insert_missing(object: &mut Map<String, Value>, field: &str, value: Value) {
    if !object.contains_key(field) {
        object.insert(field.to_string(), value);
    }
}

/// Integer value of a legacy numeric field, tolerating floats and strings
pub(crate) fn legacy_number(object: &Map<String, Value>, field: &str) -> Option<i64> {
    match object.get(field)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
