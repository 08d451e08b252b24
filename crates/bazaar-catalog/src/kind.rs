//! The seam between the shared catalog engine and each entry kind

use crate::error::Result;
use crate::filter::Rejection;
use crate::migration::MigrationStep;
use crate::rules::CatalogRules;
use bazaar_core::{EntryKey, SourceEnumerator, SourceError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A persisted catalog entry
pub trait CatalogEntry:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Key of the entry, equal to its key in the catalog map
    fn key(&self) -> &str;

    /// Whether the entry is offered to viewers
    fn is_enabled(&self) -> bool;

    /// Category string, for kinds that have one
    fn category(&self) -> Option<&str> {
        None
    }
}

/// Everything the engine needs to know about one kind of catalog
pub trait CatalogKind: Send + Sync + 'static {
    /// Source descriptor entries are derived from
    type Candidate;
    /// Persisted entry
    type Entry: CatalogEntry;

    /// File the catalog is persisted as
    const FILE_NAME: &'static str;
    /// Name used in logs
    const LABEL: &'static str;
    /// Field of the persisted entry holding its key
    const KEY_FIELD: &'static str;

    /// Live candidates from the host
    fn candidates(source: &dyn SourceEnumerator) -> std::result::Result<Vec<Self::Candidate>, SourceError>;

    /// Definition name of a candidate, for logs
    fn candidate_name(candidate: &Self::Candidate) -> &str;

    /// Whether a candidate may be in the catalog
    fn screen(candidate: &Self::Candidate, rules: &CatalogRules) -> std::result::Result<(), Rejection>;

    /// Fresh entries for a candidate, one per key
    ///
    /// Keys are produced even when building an entry fails, so the engine
    /// can still tell which persisted entries the candidate backs.
    fn derive(candidate: &Self::Candidate, rules: &CatalogRules) -> Vec<(EntryKey, Result<Self::Entry>)>;

    /// Refresh source-derived fields of `existing` from `fresh`
    ///
    /// User-editable fields are left alone. Returns the names of the fields
    /// that changed.
    fn correct(existing: &mut Self::Entry, fresh: &Self::Entry) -> Vec<&'static str>;

    /// Schema upgrades for persisted entries, oldest first
    fn migrations() -> &'static [MigrationStep];
}

/// Assign `fresh` to `field` if it differs, noting the change
pub(crate) fn refresh<T: PartialEq + Clone>(
    field: &mut T,
    fresh: &T,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if field != fresh {
        *field = fresh.clone();
        changed.push(name);
    }
}

/// Replace a non-positive price with the derived one
pub(crate) fn repair_price(price: &mut i32, fresh: i32, name: &'static str, changed: &mut Vec<&'static str>) {
    if *price <= 0 && fresh > 0 {
        *price = fresh;
        changed.push(name);
    }
}
