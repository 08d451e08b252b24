//! Outcomes of loading, initializing and reconciling a catalog

use indexmap::IndexMap;
use std::fmt;

/// Why reconciliation dropped an entry
///
/// Only used for logging; every removal is handled the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    NoLongerExists,
    FailedValidation,
    NoLongerTradeable,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalReason::NoLongerExists => write!(f, "no longer exists"),
            RemovalReason::FailedValidation => write!(f, "failed validation"),
            RemovalReason::NoLongerTradeable => write!(f, "no longer tradeable"),
        }
    }
}

/// Changes made by one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keys of entries created for new candidates
    pub added: Vec<String>,
    /// Keys of refreshed entries with the fields that changed
    pub corrected: Vec<(String, Vec<&'static str>)>,
    /// Keys of dropped entries
    pub removed: Vec<(String, RemovalReason)>,
}

impl ReconcileReport {
    /// True when nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.corrected.is_empty() && self.removed.is_empty()
    }

    /// Reason a key was removed, if it was
    pub fn removal_of(&self, key: &str) -> Option<RemovalReason> {
        self.removed.iter().find(|(k, _)| k == key).map(|(_, r)| *r)
    }

    /// Field names corrected on a key
    pub fn corrections_of(&self, key: &str) -> &[&'static str] {
        self.corrected
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fields)| fields.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} corrected, {} removed",
            self.added.len(),
            self.corrected.len(),
            self.removed.len()
        )
    }
}

/// Why a catalog was built from defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultsCause {
    /// No saved file (first run)
    Missing,
    /// Saved file was empty or unparseable
    Corrupt,
    /// Saved file could not be read
    Unreadable,
}

/// Result of `initialize`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// Defaults were generated and persisted
    Created { entries: usize, cause: DefaultsCause },
    /// Saved state was loaded and reconciled
    Loaded { entries: usize, report: ReconcileReport },
    /// Another caller already did the work
    AlreadyInitialized,
}

/// Result of reading the persisted catalog
#[derive(Debug, Clone)]
pub enum LoadOutcome<E> {
    Loaded {
        entries: IndexMap<String, E>,
        /// Some entries were migrated or dropped, so the file needs rewriting
        repaired: bool,
    },
    Missing,
    Corrupt,
    Unreadable,
}

impl<E> LoadOutcome<E> {
    /// Whether usable entries were read
    pub fn is_ok(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }

    /// Why defaults are needed, or `None` when the load succeeded
    pub fn defaults_cause(&self) -> Option<DefaultsCause> {
        match self {
            LoadOutcome::Loaded { .. } => None,
            LoadOutcome::Missing => Some(DefaultsCause::Missing),
            LoadOutcome::Corrupt => Some(DefaultsCause::Corrupt),
            LoadOutcome::Unreadable => Some(DefaultsCause::Unreadable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary() {
        let mut report = ReconcileReport::default();
        assert!(report.is_empty());

        report.added.push("Steel".to_string());
        report.corrected.push(("MealSimple".to_string(), vec!["Category"]));
        report
            .removed
            .push(("Rock".to_string(), RemovalReason::NoLongerTradeable));

        assert!(!report.is_empty());
        assert_eq!(report.to_string(), "1 added, 1 corrected, 1 removed");
        assert_eq!(report.removal_of("Rock"), Some(RemovalReason::NoLongerTradeable));
        assert_eq!(report.corrections_of("MealSimple"), &["Category"]);
        assert!(report.corrections_of("Steel").is_empty());
    }

    #[test]
    fn test_load_outcome_causes() {
        let missing: LoadOutcome<u8> = LoadOutcome::Missing;
        assert!(!missing.is_ok());
        assert_eq!(missing.defaults_cause(), Some(DefaultsCause::Missing));

        let loaded: LoadOutcome<u8> = LoadOutcome::Loaded {
            entries: IndexMap::new(),
            repaired: false,
        };
        assert!(loaded.is_ok());
        assert_eq!(loaded.defaults_cause(), None);
    }
}
