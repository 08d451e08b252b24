//! The catalog engine shared by every entry kind

use crate::filter::Rejection;
use crate::kind::{CatalogEntry, CatalogKind};
use crate::migration;
use crate::report::{DefaultsCause, InitOutcome, LoadOutcome, ReconcileReport, RemovalReason};
use crate::rules::CatalogRules;
use bazaar_core::{candidates_or_empty, Notifier, SourceEnumerator};
use bazaar_db::recover::{quarantine, report_io_failure};
use bazaar_db::{save_logged, Persistence, SaveQueue};
use indexmap::IndexMap;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What the live source says about one key
enum Slot<E> {
    /// Backed by a valid candidate; holds the freshly derived entry
    Valid(E),
    /// Backed by a candidate the filtering policy rejects
    Rejected(Rejection),
    /// Backed by a valid candidate whose entry could not be built
    Broken,
}

/// A persisted, self-reconciling catalog of one entry kind
///
/// Readers go through the `RwLock`; everything that mutates or persists
/// takes `write_lock` first so writers are serialized.
pub struct Catalog<K: CatalogKind> {
    entries: RwLock<IndexMap<String, K::Entry>>,
    write_lock: Mutex<()>,
    initialized: AtomicBool,
    store: Arc<dyn Persistence>,
    source: Arc<dyn SourceEnumerator>,
    notifier: Arc<dyn Notifier>,
    rules: Arc<CatalogRules>,
    queue: Option<SaveQueue>,
    file_name: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: CatalogKind> Catalog<K> {
    /// Create an empty, uninitialized catalog
    pub fn new(
        store: Arc<dyn Persistence>,
        source: Arc<dyn SourceEnumerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            write_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
            store,
            source,
            notifier,
            rules: Arc::new(CatalogRules::default()),
            queue: None,
            file_name: K::FILE_NAME.to_string(),
            _kind: PhantomData,
        }
    }

    /// Use the given filtering and classification rules
    pub fn with_rules(mut self, rules: Arc<CatalogRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Send routine saves through a background queue
    pub fn with_queue(mut self, queue: SaveQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Persist under a different file name
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Name of the persisted file
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Whether `initialize` (or a maintenance operation) has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Load (or create) the catalog and reconcile it with the source
    ///
    /// Only the first call does any work; later calls return
    /// [`InitOutcome::AlreadyInitialized`].
    pub fn initialize(&self) -> InitOutcome {
        if self.is_initialized() {
            return InitOutcome::AlreadyInitialized;
        }
        let _guard = self.lock_writer();
        if self.is_initialized() {
            return InitOutcome::AlreadyInitialized;
        }
        let outcome = self.load_and_reconcile();
        self.initialized.store(true, Ordering::Release);
        outcome
    }

    /// Run Load and Reconcile again, ignoring the initialized flag
    pub fn force_reload(&self) -> InitOutcome {
        let _guard = self.lock_writer();
        tracing::info!(catalog = K::LABEL, "reloading from disk");
        let outcome = self.load_and_reconcile();
        self.initialized.store(true, Ordering::Release);
        outcome
    }

    /// Discard all persisted state and rebuild from the source
    ///
    /// Returns the number of entries created.
    pub fn rebuild(&self) -> usize {
        let _guard = self.lock_writer();
        let defaults = self.create_defaults();
        let count = defaults.len();
        *self.write_entries() = defaults;
        self.persist_now_locked();
        self.initialized.store(true, Ordering::Release);
        tracing::info!(catalog = K::LABEL, entries = count, "rebuilt from source");
        count
    }

    /// Caller must hold `write_lock`.
    fn load_and_reconcile(&self) -> InitOutcome {
        let outcome = match self.load() {
            LoadOutcome::Loaded { entries, repaired } => {
                *self.write_entries() = entries;
                let report = self.reconcile_locked();
                if repaired || !report.is_empty() {
                    self.persist_now_locked();
                }
                InitOutcome::Loaded {
                    entries: self.len(),
                    report,
                }
            }
            failed => {
                let cause = failed.defaults_cause().unwrap_or(DefaultsCause::Missing);
                let defaults = self.create_defaults();
                let count = defaults.len();
                *self.write_entries() = defaults;
                self.persist_now_locked();
                InitOutcome::Created {
                    entries: count,
                    cause,
                }
            }
        };

        match &outcome {
            InitOutcome::Loaded { entries, report } => {
                tracing::info!(catalog = K::LABEL, entries, "loaded: {report}");
                for (key, reason) in &report.removed {
                    tracing::info!(catalog = K::LABEL, key = %key, "removed: {reason}");
                }
            }
            InitOutcome::Created { entries, cause } => {
                tracing::info!(catalog = K::LABEL, entries, ?cause, "created defaults");
            }
            InitOutcome::AlreadyInitialized => {}
        }
        outcome
    }

    /// Read the persisted catalog without touching in-memory state
    ///
    /// An empty file counts as corrupt. Corrupt files are backed up and the
    /// user is notified; unreadable files are reported as critical.
    pub fn load(&self) -> LoadOutcome<K::Entry> {
        let name = self.file_name.as_str();
        let raw = match self.store.load_file(name) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!(catalog = K::LABEL, file = name, "no saved catalog");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                report_io_failure(self.notifier.as_ref(), name, "read", &err);
                return LoadOutcome::Unreadable;
            }
        };

        if raw.trim().is_empty() {
            quarantine(self.store.as_ref(), self.notifier.as_ref(), name, &raw, "file is empty");
            return LoadOutcome::Corrupt;
        }

        let objects: IndexMap<String, Value> = match serde_json::from_str(&raw) {
            Ok(objects) => objects,
            Err(err) => {
                quarantine(
                    self.store.as_ref(),
                    self.notifier.as_ref(),
                    name,
                    &raw,
                    &err.to_string(),
                );
                return LoadOutcome::Corrupt;
            }
        };

        let (entries, repaired) = self.decode(objects);
        LoadOutcome::Loaded { entries, repaired }
    }

    /// Migrate and deserialize each persisted entry on its own
    fn decode(&self, objects: IndexMap<String, Value>) -> (IndexMap<String, K::Entry>, bool) {
        let mut entries = IndexMap::with_capacity(objects.len());
        let mut repaired = false;

        for (key, value) in objects {
            if key.trim().is_empty() {
                tracing::warn!(catalog = K::LABEL, "dropping entry with an empty key");
                repaired = true;
                continue;
            }
            let (mut value, migrated) = match migration::migrate(K::migrations(), &key, value) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(catalog = K::LABEL, key = %key, "dropping entry: {err}");
                    repaired = true;
                    continue;
                }
            };
            repaired |= migrated;

            // The map key wins over whatever the entry says about itself
            if let Value::Object(object) = &mut value {
                let stored = object.get(K::KEY_FIELD).and_then(Value::as_str);
                if stored != Some(key.as_str()) {
                    object.insert(K::KEY_FIELD.to_string(), Value::String(key.clone()));
                    repaired = true;
                }
            }

            match serde_json::from_value::<K::Entry>(value) {
                Ok(entry) => {
                    entries.insert(key, entry);
                }
                Err(err) => {
                    tracing::warn!(catalog = K::LABEL, key = %key, "dropping entry: {err}");
                    repaired = true;
                }
            }
        }
        (entries, repaired)
    }

    /// Build a fresh catalog from the current source candidates
    ///
    /// A failing source yields an empty catalog. Duplicate keys keep the
    /// first entry; entries that cannot be built are skipped.
    pub fn create_defaults(&self) -> IndexMap<String, K::Entry> {
        let candidates = candidates_or_empty(K::LABEL, K::candidates(self.source.as_ref()));
        let mut entries = IndexMap::new();

        for candidate in &candidates {
            if let Err(rejection) = K::screen(candidate, &self.rules) {
                tracing::trace!(
                    catalog = K::LABEL,
                    candidate = K::candidate_name(candidate),
                    "skipped: {rejection}"
                );
                continue;
            }
            for (key, result) in K::derive(candidate, &self.rules) {
                match result {
                    Ok(_) if key.is_empty() => {
                        tracing::warn!(catalog = K::LABEL, "skipped entry with an empty key");
                    }
                    Ok(_) if entries.contains_key(key.as_str()) => {
                        tracing::debug!(catalog = K::LABEL, key = %key, "duplicate key skipped");
                    }
                    Ok(entry) => {
                        entries.insert(key.0, entry);
                    }
                    Err(err) => {
                        tracing::warn!(catalog = K::LABEL, key = %key, "could not build entry: {err}");
                    }
                }
            }
        }
        entries
    }

    /// Merge the live source into the catalog and persist if anything changed
    pub fn reconcile_with_source(&self) -> ReconcileReport {
        let _guard = self.lock_writer();
        let report = self.reconcile_locked();
        if !report.is_empty() {
            tracing::info!(catalog = K::LABEL, "reconciled: {report}");
            self.persist_locked();
        }
        report
    }

    /// Caller must hold `write_lock`.
    fn reconcile_locked(&self) -> ReconcileReport {
        let candidates = match K::candidates(self.source.as_ref()) {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::error!(catalog = K::LABEL, "{err}; keeping saved entries unchanged");
                return ReconcileReport::default();
            }
        };
        let slots = self.index(&candidates);

        let mut report = ReconcileReport::default();
        let mut entries = self.write_entries();

        entries.retain(|key, entry| match slots.get(key) {
            None => {
                report.removed.push((key.clone(), RemovalReason::NoLongerExists));
                false
            }
            Some(Slot::Rejected(rejection)) => {
                report.removed.push((key.clone(), rejection.removal_reason()));
                false
            }
            Some(Slot::Broken) => true,
            Some(Slot::Valid(fresh)) => {
                let fields = K::correct(entry, fresh);
                if !fields.is_empty() {
                    report.corrected.push((key.clone(), fields));
                }
                true
            }
        });

        for (key, slot) in slots {
            if let Slot::Valid(fresh) = slot {
                if !entries.contains_key(&key) {
                    report.added.push(key.clone());
                    entries.insert(key, fresh);
                }
            }
        }
        report
    }

    /// What each live key resolves to; the first candidate for a key wins
    fn index(&self, candidates: &[K::Candidate]) -> IndexMap<String, Slot<K::Entry>> {
        let mut slots = IndexMap::new();
        for candidate in candidates {
            let verdict = K::screen(candidate, &self.rules);
            for (key, result) in K::derive(candidate, &self.rules) {
                if key.is_empty() || slots.contains_key(key.as_str()) {
                    continue;
                }
                let slot = match (verdict, result) {
                    (Err(rejection), _) => Slot::Rejected(rejection),
                    (Ok(()), Ok(entry)) => Slot::Valid(entry),
                    (Ok(()), Err(err)) => {
                        tracing::warn!(catalog = K::LABEL, key = %key, "could not build entry: {err}");
                        Slot::Broken
                    }
                };
                slots.insert(key.0, slot);
            }
        }
        slots
    }

    /// Save the catalog, in the background when a queue is attached
    pub fn persist(&self) {
        let _guard = self.lock_writer();
        self.persist_locked();
    }

    /// Save the catalog synchronously
    ///
    /// Returns whether the write succeeded. Failures are logged and
    /// reported; in-memory state is kept either way.
    pub fn persist_now(&self) -> bool {
        let _guard = self.lock_writer();
        self.persist_now_locked()
    }

    fn persist_locked(&self) {
        let Some(content) = self.serialize() else {
            return;
        };
        match &self.queue {
            Some(queue) => queue.enqueue(self.file_name.clone(), content),
            None => {
                save_logged(self.store.as_ref(), &self.file_name, &content);
            }
        }
    }

    fn persist_now_locked(&self) -> bool {
        let Some(content) = self.serialize() else {
            return false;
        };
        // Older queued saves of this file must not land after this one
        if let Some(queue) = &self.queue {
            queue.flush();
        }
        match self.store.save_file(&self.file_name, &content) {
            Ok(()) => {
                tracing::debug!(catalog = K::LABEL, entries = self.len(), "saved");
                true
            }
            Err(err) => {
                report_io_failure(self.notifier.as_ref(), &self.file_name, "save", &err);
                false
            }
        }
    }

    fn serialize(&self) -> Option<String> {
        match serde_json::to_string_pretty(&*self.read_entries()) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::error!(catalog = K::LABEL, "could not serialize catalog: {err}");
                None
            }
        }
    }

    /// Entry by key
    pub fn get(&self, key: &str) -> Option<K::Entry> {
        self.read_entries().get(key).cloned()
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.read_entries().contains_key(key)
    }

    /// Entries offered to viewers
    pub fn enabled(&self) -> Vec<K::Entry> {
        self.read_entries()
            .values()
            .filter(|e| e.is_enabled())
            .cloned()
            .collect()
    }

    /// Entries in a category (case-insensitive)
    pub fn by_category(&self, category: &str) -> Vec<K::Entry> {
        self.read_entries()
            .values()
            .filter(|e| e.category().is_some_and(|c| c.eq_ignore_ascii_case(category)))
            .cloned()
            .collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// All keys, in catalog order
    pub fn keys(&self) -> Vec<String> {
        self.read_entries().keys().cloned().collect()
    }

    /// Copy of every entry
    pub fn snapshot(&self) -> IndexMap<String, K::Entry> {
        self.read_entries().clone()
    }

    /// Edit one entry and queue a save
    ///
    /// Returns false when the key is unknown or the edit tried to change
    /// the entry's key, in which case nothing is changed.
    pub fn update(&self, key: &str, edit: impl FnOnce(&mut K::Entry)) -> bool {
        let _guard = self.lock_writer();
        {
            let mut entries = self.write_entries();
            let Some(entry) = entries.get_mut(key) else {
                return false;
            };
            let before = entry.clone();
            edit(entry);
            if entry.key() != key {
                tracing::warn!(catalog = K::LABEL, key, "edit changed the entry key; reverted");
                *entry = before;
                return false;
            }
            if *entry == before {
                return true;
            }
        }
        self.persist_locked();
        true
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, IndexMap<String, K::Entry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, IndexMap<String, K::Entry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ItemCatalog, ItemCategory, LimitMode, StoreItems, TraitCatalog, WeatherCatalog,
    };
    use bazaar_core::{
        DefName, Favorability, MemoryNotifier, Severity, StaticSource, ThingCandidate,
        TraitCandidate, TraitDegree, WeatherCandidate,
    };
    use bazaar_db::{MemoryStore, SaveWorker};

    struct Fixture {
        store: Arc<MemoryStore>,
        source: Arc<StaticSource>,
        notifier: Arc<MemoryNotifier>,
    }

    impl Fixture {
        fn new(things: Vec<ThingCandidate>) -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                source: Arc::new(StaticSource::with_things(things)),
                notifier: Arc::new(MemoryNotifier::new()),
            }
        }

        fn items(&self) -> ItemCatalog {
            Catalog::new(self.store.clone(), self.source.clone(), self.notifier.clone())
        }
    }

    fn meal() -> ThingCandidate {
        ThingCandidate::item("MealSimple", 10.0, "Foods")
    }

    fn steel() -> ThingCandidate {
        ThingCandidate::item("Steel", 1.9, "ResourcesRaw")
    }

    #[test]
    fn test_meal_simple_scenario() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();

        let outcome = catalog.initialize();
        assert_eq!(
            outcome,
            InitOutcome::Created {
                entries: 1,
                cause: DefaultsCause::Missing
            }
        );
        let entry = catalog.get("MealSimple").unwrap();
        assert!(entry.resolved_quantity_limit() > 0);
        assert!(entry.quantity_limit > 0);
        assert!(entry.enabled);

        fx.source.remove_thing("MealSimple");
        let report = catalog.reconcile_with_source();
        assert_eq!(report.removal_of("MealSimple"), Some(RemovalReason::NoLongerExists));
        assert!(catalog.get("MealSimple").is_none());
    }

    #[test]
    fn test_initialize_runs_once() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();
        assert!(matches!(catalog.initialize(), InitOutcome::Created { .. }));
        assert_eq!(catalog.initialize(), InitOutcome::AlreadyInitialized);
        assert_eq!(fx.store.save_count(), 1);
    }

    #[test]
    fn test_concurrent_initialize() {
        let fx = Fixture::new(vec![meal(), steel()]);
        let catalog = fx.items();

        let outcomes: Vec<InitOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| catalog.initialize())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let created = outcomes
            .iter()
            .filter(|o| matches!(o, InitOutcome::Created { .. }))
            .count();
        assert_eq!(created, 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_keys_are_unique() {
        let fx = Fixture::new(vec![meal(), meal(), steel()]);
        let catalog = fx.items();
        catalog.initialize();

        let keys = catalog.keys();
        assert_eq!(keys, vec!["MealSimple".to_string(), "Steel".to_string()]);

        fx.source.push_thing(steel());
        catalog.reconcile_with_source();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let fx = Fixture::new(vec![meal(), steel()]);
        let catalog = fx.items();
        catalog.initialize();

        fx.source.push_thing(ThingCandidate::item("Beer", 12.0, "Drugs"));
        let first = catalog.reconcile_with_source();
        assert_eq!(first.added, vec!["Beer".to_string()]);

        let saves = fx.store.save_count();
        let before = catalog.snapshot();
        let second = catalog.reconcile_with_source();

        assert!(second.is_empty());
        assert_eq!(fx.store.save_count(), saves);
        assert_eq!(catalog.snapshot(), before);
    }

    #[test]
    fn test_customizations_survive_reconcile() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();
        catalog.initialize();

        assert!(catalog.update("MealSimple", |item| {
            item.base_price = 99;
            item.enabled = false;
            item.limit_mode = LimitMode::FiveStacks;
        }));

        let report = catalog.reconcile_with_source();
        assert!(report.is_empty());
        let entry = catalog.get("MealSimple").unwrap();
        assert_eq!(entry.base_price, 99);
        assert!(!entry.enabled);
        assert_eq!(entry.limit_mode, LimitMode::FiveStacks);

        // Source reclassifies the meal: derived fields follow, user fields stay
        let mut changed = meal();
        changed.categories = vec!["Drugs".to_string()];
        changed.usable = true;
        fx.source.set_things(vec![changed]);

        let report = catalog.reconcile_with_source();
        assert_eq!(report.corrections_of("MealSimple"), &["Category", "IsUsable"]);
        let entry = catalog.get("MealSimple").unwrap();
        assert_eq!(entry.category, ItemCategory::Drugs);
        assert!(entry.is_usable);
        assert_eq!(entry.base_price, 99);
        assert!(!entry.enabled);
    }

    #[test]
    fn test_removal_reasons() {
        let fx = Fixture::new(vec![meal(), steel()]);
        let catalog = fx.items();
        catalog.initialize();

        let mut worthless = steel();
        worthless.market_value = 0.0;
        let mut chunk = meal();
        chunk.categories = vec!["Chunks".to_string()];
        fx.source.set_things(vec![chunk, worthless]);

        let report = catalog.reconcile_with_source();
        assert_eq!(report.removal_of("Steel"), Some(RemovalReason::NoLongerTradeable));
        assert_eq!(report.removal_of("MealSimple"), Some(RemovalReason::FailedValidation));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_corrupt_file_recovers_with_defaults() {
        let fx = Fixture::new(vec![meal()]);
        fx.store.insert("StoreItems.json", "{\"MealSimple\": {oops");
        let catalog = fx.items();

        assert!(matches!(catalog.load(), LoadOutcome::Corrupt));
        assert_eq!(fx.store.backups().len(), 1);

        let outcome = catalog.initialize();
        assert_eq!(
            outcome,
            InitOutcome::Created {
                entries: 1,
                cause: DefaultsCause::Corrupt
            }
        );
        assert!(catalog.get("MealSimple").is_some());
        assert_eq!(fx.store.backups()[0].1, "{\"MealSimple\": {oops");
        assert!(fx
            .notifier
            .notices()
            .iter()
            .all(|n| n.severity == Severity::Warning));

        let saved = fx.store.contents("StoreItems.json").unwrap();
        assert!(saved.contains("\"MealSimple\""));
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let fx = Fixture::new(vec![meal()]);
        fx.store.insert("StoreItems.json", "  \n");
        let catalog = fx.items();

        assert!(matches!(
            catalog.initialize(),
            InitOutcome::Created {
                cause: DefaultsCause::Corrupt,
                ..
            }
        ));
        assert_eq!(fx.store.backups().len(), 1);
    }

    #[test]
    fn test_unreadable_file_is_critical() {
        let fx = Fixture::new(vec![meal()]);
        fx.store.set_fail_reads(true);
        let catalog = fx.items();

        assert!(matches!(
            catalog.initialize(),
            InitOutcome::Created {
                cause: DefaultsCause::Unreadable,
                ..
            }
        ));
        assert!(catalog.get("MealSimple").is_some());
        assert_eq!(fx.notifier.notices()[0].severity, Severity::Critical);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let fx = Fixture::new(vec![meal()]);
        fx.store.set_fail_writes(true);
        let catalog = fx.items();

        catalog.initialize();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.persist_now());
        assert!(fx
            .notifier
            .notices()
            .iter()
            .any(|n| n.severity == Severity::Critical));
    }

    #[test]
    fn test_legacy_file_is_migrated_and_rewritten() {
        let fx = Fixture::new(vec![meal()]);
        fx.store.insert(
            "StoreItems.json",
            r#"{"MealSimple": {"DefName": "MealSimple", "Price": -25, "Category": "Foods"},
                "Gone": {"DefName": "Gone", "Price": 5},
                "Broken": 7}"#,
        );
        let catalog = fx.items();

        let InitOutcome::Loaded { report, .. } = catalog.initialize() else {
            panic!("expected the saved file to load");
        };
        assert_eq!(report.removal_of("Gone"), Some(RemovalReason::NoLongerExists));

        let entry = catalog.get("MealSimple").unwrap();
        assert_eq!(entry.base_price, 25);
        assert!(!entry.enabled);
        assert!(entry.quantity_limit > 0);
        assert_eq!(catalog.len(), 1);

        let saved = fx.store.contents("StoreItems.json").unwrap();
        assert!(saved.contains("\"LimitMode\""));
        assert!(!saved.contains("\"Price\""));
    }

    #[test]
    fn test_current_file_loads_without_rewrite() {
        let fx = Fixture::new(vec![meal()]);
        let first = fx.items();
        first.initialize();
        let saves = fx.store.save_count();

        let second = fx.items();
        assert!(matches!(second.initialize(), InitOutcome::Loaded { .. }));
        assert_eq!(fx.store.save_count(), saves);
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[test]
    fn test_failing_source_keeps_saved_entries() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();
        catalog.initialize();

        fx.source.set_failing(true);
        let report = catalog.reconcile_with_source();
        assert!(report.is_empty());
        assert!(catalog.contains("MealSimple"));

        // With nothing saved, a failing source just yields an empty catalog
        assert!(catalog.create_defaults().is_empty());
    }

    #[test]
    fn test_bad_candidate_does_not_abort_build() {
        let fx = Fixture::new(vec![
            ThingCandidate::item("Glitch", f64::INFINITY, "Foods"),
            meal(),
        ]);
        let catalog = fx.items();
        catalog.initialize();
        assert_eq!(catalog.keys(), vec!["MealSimple".to_string()]);
    }

    #[test]
    fn test_queries() {
        let fx = Fixture::new(vec![meal(), steel(), ThingCandidate::item("Beer", 12.0, "Drugs")]);
        let catalog = fx.items();
        catalog.initialize();
        catalog.update("Beer", |item| item.enabled = false);

        assert_eq!(catalog.enabled().len(), 2);
        let foods = catalog.by_category("foods");
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].def_name, "MealSimple");
        assert!(catalog.by_category("Weapons").is_empty());
    }

    #[test]
    fn test_update_rejects_key_changes() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();
        catalog.initialize();

        assert!(!catalog.update("Missing", |item| item.base_price = 1));
        assert!(!catalog.update("MealSimple", |item| item.def_name = "Other".to_string()));
        assert!(catalog.get("MealSimple").is_some());
    }

    #[test]
    fn test_rebuild_and_force_reload() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items();
        catalog.initialize();
        catalog.update("MealSimple", |item| item.base_price = 77);

        // Reload sees the saved edit
        assert!(matches!(catalog.force_reload(), InitOutcome::Loaded { .. }));
        assert_eq!(catalog.get("MealSimple").unwrap().base_price, 77);

        // Rebuild throws it away
        assert_eq!(catalog.rebuild(), 1);
        assert_eq!(catalog.get("MealSimple").unwrap().base_price, 10);
        let reloaded = fx.items();
        reloaded.initialize();
        assert_eq!(reloaded.get("MealSimple").unwrap().base_price, 10);
    }

    #[test]
    fn test_queued_persist() {
        let fx = Fixture::new(vec![meal()]);
        let worker = SaveWorker::spawn(fx.store.clone(), 4).unwrap();
        let catalog = fx.items().with_queue(worker.queue());
        catalog.initialize();

        catalog.update("MealSimple", |item| item.base_price = 42);
        assert!(worker.queue().flush());

        let saved = fx.store.contents("StoreItems.json").unwrap();
        assert!(saved.contains("\"BasePrice\": 42"));
        worker.shutdown();
    }

    #[test]
    fn test_trait_catalog() {
        let fx = Fixture::new(Vec::new());
        fx.source.set_traits(vec![
            TraitCandidate {
                def_name: DefName::new("Nerves"),
                degrees: vec![
                    TraitDegree {
                        degree: -1,
                        label: "nervous".to_string(),
                        description: String::new(),
                    },
                    TraitDegree {
                        degree: 1,
                        label: "steadfast".to_string(),
                        description: String::new(),
                    },
                ],
                can_gain: true,
                can_lose: true,
                mod_source: "Core".to_string(),
            },
            TraitCandidate {
                def_name: DefName::new("Unlabelled"),
                degrees: Vec::new(),
                can_gain: true,
                can_lose: true,
                mod_source: String::new(),
            },
        ]);
        let traits: TraitCatalog =
            Catalog::new(fx.store.clone(), fx.source.clone(), fx.notifier.clone());

        traits.initialize();
        assert_eq!(traits.keys(), vec!["Nerves_-1".to_string(), "Nerves_1".to_string()]);

        let saved = fx.store.contents("Traits.json").unwrap();
        assert!(saved.contains("\"Key\": \"Nerves_1\""));
        assert!(traits.reconcile_with_source().is_empty());
    }

    #[test]
    fn test_weather_catalog() {
        let fx = Fixture::new(Vec::new());
        fx.source.set_weathers(vec![WeatherCandidate {
            def_name: DefName::new("Fog"),
            label: "fog".to_string(),
            description: String::new(),
            favorability: Favorability::Bad,
            mod_source: "Core".to_string(),
        }]);
        fx.store
            .insert("Weather.json", r#"{"Fog": {"DefName": "Fog", "Cost": 300}}"#);
        let weather: WeatherCatalog =
            Catalog::new(fx.store.clone(), fx.source.clone(), fx.notifier.clone());

        assert!(matches!(weather.initialize(), InitOutcome::Loaded { .. }));
        let fog = weather.get("Fog").unwrap();
        assert_eq!(fog.base_cost, 300);
        assert_eq!(fog.favorability, Favorability::Bad);
        assert_eq!(fog.name, "fog");
    }

    #[test]
    fn test_custom_file_name() {
        let fx = Fixture::new(vec![meal()]);
        let catalog = fx.items().with_file_name("Items2.json");
        catalog.initialize();
        assert!(fx.store.contents("Items2.json").is_some());
        assert!(fx.store.contents(StoreItems::FILE_NAME).is_none());
    }
}
