//! The cooldown ledger

use crate::error::Result;
use crate::record::UsageRecord;
use bazaar_core::{CooldownWindow, Day, Notifier};
use bazaar_db::recover::{quarantine, report_io_failure};
use bazaar_db::{Persistence, SaveQueue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// File the ledger is persisted as when it lives outside the host's save
pub const LEDGER_FILE: &str = "CooldownLedger.json";

/// Group of usage records that share a key space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageFamily {
    /// Karma-typed events, keyed by karma name
    Events,
    /// Incident categories
    Incidents,
    /// Chat commands
    Commands,
    /// Item purchases, keyed by item
    Purchases,
}

impl UsageFamily {
    /// Every family
    pub const ALL: [UsageFamily; 4] = [
        UsageFamily::Events,
        UsageFamily::Incidents,
        UsageFamily::Commands,
        UsageFamily::Purchases,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UsageFamily::Events => "events",
            UsageFamily::Incidents => "incidents",
            UsageFamily::Commands => "commands",
            UsageFamily::Purchases => "purchases",
        }
    }
}

impl fmt::Display for UsageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable ledger state
///
/// Families missing from an older save come back empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerData {
    #[serde(default)]
    pub events: IndexMap<String, UsageRecord>,
    #[serde(default)]
    pub incidents: IndexMap<String, UsageRecord>,
    #[serde(default)]
    pub commands: IndexMap<String, UsageRecord>,
    #[serde(default)]
    pub purchases: IndexMap<String, UsageRecord>,
    /// Day of the last full prune
    #[serde(default)]
    pub last_cleanup_day: Option<Day>,
}

impl LedgerData {
    /// Records of one family
    pub fn family(&self, family: UsageFamily) -> &IndexMap<String, UsageRecord> {
        match family {
            UsageFamily::Events => &self.events,
            UsageFamily::Incidents => &self.incidents,
            UsageFamily::Commands => &self.commands,
            UsageFamily::Purchases => &self.purchases,
        }
    }

    fn family_mut(&mut self, family: UsageFamily) -> &mut IndexMap<String, UsageRecord> {
        match family {
            UsageFamily::Events => &mut self.events,
            UsageFamily::Incidents => &mut self.incidents,
            UsageFamily::Commands => &mut self.commands,
            UsageFamily::Purchases => &mut self.purchases,
        }
    }

    fn record_mut(&mut self, family: UsageFamily, key: &str) -> &mut UsageRecord {
        self.family_mut(family)
            .entry(key.to_string())
            .or_insert_with(|| UsageRecord::new(key))
    }
}

/// Usage records for every rate-limited action
///
/// Record lookups that also prune take the data write lock; compound
/// operations (the daily prune, restore, save) additionally hold
/// `write_lock` so they cannot interleave.
#[derive(Debug, Default)]
pub struct CooldownLedger {
    data: RwLock<LedgerData>,
    write_lock: Mutex<()>,
}

impl CooldownLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger from saved state
    pub fn from_data(data: LedgerData) -> Self {
        Self {
            data: RwLock::new(data),
            write_lock: Mutex::new(()),
        }
    }

    /// Whether `key` may be used once more on `current_day`
    ///
    /// Creates the record if needed and prunes it first. A zero window or
    /// a zero cap means unlimited.
    pub fn can_use(
        &self,
        family: UsageFamily,
        key: &str,
        current_day: Day,
        window: CooldownWindow,
        max_uses: u32,
    ) -> bool {
        let mut data = self.write_data();
        let record = data.record_mut(family, key);
        if window.is_unlimited() || max_uses == 0 {
            return true;
        }
        record.prune(current_day, window);
        record.current_period_uses() < max_uses as usize
    }

    /// Note a use of `key` on `current_day`
    pub fn record_use(&self, family: UsageFamily, key: &str, current_day: Day) {
        self.write_data().record_mut(family, key).record(current_day);
        tracing::trace!(family = %family, key, day = current_day, "use recorded");
    }

    /// Whether the family as a whole is under `cap` uses in the window
    pub fn can_use_global(
        &self,
        family: UsageFamily,
        current_day: Day,
        window: CooldownWindow,
        cap: u32,
    ) -> bool {
        cap == 0 || self.uses_in_family(family, current_day, window) < cap as usize
    }

    /// Uses of one key that count on `current_day`
    pub fn uses(&self, family: UsageFamily, key: &str, current_day: Day, window: CooldownWindow) -> usize {
        self.read_data()
            .family(family)
            .get(key)
            .map(|r| r.uses_within(current_day, window))
            .unwrap_or(0)
    }

    /// Uses of every key in a family that count on `current_day`
    pub fn uses_in_family(&self, family: UsageFamily, current_day: Day, window: CooldownWindow) -> usize {
        self.read_data()
            .family(family)
            .values()
            .map(|r| r.uses_within(current_day, window))
            .sum()
    }

    /// Prune every record, at most once per day
    ///
    /// `window_for` gives the window of each record. Returns whether a
    /// prune pass ran.
    pub fn prune_all(
        &self,
        current_day: Day,
        window_for: impl Fn(UsageFamily, &str) -> CooldownWindow,
    ) -> bool {
        let _guard = self.lock_writer();
        let mut data = self.write_data();
        if data.last_cleanup_day == Some(current_day) {
            return false;
        }

        let mut removed = 0;
        for family in UsageFamily::ALL {
            for (key, record) in data.family_mut(family).iter_mut() {
                removed += record.prune(current_day, window_for(family, key.as_str()));
            }
        }
        data.last_cleanup_day = Some(current_day);
        tracing::debug!(day = current_day, removed, "pruned cooldown ledger");
        true
    }

    /// Day of the last prune pass
    pub fn last_cleanup_day(&self) -> Option<Day> {
        self.read_data().last_cleanup_day
    }

    /// Copy of the ledger state
    pub fn data(&self) -> LedgerData {
        self.read_data().clone()
    }

    /// Ledger state as JSON for embedding in the host's save
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&*self.read_data())?)
    }

    /// Replace the ledger with state from the host's save
    ///
    /// An empty blob gives a fresh ledger. An unparseable blob is logged
    /// and also gives a fresh ledger, so nothing is ever locked out;
    /// returns false in that case.
    pub fn restore_json(&self, raw: &str) -> bool {
        let _guard = self.lock_writer();
        let (data, ok) = Self::parse(raw);
        *self.write_data() = data;
        ok
    }

    fn parse(raw: &str) -> (LedgerData, bool) {
        if raw.trim().is_empty() {
            return (LedgerData::default(), true);
        }
        match serde_json::from_str(raw) {
            Ok(data) => (data, true),
            Err(err) => {
                tracing::error!(
                    preview = %bazaar_db::recover::preview(raw),
                    "cooldown ledger is corrupt, starting empty: {err}"
                );
                (LedgerData::default(), false)
            }
        }
    }

    /// Load the ledger from `name` in the store
    ///
    /// Corrupt files are backed up first. Every failure leaves a usable
    /// (possibly empty) ledger.
    pub fn load_from(&self, store: &dyn Persistence, notifier: &dyn Notifier, name: &str) -> bool {
        let _guard = self.lock_writer();
        let (data, ok) = match store.load_file(name) {
            Ok(None) => (LedgerData::default(), true),
            Ok(Some(raw)) => {
                let (data, ok) = Self::parse(&raw);
                if !ok {
                    quarantine(store, notifier, name, &raw, "cooldown ledger does not parse");
                }
                (data, ok)
            }
            Err(err) => {
                report_io_failure(notifier, name, "read", &err);
                (LedgerData::default(), false)
            }
        };
        *self.write_data() = data;
        ok
    }

    /// Save the ledger to `name` synchronously
    pub fn save_to(&self, store: &dyn Persistence, name: &str) -> Result<()> {
        let _guard = self.lock_writer();
        let content = self.snapshot_json()?;
        store.save_file(name, &content)?;
        Ok(())
    }

    /// Queue a save of the ledger to `name`
    pub fn save_queued(&self, queue: &SaveQueue, name: &str) {
        match self.snapshot_json() {
            Ok(content) => queue.enqueue(name, content),
            Err(err) => tracing::error!(file = name, "could not serialize cooldown ledger: {err}"),
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_data(&self) -> RwLockReadGuard<'_, LedgerData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, LedgerData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::MemoryNotifier;
    use bazaar_db::MemoryStore;

    const EVENTS: UsageFamily = UsageFamily::Events;

    #[test]
    fn test_window_boundary() {
        let ledger = CooldownLedger::new();
        let window = CooldownWindow::days(3);
        ledger.record_use(EVENTS, "Bad", 10);

        // Day 12 is inside the window, the use still counts
        assert!(!ledger.can_use(EVENTS, "Bad", 12, window, 1));
        assert_eq!(ledger.uses(EVENTS, "Bad", 12, window), 1);

        // Day 13 is exactly three days later, the use has expired
        assert!(ledger.can_use(EVENTS, "Bad", 13, window, 1));
        assert_eq!(ledger.data().events["Bad"].current_period_uses(), 0);
    }

    #[test]
    fn test_restored_extreme_day_expires() {
        let ledger = CooldownLedger::new();
        assert!(ledger.restore_json(
            r#"{"Events":{"Bad":{"Key":"Bad","UsageDays":[-9223372036854775808]}}}"#
        ));
        assert!(ledger.can_use(EVENTS, "Bad", 5, CooldownWindow::days(3), 1));
        assert_eq!(ledger.uses(EVENTS, "Bad", 5, CooldownWindow::days(3)), 0);
    }

    #[test]
    fn test_unlimited_sentinels() {
        let ledger = CooldownLedger::new();
        for day in 0..20 {
            ledger.record_use(EVENTS, "Good", 5);
            ledger.record_use(EVENTS, "Good", day);
        }
        assert!(ledger.can_use(EVENTS, "Good", 6, CooldownWindow::UNLIMITED, 1));
        assert!(ledger.can_use(EVENTS, "Good", 6, CooldownWindow::days(5), 0));
        assert!(ledger.can_use_global(EVENTS, 6, CooldownWindow::days(5), 0));
    }

    #[test]
    fn test_records_are_created_lazily() {
        let ledger = CooldownLedger::new();
        assert!(ledger.data().commands.is_empty());
        assert!(ledger.can_use(UsageFamily::Commands, "!buy", 1, CooldownWindow::days(2), 2));
        assert!(ledger.data().commands.contains_key("!buy"));
    }

    #[test]
    fn test_cap_counts_same_day_uses() {
        let ledger = CooldownLedger::new();
        let window = CooldownWindow::days(2);
        ledger.record_use(UsageFamily::Commands, "!raid", 4);
        assert!(ledger.can_use(UsageFamily::Commands, "!raid", 4, window, 2));
        ledger.record_use(UsageFamily::Commands, "!raid", 4);
        assert!(!ledger.can_use(UsageFamily::Commands, "!raid", 4, window, 2));
    }

    #[test]
    fn test_global_cap_sums_family() {
        let ledger = CooldownLedger::new();
        let window = CooldownWindow::days(5);
        ledger.record_use(EVENTS, "Good", 1);
        ledger.record_use(EVENTS, "Bad", 2);
        ledger.record_use(UsageFamily::Purchases, "Beer", 2);

        assert_eq!(ledger.uses_in_family(EVENTS, 3, window), 2);
        assert!(ledger.can_use_global(EVENTS, 3, window, 3));
        assert!(!ledger.can_use_global(EVENTS, 3, window, 2));
        // Day 6: the day-1 use expired
        assert!(ledger.can_use_global(EVENTS, 6, window, 2));
    }

    #[test]
    fn test_prune_all_runs_once_per_day() {
        let ledger = CooldownLedger::new();
        ledger.record_use(EVENTS, "Bad", 1);
        ledger.record_use(UsageFamily::Purchases, "Beer", 1);
        let windows = |family: UsageFamily, _: &str| match family {
            UsageFamily::Purchases => CooldownWindow::UNLIMITED,
            _ => CooldownWindow::days(2),
        };

        assert!(ledger.prune_all(5, windows));
        assert!(!ledger.prune_all(5, windows));
        assert_eq!(ledger.last_cleanup_day(), Some(5));

        let data = ledger.data();
        assert!(data.events["Bad"].usage_days.is_empty());
        assert_eq!(data.purchases["Beer"].usage_days, vec![1]);

        assert!(ledger.prune_all(6, windows));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let ledger = CooldownLedger::new();
        ledger.record_use(UsageFamily::Incidents, "Raid", 7);
        let json = ledger.snapshot_json().unwrap();

        let restored = CooldownLedger::new();
        assert!(restored.restore_json(&json));
        assert_eq!(restored.data(), ledger.data());
    }

    #[test]
    fn test_older_saves_fill_missing_families() {
        let ledger = CooldownLedger::new();
        assert!(ledger.restore_json(r#"{"Events": {"Bad": {"Key": "Bad", "UsageDays": [3, 4]}}}"#));
        let data = ledger.data();
        assert_eq!(data.events["Bad"].current_period_uses(), 2);
        assert!(data.purchases.is_empty());
        assert_eq!(data.last_cleanup_day, None);
    }

    #[test]
    fn test_corrupt_snapshot_is_permissive() {
        let ledger = CooldownLedger::new();
        ledger.record_use(EVENTS, "Bad", 1);
        assert!(!ledger.restore_json("{\"Events\": ["));
        assert!(ledger.data().events.is_empty());
        assert!(ledger.can_use(EVENTS, "Bad", 1, CooldownWindow::days(3), 1));
    }

    #[test]
    fn test_store_round_trip() {
        let store = MemoryStore::new();
        let notifier = MemoryNotifier::new();
        let ledger = CooldownLedger::new();
        ledger.record_use(UsageFamily::Purchases, "Beer", 9);
        ledger.save_to(&store, LEDGER_FILE).unwrap();

        let loaded = CooldownLedger::new();
        assert!(loaded.load_from(&store, &notifier, LEDGER_FILE));
        assert_eq!(loaded.data().purchases["Beer"].usage_days, vec![9]);

        store.insert(LEDGER_FILE, "not json");
        assert!(!loaded.load_from(&store, &notifier, LEDGER_FILE));
        assert!(loaded.data().purchases.is_empty());
        assert_eq!(store.backups().len(), 1);
        assert_eq!(notifier.notices().len(), 1);
    }
}
