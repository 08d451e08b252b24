//! Hub - owner of the catalogs, ledger and save worker

use crate::config::HubConfig;
use crate::error::Result;
use bazaar_catalog::{
    BuyableTrait, BuyableWeather, Catalog, InitOutcome, ItemCatalog, ItemCategory, StoreItem,
    TraitCatalog, WeatherCatalog,
};
use bazaar_cooldown::gate::{self, Denial};
use bazaar_cooldown::{CooldownLedger, CooldownSettings, SETTINGS_FILE};
use bazaar_core::{day_of_tick, Day, KarmaType, Notifier, SourceEnumerator, Tick};
use bazaar_db::{FileStore, Persistence, SaveQueue, SaveWorker};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

/// Outcome of initializing every catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubInit {
    pub items: InitOutcome,
    pub traits: InitOutcome,
    pub weather: InitOutcome,
}

/// Answer to "may this viewer buy this item now?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseDecision {
    /// The purchase may go ahead at `price`
    Allowed { price: i64 },
    UnknownItem,
    Disabled,
    /// More units than one purchase may take (or none at all)
    OverLimit { max: u32 },
    /// A purchase cap was reached
    Cooldown(Denial),
}

impl PurchaseDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PurchaseDecision::Allowed { .. })
    }
}

impl fmt::Display for PurchaseDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseDecision::Allowed { price } => write!(f, "allowed for {price}"),
            PurchaseDecision::UnknownItem => write!(f, "no such item"),
            PurchaseDecision::Disabled => write!(f, "item is not for sale"),
            PurchaseDecision::OverLimit { max } => write!(f, "at most {max} per purchase"),
            PurchaseDecision::Cooldown(denial) => write!(f, "{denial}"),
        }
    }
}

/// Service object owning all of bazaar's state
///
/// One per host process, created at startup. Queries take `&self`, so the
/// hub can be shared behind an `Arc`.
pub struct Hub {
    config: HubConfig,
    store: Arc<dyn Persistence>,
    notifier: Arc<dyn Notifier>,
    items: ItemCatalog,
    traits: TraitCatalog,
    weather: WeatherCatalog,
    settings: RwLock<CooldownSettings>,
    ledger: CooldownLedger,
    /// Set once settings and ledger are loaded
    loaded: AtomicBool,
    load_lock: Mutex<()>,
    queue: SaveQueue,
    worker: SaveWorker,
}

impl Hub {
    /// Build a hub over the given collaborators
    ///
    /// Nothing is loaded until [`Hub::initialize`].
    pub fn open(
        config: HubConfig,
        store: Arc<dyn Persistence>,
        source: Arc<dyn SourceEnumerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let worker = SaveWorker::spawn(Arc::clone(&store), config.save_queue_capacity)?;
        let queue = worker.queue();
        let rules = Arc::new(config.rules.clone());

        let items: ItemCatalog =
            Catalog::new(Arc::clone(&store), Arc::clone(&source), Arc::clone(&notifier))
                .with_rules(Arc::clone(&rules))
                .with_queue(queue.clone())
                .with_file_name(config.items_file.clone());
        let traits: TraitCatalog =
            Catalog::new(Arc::clone(&store), Arc::clone(&source), Arc::clone(&notifier))
                .with_rules(Arc::clone(&rules))
                .with_queue(queue.clone())
                .with_file_name(config.traits_file.clone());
        let weather: WeatherCatalog = Catalog::new(Arc::clone(&store), source, Arc::clone(&notifier))
            .with_rules(rules)
            .with_queue(queue.clone())
            .with_file_name(config.weather_file.clone());

        Ok(Self {
            config,
            store,
            notifier,
            items,
            traits,
            weather,
            settings: RwLock::new(CooldownSettings::default()),
            ledger: CooldownLedger::new(),
            loaded: AtomicBool::new(false),
            load_lock: Mutex::new(()),
            queue,
            worker,
        })
    }

    /// Build a hub over a file store in `config.data_dir`
    pub fn open_dir(
        config: HubConfig,
        source: Arc<dyn SourceEnumerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        tracing::info!(dir = %config.data_dir.display(), "opening bazaar data");
        Self::open(config, store, source, notifier)
    }

    /// Load or create every catalog, the settings and the ledger
    ///
    /// Safe to call repeatedly: only the first call loads anything, later
    /// calls leave in-memory state alone.
    pub fn initialize(&self) -> HubInit {
        let init = HubInit {
            items: self.items.initialize(),
            traits: self.traits.initialize(),
            weather: self.weather.initialize(),
        };
        if self.loaded.load(Ordering::Acquire) {
            return init;
        }
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.loaded.load(Ordering::Acquire) {
            return init;
        }
        *self.settings_mut() = CooldownSettings::load(self.store.as_ref(), self.notifier.as_ref());
        self.ledger
            .load_from(self.store.as_ref(), self.notifier.as_ref(), &self.config.ledger_file);
        self.loaded.store(true, Ordering::Release);
        tracing::info!(
            items = self.items.len(),
            traits = self.traits.len(),
            weather = self.weather.len(),
            "bazaar ready"
        );
        init
    }

    /// Advance to `tick`; prunes the ledger once per in-game day
    ///
    /// Returns whether a prune pass ran.
    pub fn on_tick(&self, tick: Tick) -> bool {
        let day = day_of_tick(tick);
        let pruned = gate::prune(&self.ledger, &self.settings(), day);
        if pruned {
            self.ledger.save_queued(&self.queue, &self.config.ledger_file);
        }
        pruned
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    pub fn traits(&self) -> &TraitCatalog {
        &self.traits
    }

    pub fn weathers(&self) -> &WeatherCatalog {
        &self.weather
    }

    pub fn ledger(&self) -> &CooldownLedger {
        &self.ledger
    }

    pub fn item(&self, key: &str) -> Option<StoreItem> {
        self.items.get(key)
    }

    pub fn trait_entry(&self, key: &str) -> Option<BuyableTrait> {
        self.traits.get(key)
    }

    pub fn weather(&self, key: &str) -> Option<BuyableWeather> {
        self.weather.get(key)
    }

    pub fn enabled_items(&self) -> Vec<StoreItem> {
        self.items.enabled()
    }

    pub fn items_in(&self, category: ItemCategory) -> Vec<StoreItem> {
        self.items.by_category(category.as_str())
    }

    /// Check a purchase of `quantity` units of `key` on `day`
    pub fn can_purchase(&self, key: &str, quantity: u32, day: Day) -> PurchaseDecision {
        let Some(item) = self.items.get(key) else {
            return PurchaseDecision::UnknownItem;
        };
        if !item.enabled {
            return PurchaseDecision::Disabled;
        }
        let max = item.resolved_quantity_limit();
        if quantity == 0 || quantity > max {
            return PurchaseDecision::OverLimit { max };
        }
        match gate::check_purchase(&self.ledger, &self.settings(), key, day) {
            Ok(()) => PurchaseDecision::Allowed {
                price: item.price_for(quantity),
            },
            Err(denial) => PurchaseDecision::Cooldown(denial),
        }
    }

    pub fn record_purchase(&self, key: &str, day: Day) {
        gate::record_purchase(&self.ledger, key, day);
    }

    pub fn can_execute_command(&self, command: &str, day: Day) -> bool {
        gate::can_execute_command(&self.ledger, &self.settings(), command, day)
    }

    pub fn record_command(&self, command: &str, day: Day) {
        gate::record_command(&self.ledger, &self.settings(), command, day);
    }

    pub fn can_fire_incident(&self, category: &str, karma: Option<KarmaType>, day: Day) -> bool {
        gate::can_fire_incident(&self.ledger, &self.settings(), category, karma, day)
    }

    pub fn record_incident(&self, category: &str, karma: Option<KarmaType>, day: Day) {
        gate::record_incident(&self.ledger, category, karma, day);
    }

    /// Reload every catalog from disk and reconcile it
    pub fn force_reload(&self) -> HubInit {
        HubInit {
            items: self.items.force_reload(),
            traits: self.traits.force_reload(),
            weather: self.weather.force_reload(),
        }
    }

    /// Throw away every catalog and rebuild it from the source
    ///
    /// Returns the number of entries created.
    pub fn rebuild(&self) -> usize {
        tracing::warn!("rebuilding all catalogs from scratch");
        self.items.rebuild() + self.traits.rebuild() + self.weather.rebuild()
    }

    /// Current cooldown settings
    pub fn settings(&self) -> RwLockReadGuard<'_, CooldownSettings> {
        self.settings.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Edit the cooldown settings and queue a save
    pub fn update_settings(&self, edit: impl FnOnce(&mut CooldownSettings)) {
        let json = {
            let mut settings = self.settings_mut();
            edit(&mut settings);
            settings.to_json()
        };
        match json {
            Ok(json) => self.queue.enqueue(SETTINGS_FILE, json),
            Err(err) => tracing::error!(file = SETTINGS_FILE, "could not serialize settings: {err}"),
        }
    }

    /// Ledger state for the host's save
    pub fn ledger_snapshot(&self) -> Result<String> {
        Ok(self.ledger.snapshot_json()?)
    }

    /// Restore ledger state from the host's save
    ///
    /// Returns false when the blob was corrupt and an empty ledger is used.
    pub fn restore_ledger(&self, raw: &str) -> bool {
        self.ledger.restore_json(raw)
    }

    /// Save the ledger, drain the save queue and stop the worker
    pub fn shutdown(self) -> Result<()> {
        if !self.queue.flush() {
            tracing::warn!("save worker was already stopped");
        }
        let saved = self.ledger.save_to(self.store.as_ref(), &self.config.ledger_file);
        self.worker.shutdown();
        tracing::info!("bazaar shut down");
        Ok(saved?)
    }

    fn settings_mut(&self) -> std::sync::RwLockWriteGuard<'_, CooldownSettings> {
        self.settings.write().unwrap_or_else(|e| e.into_inner())
    }
}
