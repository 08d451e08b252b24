//! Cooldown settings
//!
//! Windows and caps for every rate-limited action, persisted as
//! `CommandSettings.json`. All fields have defaults, so settings written by
//! an older version load with the newer fields filled in.

use crate::error::Result;
use crate::ledger::UsageFamily;
use bazaar_core::{CooldownWindow, KarmaType, Notifier};
use bazaar_db::recover::{quarantine, report_io_failure};
use bazaar_db::Persistence;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// File the settings are persisted as
pub const SETTINGS_FILE: &str = "CommandSettings.json";

/// Limits of one chat command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CommandSettings {
    /// Whether the command is rate limited at all
    pub cap_enabled: bool,
    /// Uses allowed per window; 0 defers to the global event caps
    pub max_uses: u32,
    /// Window length in days; 0 never expires
    pub window_days: u32,
    /// Karma of the event the command triggers, if any
    pub karma_type: Option<KarmaType>,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            cap_enabled: true,
            max_uses: 0,
            window_days: 5,
            karma_type: None,
        }
    }
}

impl CommandSettings {
    pub fn window(&self) -> CooldownWindow {
        CooldownWindow::days(self.window_days)
    }
}

/// Cooldown windows and caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CooldownSettings {
    /// Master switch for the global and karma event caps
    pub cooldowns_enabled: bool,
    pub event_window_days: u32,
    /// Events of any karma per window; 0 is unlimited
    pub global_event_cap: u32,
    pub karma_caps_enabled: bool,
    pub max_good_events: u32,
    pub max_neutral_events: u32,
    pub max_bad_events: u32,
    pub max_doom_events: u32,
    pub incident_window_days: u32,
    /// Per incident category; missing or 0 is unlimited
    pub incident_caps: IndexMap<String, u32>,
    pub purchase_window_days: u32,
    /// Purchases of an item per window unless overridden; 0 is unlimited
    pub default_purchase_cap: u32,
    pub purchase_caps: IndexMap<String, u32>,
    pub commands: IndexMap<String, CommandSettings>,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            cooldowns_enabled: true,
            event_window_days: 5,
            global_event_cap: 15,
            karma_caps_enabled: true,
            max_good_events: 10,
            max_neutral_events: 10,
            max_bad_events: 5,
            max_doom_events: 1,
            incident_window_days: 5,
            incident_caps: IndexMap::new(),
            purchase_window_days: 5,
            default_purchase_cap: 0,
            purchase_caps: IndexMap::new(),
            commands: IndexMap::new(),
        }
    }
}

impl CooldownSettings {
    pub fn event_window(&self) -> CooldownWindow {
        CooldownWindow::days(self.event_window_days)
    }

    pub fn incident_window(&self) -> CooldownWindow {
        CooldownWindow::days(self.incident_window_days)
    }

    pub fn purchase_window(&self) -> CooldownWindow {
        CooldownWindow::days(self.purchase_window_days)
    }

    /// Events of one karma allowed per window
    pub fn karma_cap(&self, karma: KarmaType) -> u32 {
        match karma {
            KarmaType::Good => self.max_good_events,
            KarmaType::Neutral => self.max_neutral_events,
            KarmaType::Bad => self.max_bad_events,
            KarmaType::Doom => self.max_doom_events,
        }
    }

    /// Cap of an incident category
    pub fn incident_cap(&self, category: &str) -> u32 {
        self.incident_caps.get(category).copied().unwrap_or(0)
    }

    /// Cap of purchases of one item
    pub fn purchase_cap(&self, item: &str) -> u32 {
        self.purchase_caps
            .get(item)
            .copied()
            .unwrap_or(self.default_purchase_cap)
    }

    /// Window a usage record is pruned with
    pub fn window_for(&self, family: UsageFamily, key: &str) -> CooldownWindow {
        match family {
            UsageFamily::Events => self.event_window(),
            UsageFamily::Incidents => self.incident_window(),
            UsageFamily::Purchases => self.purchase_window(),
            UsageFamily::Commands => self
                .commands
                .get(key)
                .map(CommandSettings::window)
                .unwrap_or_else(|| self.event_window()),
        }
    }

    /// Parse settings JSON
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Settings as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from the store, falling back to defaults
    ///
    /// Missing and corrupt files are replaced with the defaults (corrupt
    /// ones are backed up first). An unreadable file is left alone.
    pub fn load(store: &dyn Persistence, notifier: &dyn Notifier) -> Self {
        let raw = match store.load_file(SETTINGS_FILE) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!(file = SETTINGS_FILE, "no saved cooldown settings, using defaults");
                return Self::persist_defaults(store);
            }
            Err(err) => {
                report_io_failure(notifier, SETTINGS_FILE, "read", &err);
                return Self::default();
            }
        };

        let parsed = if raw.trim().is_empty() {
            Err("file is empty".to_string())
        } else {
            Self::from_json(&raw).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(settings) => settings,
            Err(reason) => {
                quarantine(store, notifier, SETTINGS_FILE, &raw, &reason);
                Self::persist_defaults(store)
            }
        }
    }

    fn persist_defaults(store: &dyn Persistence) -> Self {
        let settings = Self::default();
        if let Err(err) = settings.save(store) {
            tracing::error!(file = SETTINGS_FILE, "could not write default settings: {err}");
        }
        settings
    }

    /// Save settings synchronously
    pub fn save(&self, store: &dyn Persistence) -> Result<()> {
        store.save_file(SETTINGS_FILE, &self.to_json()?)?;
        Ok(())
    }
}
