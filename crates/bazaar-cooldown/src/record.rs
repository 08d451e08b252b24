//! Usage records

use bazaar_core::{CooldownWindow, Day};
use serde::{Deserialize, Serialize};

/// Days on which one key was used
///
/// Days are kept in the order they were recorded; a day appears once per
/// use. Pruning drops the days that fell out of the window, and an empty
/// record is simply inert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageRecord {
    pub key: String,
    #[serde(default)]
    pub usage_days: Vec<Day>,
}

impl UsageRecord {
    /// Create an unused record
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            usage_days: Vec::new(),
        }
    }

    /// Uses currently on record
    pub fn current_period_uses(&self) -> usize {
        self.usage_days.len()
    }

    /// Uses that still count on `current_day`, without pruning
    pub fn uses_within(&self, current_day: Day, window: CooldownWindow) -> usize {
        self.usage_days
            .iter()
            .filter(|&&day| window.contains(current_day, day))
            .count()
    }

    /// Note a use on `day`
    pub fn record(&mut self, day: Day) {
        self.usage_days.push(day);
    }

    /// Drop the days that expired by `current_day`; returns how many
    pub fn prune(&mut self, current_day: Day, window: CooldownWindow) -> usize {
        if window.is_unlimited() {
            return 0;
        }
        let before = self.usage_days.len();
        self.usage_days.retain(|&day| window.contains(current_day, day));
        before - self.usage_days.len()
    }
}
