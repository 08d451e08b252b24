//! Composed eligibility rules
//!
//! The ledger only knows records, windows and caps. These functions layer
//! the per-action policies on top, in a fixed short-circuit order. Every
//! `check_*` function returns the first cap that denies the action; the
//! `can_*` variants only say yes or no.
//!
//! Command eligibility:
//!
//! ```text
//! no settings entry          ─► allow (logged as an error)
//! per-command cap disabled   ─► allow
//! per-command cap > 0        ─► allow iff under the cap
//! per-command cap unlimited  ─► cooldowns disabled? allow
//!                               else global event cap, then karma cap
//! ```

use crate::ledger::{CooldownLedger, UsageFamily};
use crate::settings::CooldownSettings;
use bazaar_core::{Day, KarmaType};
use std::fmt;

/// The cap that stopped an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    CommandCap { command: String, max_uses: u32 },
    GlobalEventCap { cap: u32 },
    KarmaCap { karma: KarmaType, cap: u32 },
    IncidentCap { category: String, cap: u32 },
    PurchaseCap { item: String, cap: u32 },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::CommandCap { command, max_uses } => {
                write!(f, "{command} was already used {max_uses} times this period")
            }
            Denial::GlobalEventCap { cap } => write!(f, "the global limit of {cap} events was reached"),
            Denial::KarmaCap { karma, cap } => write!(f, "the limit of {cap} {karma} events was reached"),
            Denial::IncidentCap { category, cap } => {
                write!(f, "the limit of {cap} {category} incidents was reached")
            }
            Denial::PurchaseCap { item, cap } => write!(f, "{item} can only be bought {cap} times this period"),
        }
    }
}

/// Global and karma-typed event caps, when cooldowns are enabled
fn check_event_caps(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    karma: Option<KarmaType>,
    day: Day,
) -> Result<(), Denial> {
    if !settings.cooldowns_enabled {
        return Ok(());
    }
    let window = settings.event_window();
    if !ledger.can_use_global(UsageFamily::Events, day, window, settings.global_event_cap) {
        return Err(Denial::GlobalEventCap {
            cap: settings.global_event_cap,
        });
    }
    if let (true, Some(karma)) = (settings.karma_caps_enabled, karma) {
        let cap = settings.karma_cap(karma);
        if !ledger.can_use(UsageFamily::Events, karma.as_str(), day, window, cap) {
            return Err(Denial::KarmaCap { karma, cap });
        }
    }
    Ok(())
}

/// Whether a chat command may run on `day`
pub fn check_command(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    command: &str,
    day: Day,
) -> Result<(), Denial> {
    let Some(limits) = settings.commands.get(command) else {
        tracing::error!(command, "no cooldown settings for command, allowing");
        return Ok(());
    };
    if !limits.cap_enabled {
        return Ok(());
    }
    if limits.max_uses > 0 {
        return if ledger.can_use(UsageFamily::Commands, command, day, limits.window(), limits.max_uses) {
            Ok(())
        } else {
            Err(Denial::CommandCap {
                command: command.to_string(),
                max_uses: limits.max_uses,
            })
        };
    }
    check_event_caps(ledger, settings, limits.karma_type, day)
}

pub fn can_execute_command(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    command: &str,
    day: Day,
) -> bool {
    match check_command(ledger, settings, command, day) {
        Ok(()) => true,
        Err(denial) => {
            tracing::debug!(command, "denied: {denial}");
            false
        }
    }
}

/// Record a command run, plus the karma event it triggers
pub fn record_command(ledger: &CooldownLedger, settings: &CooldownSettings, command: &str, day: Day) {
    ledger.record_use(UsageFamily::Commands, command, day);
    if let Some(karma) = settings.commands.get(command).and_then(|c| c.karma_type) {
        ledger.record_use(UsageFamily::Events, karma.as_str(), day);
    }
}

/// Whether an incident of `category` may fire on `day`
///
/// Category caps apply only while cooldowns are enabled, like the event caps.
pub fn check_incident(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    category: &str,
    karma: Option<KarmaType>,
    day: Day,
) -> Result<(), Denial> {
    if !settings.cooldowns_enabled {
        return Ok(());
    }
    let cap = settings.incident_cap(category);
    if !ledger.can_use(UsageFamily::Incidents, category, day, settings.incident_window(), cap) {
        return Err(Denial::IncidentCap {
            category: category.to_string(),
            cap,
        });
    }
    check_event_caps(ledger, settings, karma, day)
}

pub fn can_fire_incident(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    category: &str,
    karma: Option<KarmaType>,
    day: Day,
) -> bool {
    check_incident(ledger, settings, category, karma, day).is_ok()
}

/// Record an incident, plus its karma event
pub fn record_incident(ledger: &CooldownLedger, category: &str, karma: Option<KarmaType>, day: Day) {
    ledger.record_use(UsageFamily::Incidents, category, day);
    if let Some(karma) = karma {
        ledger.record_use(UsageFamily::Events, karma.as_str(), day);
    }
}

/// Whether `item` may be bought on `day`
pub fn check_purchase(
    ledger: &CooldownLedger,
    settings: &CooldownSettings,
    item: &str,
    day: Day,
) -> Result<(), Denial> {
    let cap = settings.purchase_cap(item);
    if ledger.can_use(UsageFamily::Purchases, item, day, settings.purchase_window(), cap) {
        Ok(())
    } else {
        Err(Denial::PurchaseCap {
            item: item.to_string(),
            cap,
        })
    }
}

pub fn can_purchase(ledger: &CooldownLedger, settings: &CooldownSettings, item: &str, day: Day) -> bool {
    check_purchase(ledger, settings, item, day).is_ok()
}

pub fn record_purchase(ledger: &CooldownLedger, item: &str, day: Day) {
    ledger.record_use(UsageFamily::Purchases, item, day);
}

/// Daily prune with the windows from `settings`
pub fn prune(ledger: &CooldownLedger, settings: &CooldownSettings, day: Day) -> bool {
    ledger.prune_all(day, |family, key| settings.window_for(family, key))
}
