//! Bazaar Cooldown - Day-windowed usage ledger
//!
//! Answers "is this action allowed right now?" for commands, incident
//! categories, karma-typed events and purchases. Every action kind keeps a
//! usage record per key: the list of in-game days it was used on. A use
//! counts against a cap while it is inside the rolling window.
//!
//! - [`UsageRecord`] - one key's usage days
//! - [`CooldownLedger`] - all records, grouped by [`UsageFamily`]
//! - [`CooldownSettings`] - windows and caps, persisted as `CommandSettings.json`
//! - [`gate`] - the composed eligibility rules built on the ledger primitives

mod error;
pub mod gate;
mod ledger;
mod record;
mod settings;

pub use error::{Error, Result};
pub use gate::Denial;
pub use ledger::{CooldownLedger, LedgerData, UsageFamily, LEDGER_FILE};
pub use record::UsageRecord;
pub use settings::{CommandSettings, CooldownSettings, SETTINGS_FILE};
