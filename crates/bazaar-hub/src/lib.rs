//! Bazaar Hub - The service object behind the viewer economy
//!
//! The hub owns one instance of everything bazaar keeps: the three
//! catalogs, the cooldown ledger with its settings, and the background
//! save worker. The host constructs it explicitly at startup and hands
//! references to whatever needs to authorize purchases or commands.
//!
//! ```text
//! Hub
//!  ├── Catalog<StoreItems>  ─┐
//!  ├── Catalog<Traits>       ├── Persistence ◄── SaveWorker (queued saves)
//!  ├── Catalog<Weathers>    ─┘
//!  ├── CooldownSettings (CommandSettings.json)
//!  └── CooldownLedger  ◄── on_tick(): daily prune
//! ```
//!
//! Nothing is global: tests and tools can run as many isolated hubs as
//! they like.

mod config;
mod error;
mod hub;

pub use config::HubConfig;
pub use error::{Error, Result};
pub use hub::{Hub, HubInit, PurchaseDecision};
