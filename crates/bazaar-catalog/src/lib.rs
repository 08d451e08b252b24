//! Bazaar Catalog - Versioned, self-reconciling catalogs
//!
//! A catalog is a keyed collection of purchasable entries that is persisted
//! as one JSON file and kept in step with the host's live definitions:
//!
//! ```text
//! initialize()
//!  ├── load()  ── missing / corrupt / unreadable ──► create_defaults() ─► persist
//!  │     └── migrate each entry to the current schema
//!  └── reconcile_with_source()  (add / correct / remove) ─► persist if changed
//! ```
//!
//! Three kinds share the machinery: [`StoreItems`], [`Traits`] and
//! [`Weathers`]. Prices, enable flags and custom names set by the user
//! survive reconciliation; fields derived from the host are refreshed.

mod catalog;
pub mod category;
mod error;
pub mod filter;
mod item;
mod kind;
pub mod migration;
pub mod pricing;
mod report;
mod rules;
mod trait_item;
mod weather;

pub use catalog::Catalog;
pub use category::{CategoryRule, ItemCategory};
pub use error::{Error, Result};
pub use filter::Rejection;
pub use item::{LimitMode, StoreItem, StoreItems};
pub use kind::{CatalogEntry, CatalogKind};
pub use report::{DefaultsCause, InitOutcome, LoadOutcome, ReconcileReport, RemovalReason};
pub use rules::{CatalogRules, NamePattern};
pub use trait_item::{BuyableTrait, Traits};
pub use weather::{BuyableWeather, Weathers};

/// Catalog of store items
pub type ItemCatalog = Catalog<StoreItems>;
/// Catalog of buyable traits
pub type TraitCatalog = Catalog<Traits>;
/// Catalog of buyable weather
pub type WeatherCatalog = Catalog<Weathers>;
