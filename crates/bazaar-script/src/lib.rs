//! Bazaar Script - RON definition loader
//!
//! Loads the host's definitions from RON files and exposes them as source
//! candidates:
//! - Thing definitions (items, animals, ...)
//! - Trait definitions with their degrees
//! - Weather definitions
//!
//! [`DefDatabase`] implements [`bazaar_core::SourceEnumerator`].

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{DefDatabase, Loader};
pub use schema::thing::{RaceProps, ThingDefs, Tradeability};
pub use schema::trait_def::TraitDefs;
pub use schema::weather::WeatherDefs;
pub use schema::{ThingDef, TraitDef, WeatherDef};
