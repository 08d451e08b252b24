//! Bazaar Core - Shared types for the viewer economy
//!
//! This crate provides the vocabulary shared by the catalog store and the
//! cooldown ledger:
//! - Entry keys and definition names (`EntryKey`, `DefName`)
//! - Day-granular time and cooldown windows (`Day`, `CooldownWindow`)
//! - Karma types used to classify viewer actions
//! - Source candidates and the `SourceEnumerator` trait the host implements
//! - Passive user notifications (`Notifier`)
//!
//! Nothing in here touches the disk; persistence lives in `bazaar-db`.

mod error;
mod identity;
mod karma;
pub mod notify;
pub mod source;
pub mod time;

pub use error::{Error, Result};
pub use identity::{DefName, EntryKey};
pub use karma::KarmaType;
pub use notify::{LogNotifier, MemoryNotifier, Notice, Notifier, Severity};
pub use source::{
    candidates_or_empty, Favorability, RaceClass, RaceInfo, SourceEnumerator, SourceError,
    StaticSource, ThingCandidate, TraitCandidate, TraitDegree, WeatherCandidate,
};
pub use time::{day_of_tick, CooldownWindow, Day, Tick, TICKS_PER_DAY};
