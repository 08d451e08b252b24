//! Source candidates supplied by the host
//!
//! The host's definition database is external and churns between runs
//! (mods added or removed). It is consumed through [`SourceEnumerator`],
//! which hands out plain candidate descriptors. Catalogs never hold on to
//! host objects, only to what these descriptors expose.

use crate::identity::DefName;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use thiserror::Error;

/// Failure reported by a source enumerator
#[derive(Debug, Clone, Error)]
#[error("source enumeration failed: {0}")]
pub struct SourceError(pub String);

/// Broad classification of a character race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceClass {
    Humanlike,
    Animal,
    Mechanoid,
    Insectoid,
}

/// Race information for candidates that are characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceInfo {
    /// Name of the race definition
    pub def_name: DefName,
    /// Classification of the race
    pub class: RaceClass,
    /// Whether a player may control members of this race
    pub playable: bool,
}

/// A tradeable thing (item, animal, ...) from the host's definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingCandidate {
    pub def_name: DefName,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Host classification groups, most specific first
    #[serde(default)]
    pub categories: Vec<String>,
    pub market_value: f64,
    #[serde(default = "default_true")]
    pub tradeable: bool,
    /// Path of the visual representation, if any
    #[serde(default)]
    pub graphic: Option<String>,
    #[serde(default)]
    pub race: Option<RaceInfo>,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub wearable: bool,
    #[serde(default)]
    pub equippable: bool,
    #[serde(default = "default_stack_limit")]
    pub stack_limit: u32,
    /// Originating content pack
    #[serde(default)]
    pub mod_source: String,
}

fn default_true() -> bool {
    true
}

fn default_stack_limit() -> u32 {
    1
}

impl ThingCandidate {
    /// Create a plain tradeable item candidate
    pub fn item(def_name: impl Into<DefName>, market_value: f64, category: &str) -> Self {
        let def_name = def_name.into();
        Self {
            label: def_name.as_str().to_lowercase(),
            def_name,
            description: String::new(),
            categories: vec![category.to_string()],
            market_value,
            tradeable: true,
            graphic: Some("Things/Item".to_string()),
            race: None,
            usable: false,
            wearable: false,
            equippable: false,
            stack_limit: 1,
            mod_source: "Core".to_string(),
        }
    }
}

/// One degree (intensity) of a trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDegree {
    #[serde(default)]
    pub degree: i32,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// A character trait from the host's definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitCandidate {
    pub def_name: DefName,
    pub degrees: Vec<TraitDegree>,
    #[serde(default = "default_true")]
    pub can_gain: bool,
    #[serde(default = "default_true")]
    pub can_lose: bool,
    #[serde(default)]
    pub mod_source: String,
}

impl TraitCandidate {
    /// Whether the trait has more than one degree (keys carry the degree)
    pub fn has_degrees(&self) -> bool {
        self.degrees.len() > 1
    }
}

/// How welcome a weather is for the colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Favorability {
    Good,
    #[default]
    Neutral,
    Bad,
    VeryBad,
}

/// A weather type from the host's definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCandidate {
    pub def_name: DefName,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub favorability: Favorability,
    #[serde(default)]
    pub mod_source: String,
}

/// Live list of candidate definitions, implemented by the host
pub trait SourceEnumerator: Send + Sync {
    /// Tradeable things
    fn things(&self) -> Result<Vec<ThingCandidate>, SourceError>;

    /// Character traits
    fn traits(&self) -> Result<Vec<TraitCandidate>, SourceError>;

    /// Weather types
    fn weathers(&self) -> Result<Vec<WeatherCandidate>, SourceError>;
}

/// Unwrap an enumeration result, logging faults and yielding an empty list
pub fn candidates_or_empty<T>(what: &str, result: Result<Vec<T>, SourceError>) -> Vec<T> {
    match result {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::error!(source = what, "{err}; continuing with no candidates");
            Vec::new()
        }
    }
}

/// In-memory enumerator over fixed candidate lists
///
/// Lists can be swapped at runtime to simulate definition churn, and the
/// whole source can be switched into a failing state.
#[derive(Debug, Default)]
pub struct StaticSource {
    things: RwLock<Vec<ThingCandidate>>,
    traits: RwLock<Vec<TraitCandidate>>,
    weathers: RwLock<Vec<WeatherCandidate>>,
    failing: AtomicBool,
}

impl StaticSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with the given things
    pub fn with_things(things: Vec<ThingCandidate>) -> Self {
        let source = Self::new();
        source.set_things(things);
        source
    }

    /// Replace the thing list
    pub fn set_things(&self, things: Vec<ThingCandidate>) {
        *self.things.write().unwrap_or_else(|e| e.into_inner()) = things;
    }

    /// Replace the trait list
    pub fn set_traits(&self, traits: Vec<TraitCandidate>) {
        *self.traits.write().unwrap_or_else(|e| e.into_inner()) = traits;
    }

    /// Replace the weather list
    pub fn set_weathers(&self, weathers: Vec<WeatherCandidate>) {
        *self.weathers.write().unwrap_or_else(|e| e.into_inner()) = weathers;
    }

    /// Add one thing
    pub fn push_thing(&self, thing: ThingCandidate) {
        self.things.write().unwrap_or_else(|e| e.into_inner()).push(thing);
    }

    /// Remove every thing with the given definition name
    pub fn remove_thing(&self, def_name: &str) {
        self.things
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|t| t.def_name.as_str() != def_name);
    }

    /// Make every enumeration fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SourceError("definition database unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SourceEnumerator for StaticSource {
    fn things(&self) -> Result<Vec<ThingCandidate>, SourceError> {
        self.check()?;
        Ok(self.things.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn traits(&self) -> Result<Vec<TraitCandidate>, SourceError> {
        self.check()?;
        Ok(self.traits.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn weathers(&self) -> Result<Vec<WeatherCandidate>, SourceError> {
        self.check()?;
        Ok(self.weathers.read().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
