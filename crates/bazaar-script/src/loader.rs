//! RON definition loader

use crate::error::{Error, Result};
use crate::schema::thing::ThingDefs;
use crate::schema::trait_def::TraitDefs;
use crate::schema::weather::WeatherDefs;
use crate::schema::{ThingDef, TraitDef, WeatherDef};
use bazaar_core::{
    SourceEnumerator, SourceError, ThingCandidate, TraitCandidate, WeatherCandidate,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Content pack assumed for definitions that do not name one
const DEFAULT_PACK: &str = "Core";

/// Loaded host definitions, keyed by definition name
#[derive(Debug, Default)]
pub struct DefDatabase {
    /// Thing definitions
    pub things: BTreeMap<String, ThingDef>,
    /// Trait definitions
    pub traits: BTreeMap<String, TraitDef>,
    /// Weather definitions
    pub weathers: BTreeMap<String, WeatherDef>,
}

impl DefDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a thing definition
    pub fn get_thing(&self, def_name: &str) -> Option<&ThingDef> {
        self.things.get(def_name)
    }

    /// Get a trait definition
    pub fn get_trait(&self, def_name: &str) -> Option<&TraitDef> {
        self.traits.get(def_name)
    }

    /// Get a weather definition
    pub fn get_weather(&self, def_name: &str) -> Option<&WeatherDef> {
        self.weathers.get(def_name)
    }

    /// Total number of definitions
    pub fn len(&self) -> usize {
        self.things.len() + self.traits.len() + self.weathers.len()
    }

    /// Check whether nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceEnumerator for DefDatabase {
    fn things(&self) -> std::result::Result<Vec<ThingCandidate>, SourceError> {
        Ok(self
            .things
            .values()
            .map(|def| def.to_candidate(DEFAULT_PACK))
            .collect())
    }

    fn traits(&self) -> std::result::Result<Vec<TraitCandidate>, SourceError> {
        Ok(self
            .traits
            .values()
            .map(|def| def.to_candidate(DEFAULT_PACK))
            .collect())
    }

    fn weathers(&self) -> std::result::Result<Vec<WeatherCandidate>, SourceError> {
        Ok(self
            .weathers
            .values()
            .map(|def| def.to_candidate(DEFAULT_PACK))
            .collect())
    }
}

/// Loader for RON definition files
pub struct Loader {
    defs: DefDatabase,
    pack: Option<String>,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: DefDatabase::new(),
            pack: None,
        }
    }

    /// Attribute definitions without an explicit content pack to `pack`
    pub fn with_pack(mut self, pack: impl Into<String>) -> Self {
        self.pack = Some(pack.into());
        self
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if filename.contains("thing") || content.contains("things:") {
            self.load_things_str(&content)
        } else if filename.contains("trait") || content.contains("traits:") {
            self.load_traits_str(&content)
        } else if filename.contains("weather") || content.contains("weathers:") {
            self.load_weathers_str(&content)
        } else {
            Err(Error::InvalidSchema(format!(
                "{} holds no things, traits or weathers",
                path.display()
            )))
        }
    }

    /// Load thing definitions from a RON string
    pub fn load_things_str(&mut self, content: &str) -> Result<()> {
        let file: ThingDefs = ron::from_str(content)?;
        for mut def in file.things {
            self.stamp_pack(&mut def.mod_content_pack);
            insert_unique(&mut self.defs.things, def.def_name.to_string(), def)?;
        }
        Ok(())
    }

    /// Load trait definitions from a RON string
    pub fn load_traits_str(&mut self, content: &str) -> Result<()> {
        let file: TraitDefs = ron::from_str(content)?;
        for mut def in file.traits {
            if def.degrees.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "trait {} has no degrees",
                    def.def_name
                )));
            }
            self.stamp_pack(&mut def.mod_content_pack);
            insert_unique(&mut self.defs.traits, def.def_name.to_string(), def)?;
        }
        Ok(())
    }

    /// Load weather definitions from a RON string
    pub fn load_weathers_str(&mut self, content: &str) -> Result<()> {
        let file: WeatherDefs = ron::from_str(content)?;
        for mut def in file.weathers {
            self.stamp_pack(&mut def.mod_content_pack);
            insert_unique(&mut self.defs.weathers, def.def_name.to_string(), def)?;
        }
        Ok(())
    }

    fn stamp_pack(&self, pack: &mut Option<String>) {
        if pack.is_none() {
            pack.clone_from(&self.pack);
        }
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        tracing::debug!(dir = %path.display(), defs = self.defs.len(), "loaded definitions");
        Ok(())
    }

    /// Finish loading and return the definitions
    pub fn finish(self) -> DefDatabase {
        self.defs
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &DefDatabase {
        &self.defs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_unique<T>(map: &mut BTreeMap<String, T>, key: String, value: T) -> Result<()> {
    if map.contains_key(&key) {
        return Err(Error::DuplicateDefinition(key));
    }
    map.insert(key, value);
    Ok(())
}
