//! Schemas for host definition files

pub mod thing;
pub mod trait_def;
pub mod weather;

pub use thing::ThingDef;
pub use trait_def::TraitDef;
pub use weather::WeatherDef;
