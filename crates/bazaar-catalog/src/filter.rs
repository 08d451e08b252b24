//! Filtering policy
//!
//! Decides which source candidates may become (or stay) catalog entries.
//! Each predicate is a pure function over the candidate's public fields;
//! the `screen_*` functions compose them in a fixed order and report the
//! first rule a candidate breaks.

use crate::category;
use crate::report::RemovalReason;
use crate::rules::CatalogRules;
use bazaar_core::{ThingCandidate, TraitCandidate, WeatherCandidate};
use std::fmt;

/// Why a candidate is not allowed in a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    UnplayableRace,
    DeniedRace,
    NoRenderIdentity,
    Vehicle,
    NoTradeValue,
    NotTradeable,
    NoRecognizedCategory,
    NoLabel,
    Denylisted,
}

impl Rejection {
    /// How a removal caused by this rejection is reported
    pub fn removal_reason(&self) -> RemovalReason {
        match self {
            Rejection::NoTradeValue | Rejection::NotTradeable => RemovalReason::NoLongerTradeable,
            _ => RemovalReason::FailedValidation,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::UnplayableRace => "unplayable race",
            Rejection::DeniedRace => "denied race",
            Rejection::NoRenderIdentity => "nothing to display",
            Rejection::Vehicle => "vehicle or vehicle part",
            Rejection::NoTradeValue => "no trade value",
            Rejection::NotTradeable => "not tradeable",
            Rejection::NoRecognizedCategory => "no recognized category",
            Rejection::NoLabel => "no label",
            Rejection::Denylisted => "denylisted",
        };
        f.write_str(text)
    }
}

fn eq_any(list: &[String], name: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}

/// A character race players cannot control
pub fn is_unplayable_race(candidate: &ThingCandidate) -> bool {
    candidate.race.as_ref().is_some_and(|race| !race.playable)
}

/// A race that is denylisted by name or keyword
pub fn is_denied_race(candidate: &ThingCandidate, rules: &CatalogRules) -> bool {
    let Some(race) = candidate.race.as_ref() else {
        return false;
    };
    let name = race.def_name.as_str();
    let lower = name.to_ascii_lowercase();
    eq_any(&rules.denied_races, name)
        || rules
            .denied_race_keywords
            .iter()
            .any(|keyword| lower.contains(&keyword.to_ascii_lowercase()))
}

/// No label, no graphic, or a known placeholder graphic
pub fn lacks_render_identity(candidate: &ThingCandidate, rules: &CatalogRules) -> bool {
    if candidate.label.trim().is_empty() {
        return true;
    }
    match candidate.graphic.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(path) => {
            let path = path.to_ascii_lowercase();
            rules
                .placeholder_graphics
                .iter()
                .any(|bad| path.contains(&bad.to_ascii_lowercase()))
        }
    }
}

/// Vehicles and vehicle parts, recognized by name
pub fn is_vehicle(candidate: &ThingCandidate, rules: &CatalogRules) -> bool {
    rules
        .vehicle_patterns
        .iter()
        .any(|pattern| pattern.matches(candidate.def_name.as_str()))
}

/// Zero, negative or non-numeric market value
pub fn lacks_trade_value(candidate: &ThingCandidate) -> bool {
    !(candidate.market_value > 0.0)
}

/// Explicitly excluded from trade
pub fn is_untradeable(candidate: &ThingCandidate) -> bool {
    !candidate.tradeable
}

/// Belongs to at least one group the store can classify
pub fn has_recognized_category(candidate: &ThingCandidate, rules: &CatalogRules) -> bool {
    category::classify(candidate, rules).is_some()
}

/// Apply the full policy to a thing
pub fn screen_thing(candidate: &ThingCandidate, rules: &CatalogRules) -> Result<(), Rejection> {
    if is_unplayable_race(candidate) {
        return Err(Rejection::UnplayableRace);
    }
    if is_denied_race(candidate, rules) {
        return Err(Rejection::DeniedRace);
    }
    if lacks_render_identity(candidate, rules) {
        return Err(Rejection::NoRenderIdentity);
    }
    if is_vehicle(candidate, rules) {
        return Err(Rejection::Vehicle);
    }
    if is_untradeable(candidate) {
        return Err(Rejection::NotTradeable);
    }
    if lacks_trade_value(candidate) {
        return Err(Rejection::NoTradeValue);
    }
    if !has_recognized_category(candidate, rules) {
        return Err(Rejection::NoRecognizedCategory);
    }
    Ok(())
}

/// Traits need at least one degree and must not be denylisted
pub fn screen_trait(candidate: &TraitCandidate, rules: &CatalogRules) -> Result<(), Rejection> {
    if candidate.degrees.iter().all(|d| d.label.trim().is_empty()) {
        return Err(Rejection::NoLabel);
    }
    if eq_any(&rules.denied_traits, candidate.def_name.as_str()) {
        return Err(Rejection::Denylisted);
    }
    Ok(())
}

/// Weather needs a label and must not be denylisted
pub fn screen_weather(candidate: &WeatherCandidate, rules: &CatalogRules) -> Result<(), Rejection> {
    if candidate.label.trim().is_empty() {
        return Err(Rejection::NoLabel);
    }
    if eq_any(&rules.denied_weathers, candidate.def_name.as_str()) {
        return Err(Rejection::Denylisted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{DefName, Favorability, RaceClass, RaceInfo, TraitDegree};

    fn rules() -> CatalogRules {
        CatalogRules::default()
    }

    fn race(name: &str, class: RaceClass, playable: bool) -> Option<RaceInfo> {
        Some(RaceInfo {
            def_name: DefName::new(name),
            class,
            playable,
        })
    }

    #[test]
    fn test_plain_item_passes() {
        let meal = ThingCandidate::item("MealSimple", 10.0, "Foods");
        assert_eq!(screen_thing(&meal, &rules()), Ok(()));
    }

    #[test]
    fn test_races() {
        let mut thing = ThingCandidate::item("Scyther", 1200.0, "Items");
        thing.race = race("Mech_Scyther", RaceClass::Mechanoid, false);
        assert!(is_unplayable_race(&thing));
        assert_eq!(screen_thing(&thing, &rules()), Err(Rejection::UnplayableRace));

        thing.race = race("Human", RaceClass::Humanlike, true);
        assert!(!is_unplayable_race(&thing));
        assert!(is_denied_race(&thing, &rules()));

        thing.race = race("Corpse_Muffalo", RaceClass::Animal, true);
        assert!(is_denied_race(&thing, &rules()));

        thing.race = race("Muffalo", RaceClass::Animal, true);
        assert!(!is_denied_race(&thing, &rules()));
        assert_eq!(screen_thing(&thing, &rules()), Ok(()));
    }

    #[test]
    fn test_render_identity() {
        let mut thing = ThingCandidate::item("Gizmo", 5.0, "Items");
        assert!(!lacks_render_identity(&thing, &rules()));

        thing.graphic = None;
        assert!(lacks_render_identity(&thing, &rules()));

        thing.graphic = Some("Things/Special/BadTex".to_string());
        assert!(lacks_render_identity(&thing, &rules()));

        thing.graphic = Some("Things/Item/Gizmo".to_string());
        thing.label = "  ".to_string();
        assert!(lacks_render_identity(&thing, &rules()));
    }

    #[test]
    fn test_vehicles() {
        let truck = ThingCandidate::item("VVE_Truck", 900.0, "Items");
        let turret = ThingCandidate::item("Tank_Turret", 300.0, "Items");
        let steel = ThingCandidate::item("Steel", 1.9, "ResourcesRaw");
        assert!(is_vehicle(&truck, &rules()));
        assert!(is_vehicle(&turret, &rules()));
        assert!(!is_vehicle(&steel, &rules()));
        assert_eq!(screen_thing(&truck, &rules()), Err(Rejection::Vehicle));
    }

    #[test]
    fn test_trade_value() {
        let mut thing = ThingCandidate::item("Rock", 0.0, "ResourcesRaw");
        assert!(lacks_trade_value(&thing));
        assert_eq!(screen_thing(&thing, &rules()), Err(Rejection::NoTradeValue));
        assert_eq!(
            Rejection::NoTradeValue.removal_reason(),
            RemovalReason::NoLongerTradeable
        );

        thing.market_value = f64::NAN;
        assert!(lacks_trade_value(&thing));

        thing.market_value = 3.0;
        thing.tradeable = false;
        assert_eq!(screen_thing(&thing, &rules()), Err(Rejection::NotTradeable));
    }

    #[test]
    fn test_category_required() {
        let thing = ThingCandidate::item("Chunk", 4.0, "Chunks");
        assert!(!has_recognized_category(&thing, &rules()));
        assert_eq!(
            screen_thing(&thing, &rules()),
            Err(Rejection::NoRecognizedCategory)
        );
        assert_eq!(
            Rejection::NoRecognizedCategory.removal_reason(),
            RemovalReason::FailedValidation
        );
    }

    #[test]
    fn test_trait_and_weather_screens() {
        let mut rules = rules();
        rules.denied_traits.push("Psychopath".to_string());

        let psychopath = TraitCandidate {
            def_name: DefName::new("Psychopath"),
            degrees: vec![TraitDegree {
                degree: 0,
                label: "psychopath".to_string(),
                description: String::new(),
            }],
            can_gain: true,
            can_lose: true,
            mod_source: String::new(),
        };
        assert_eq!(screen_trait(&psychopath, &rules), Err(Rejection::Denylisted));

        let fog = WeatherCandidate {
            def_name: DefName::new("Fog"),
            label: String::new(),
            description: String::new(),
            favorability: Favorability::Neutral,
            mod_source: String::new(),
        };
        assert_eq!(screen_weather(&fog, &rules), Err(Rejection::NoLabel));
    }
}
