//! Default prices
//!
//! Deterministic functions of a candidate's attributes. They only seed new
//! entries (and repair non-positive prices); user-edited prices are kept.

use crate::error::{Error, Result};
use bazaar_core::{Favorability, KarmaType};

/// Price of gaining a trait
pub const TRAIT_ADD_PRICE: i32 = 3500;
/// Price of losing a trait
pub const TRAIT_REMOVE_PRICE: i32 = 5500;

/// Item price: market value rounded up, at least 1
pub fn item_price(key: &str, market_value: f64) -> Result<i32> {
    if !market_value.is_finite() || market_value > i32::MAX as f64 {
        return Err(Error::Pricing {
            key: key.to_string(),
            value: market_value,
        });
    }
    Ok((market_value.ceil() as i32).max(1))
}

/// Add and remove price of a trait degree
///
/// Multi-degree traits scale with the degree's distance from zero.
pub fn trait_prices(degree: i32, has_degrees: bool) -> (i32, i32) {
    let scale = if has_degrees {
        degree.unsigned_abs().clamp(1, 10) as i32
    } else {
        1
    };
    (TRAIT_ADD_PRICE * scale, TRAIT_REMOVE_PRICE * scale)
}

/// Cost of summoning a weather
pub fn weather_cost(favorability: Favorability) -> i32 {
    match favorability {
        Favorability::Good => 800,
        Favorability::Neutral => 500,
        Favorability::Bad => 1200,
        Favorability::VeryBad => 2000,
    }
}

/// Karma of summoning a weather
pub fn weather_karma(favorability: Favorability) -> KarmaType {
    match favorability {
        Favorability::Good => KarmaType::Good,
        Favorability::Neutral => KarmaType::Neutral,
        Favorability::Bad => KarmaType::Bad,
        Favorability::VeryBad => KarmaType::Doom,
    }
}
