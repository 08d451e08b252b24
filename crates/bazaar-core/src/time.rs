//! Day-granular time for cooldown bookkeeping
//!
//! The host simulation counts ticks; every rate limit in bazaar is expressed
//! in whole in-game days:
//! - `Tick` - Host logical time unit
//! - `Day` - Day number derived from a tick
//! - `CooldownWindow` - Rolling window length in days (0 = unlimited)

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete host tick
pub type Tick = u64;

/// An in-game day number
pub type Day = i64;

/// Host ticks per in-game day
pub const TICKS_PER_DAY: u64 = 60_000;

/// Convert a host tick to its day number
pub fn day_of_tick(tick: Tick) -> Day {
    (tick / TICKS_PER_DAY) as Day
}

/// Length of a rolling cooldown window in days
///
/// A use on day `d` still counts on day `c` while `c - d < window`; on the
/// day `c - d == window` it has expired. A window of zero never expires and
/// means "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CooldownWindow(pub u32);

impl CooldownWindow {
    /// The unlimited window
    pub const UNLIMITED: CooldownWindow = CooldownWindow(0);

    /// Create a window of `days` days
    pub fn days(days: u32) -> Self {
        Self(days)
    }

    /// Window length in days
    pub fn len(&self) -> u32 {
        self.0
    }

    /// Check for the unlimited sentinel
    pub fn is_unlimited(&self) -> bool {
        self.0 == 0
    }

    /// Whether a use on `day` still counts on `current_day`
    pub fn contains(&self, current_day: Day, day: Day) -> bool {
        self.is_unlimited() || current_day.saturating_sub(day) < Day::from(self.0)
    }

    /// Whether a use on `day` has expired by `current_day`
    pub fn is_expired(&self, current_day: Day, day: Day) -> bool {
        !self.contains(current_day, day)
    }
}

impl fmt::Display for CooldownWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{} days", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_tick() {
        assert_eq!(day_of_tick(0), 0);
        assert_eq!(day_of_tick(TICKS_PER_DAY - 1), 0);
        assert_eq!(day_of_tick(TICKS_PER_DAY), 1);
        assert_eq!(day_of_tick(TICKS_PER_DAY * 15 + 7), 15);
    }

    #[test]
    fn test_window_boundary() {
        let window = CooldownWindow::days(3);
        assert!(window.contains(10, 10));
        assert!(window.contains(12, 10));
        // Exactly `window` days later the use has expired
        assert!(window.is_expired(13, 10));
        assert!(window.is_expired(20, 10));
    }

    #[test]
    fn test_extreme_days_do_not_overflow() {
        let window = CooldownWindow::days(3);
        assert!(window.is_expired(5, Day::MIN));
        assert!(window.is_expired(Day::MAX, Day::MIN));
        assert!(window.contains(Day::MIN, Day::MAX));
        assert!(window.contains(5, Day::MAX));
    }

    #[test]
    fn test_unlimited_window_never_expires() {
        let window = CooldownWindow::UNLIMITED;
        assert!(window.is_unlimited());
        assert!(window.contains(1_000, 0));
        assert_eq!(window.to_string(), "unlimited");
        assert_eq!(CooldownWindow::days(5).to_string(), "5 days");
    }
}
