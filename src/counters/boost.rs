//! Boost counters: counters whose name is a power/toughness modifier.
//!
//! ## Name Grammar
//!
//! `<signed>/<signed>` where each side is an optional `+` or `-` followed
//! by one or more ASCII digits. Names are written with an explicit sign on
//! both sides, zero as `+0`, so every pair has exactly one canonical name:
//!
//! ```
//! use ccg_rules::counters::BoostCounter;
//!
//! assert_eq!(BoostCounter::new(1, 1, 1).name(), "+1/+1");
//! assert_eq!(BoostCounter::new(0, -1, 1).name(), "+0/-1");
//! ```

use serde::{Deserialize, Serialize};

use super::counter::{normalize, Counter};

/// A power/toughness modifier with a count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoostCounter {
    pub power: i32,
    pub toughness: i32,
    pub count: u32,
}

impl BoostCounter {
    /// Create a boost counter. A non-positive count is normalized to 1.
    #[must_use]
    pub fn new(power: i32, toughness: i32, count: i64) -> Self {
        Self {
            power,
            toughness,
            count: normalize(count),
        }
    }

    /// Canonical counter name for this modifier.
    #[must_use]
    pub fn name(&self) -> String {
        boost_name(self.power, self.toughness)
    }

    /// The plain counter this boost is stored as.
    #[must_use]
    pub fn to_counter(&self) -> Counter {
        Counter {
            name: self.name(),
            count: self.count,
        }
    }
}

impl From<BoostCounter> for Counter {
    fn from(boost: BoostCounter) -> Self {
        boost.to_counter()
    }
}

/// Format a power/toughness pair as a counter name.
#[must_use]
pub fn boost_name(power: i32, toughness: i32) -> String {
    format!("{:+}/{:+}", power, toughness)
}

/// Parse a counter name as a power/toughness pair.
///
/// Returns `None` for anything outside the grammar.
#[must_use]
pub fn parse_boost_name(name: &str) -> Option<(i32, i32)> {
    let (power, toughness) = name.split_once('/')?;
    Some((parse_side(power)?, parse_side(toughness)?))
}

fn parse_side(side: &str) -> Option<i32> {
    let (negative, digits) = match side.as_bytes().first()? {
        b'+' => (false, &side[1..]),
        b'-' => (true, &side[1..]),
        _ => (false, side),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
