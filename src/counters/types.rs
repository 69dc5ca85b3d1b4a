//! Catalogue of well-known counter kinds.

use serde::{Deserialize, Serialize};

use super::boost::BoostCounter;
use super::counter::Counter;

/// A named counter kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterType {
    // Player counters
    Poison,
    Energy,
    Experience,
    Rad,

    // Power/toughness modifiers
    P1P1,
    M1M1,
    P2P2,
    M2M2,
    P1P0,
    P0P1,
    M1M0,
    M0M1,

    // Keyword counters
    Flying,
    FirstStrike,
    Deathtouch,
    Lifelink,
    Trample,
    Vigilance,
    Hexproof,
    Indestructible,
    Menace,
    Reach,

    // Permanent counters
    Loyalty,
    Defense,
    Age,
    Charge,
    Divinity,
    Fade,
    Ice,
    Level,
    Lore,
    Oil,
    Quest,
    Shield,
    Storage,
    Stun,
    Time,
    Verse,
}

impl CounterType {
    /// Counter name as it is stored on objects.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CounterType::Poison => "poison",
            CounterType::Energy => "energy",
            CounterType::Experience => "experience",
            CounterType::Rad => "rad",
            CounterType::P1P1 => "+1/+1",
            CounterType::M1M1 => "-1/-1",
            CounterType::P2P2 => "+2/+2",
            CounterType::M2M2 => "-2/-2",
            CounterType::P1P0 => "+1/+0",
            CounterType::P0P1 => "+0/+1",
            CounterType::M1M0 => "-1/+0",
            CounterType::M0M1 => "+0/-1",
            CounterType::Flying => "flying",
            CounterType::FirstStrike => "first strike",
            CounterType::Deathtouch => "deathtouch",
            CounterType::Lifelink => "lifelink",
            CounterType::Trample => "trample",
            CounterType::Vigilance => "vigilance",
            CounterType::Hexproof => "hexproof",
            CounterType::Indestructible => "indestructible",
            CounterType::Menace => "menace",
            CounterType::Reach => "reach",
            CounterType::Loyalty => "loyalty",
            CounterType::Defense => "defense",
            CounterType::Age => "age",
            CounterType::Charge => "charge",
            CounterType::Divinity => "divinity",
            CounterType::Fade => "fade",
            CounterType::Ice => "ice",
            CounterType::Level => "level",
            CounterType::Lore => "lore",
            CounterType::Oil => "oil",
            CounterType::Quest => "quest",
            CounterType::Shield => "shield",
            CounterType::Storage => "storage",
            CounterType::Stun => "stun",
            CounterType::Time => "time",
            CounterType::Verse => "verse",
        }
    }

    /// The power/toughness modifier this kind encodes, if any.
    #[must_use]
    pub const fn boost(self) -> Option<(i32, i32)> {
        match self {
            CounterType::P1P1 => Some((1, 1)),
            CounterType::M1M1 => Some((-1, -1)),
            CounterType::P2P2 => Some((2, 2)),
            CounterType::M2M2 => Some((-2, -2)),
            CounterType::P1P0 => Some((1, 0)),
            CounterType::P0P1 => Some((0, 1)),
            CounterType::M1M0 => Some((-1, 0)),
            CounterType::M0M1 => Some((0, -1)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_boost(self) -> bool {
        self.boost().is_some()
    }

    /// Build a counter of this kind. A non-positive amount becomes 1.
    #[must_use]
    pub fn create_instance(self, amount: i64) -> Counter {
        match self.boost() {
            Some((power, toughness)) => BoostCounter::new(power, toughness, amount).to_counter(),
            None => Counter::new(self.name(), amount),
        }
    }
}

impl std::fmt::Display for CounterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
