//! Zone markers shared with the external game-state store.
//!
//! The numeric values are part of the boundary contract: the store
//! reports zones as small integers and the rules core must read them
//! the same way.

use serde::{Deserialize, Serialize};

/// A zone a card can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Zone {
    Library = 0,
    Hand = 1,
    Battlefield = 2,
    Graveyard = 3,
    Stack = 4,
    Exile = 5,
    Command = 6,
}

impl Zone {
    /// All zones in numeric order.
    pub const ALL: [Zone; 7] = [
        Zone::Library,
        Zone::Hand,
        Zone::Battlefield,
        Zone::Graveyard,
        Zone::Stack,
        Zone::Exile,
        Zone::Command,
    ];

    /// The numeric zone marker.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a numeric zone marker.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Zone::Library),
            1 => Some(Zone::Hand),
            2 => Some(Zone::Battlefield),
            3 => Some(Zone::Graveyard),
            4 => Some(Zone::Stack),
            5 => Some(Zone::Exile),
            6 => Some(Zone::Command),
            _ => None,
        }
    }

    /// Parse a zone name as it appears in item metadata (`"battlefield"`, `"2"`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Ok(raw) = name.parse::<u8>() {
            return Self::from_u8(raw);
        }
        Self::ALL
            .into_iter()
            .find(|zone| zone.name().eq_ignore_ascii_case(name))
    }

    /// Lowercase zone name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
            Zone::Exile => "exile",
            Zone::Command => "command",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
