//! Player identification.
//!
//! Players are named by the session layer, so `PlayerId` wraps the
//! player's name rather than a seat index. Turn rotation and priority
//! order are kept by the components that need them.

use serde::{Deserialize, Serialize};

/// Player identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID, trimming surrounding whitespace.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// The empty id, meaning "no player".
    #[must_use]
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// Get the player's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this id is absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PlayerId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for PlayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id() {
        let alice = PlayerId::new(" Alice ");
        assert_eq!(alice.as_str(), "Alice");
        assert_eq!(format!("{}", alice), "Alice");
        assert_eq!(alice, PlayerId::from("Alice"));
    }

    #[test]
    fn test_player_id_empty() {
        assert!(PlayerId::none().is_empty());
        assert!(PlayerId::new("").is_empty());
    }
}
