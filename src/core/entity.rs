//! Entity identification.
//!
//! Every game object the rules core talks about (cards, permanents, stack
//! items, abilities) is named by an `EntityId`. The ids are opaque strings
//! handed out by the external game-state store; the core never allocates
//! them except for stack items it materializes itself.
//!
//! ## Usage
//!
//! ```
//! use ccg_rules::core::EntityId;
//!
//! let bolt = EntityId::new(" card-17 ");
//! assert_eq!(bolt.as_str(), "card-17");
//! assert_eq!(format!("{}", bolt), "card-17");
//! assert!(EntityId::none().is_empty());
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game object.
///
/// Surrounding whitespace is trimmed on construction, so ids coming from
/// the transport layer compare equal to ids minted internally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an entity ID.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// The empty id, used where an object reference is absent.
    #[must_use]
    pub const fn none() -> Self {
        Self(String::new())
    }

    /// Get the raw id.
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

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_trims() {
        assert_eq!(EntityId::new("  abc\t"), EntityId::from("abc"));
        assert_eq!(EntityId::from(String::from("x")).as_str(), "x");
    }

    #[test]
    fn test_entity_id_none() {
        assert!(EntityId::none().is_empty());
        assert!(EntityId::new("   ").is_empty());
        assert!(!EntityId::new("a").is_empty());
    }

    #[test]
    fn test_entity_id_serde() {
        let id = EntityId::new("perm-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"perm-1\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
