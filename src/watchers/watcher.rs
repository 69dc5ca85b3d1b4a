//! The watcher contract and its shared bookkeeping.
//!
//! ## Design
//!
//! Every watcher embeds a [`WatcherBase`] holding its scope, key, owner and
//! condition flag. The [`Watcher`] trait provides default methods over that
//! base, so a variant only writes `watch`, `kind` and (if it tracks more
//! than the flag) `reset`.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::events::Event;

/// How far a watcher's question reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WatcherScope {
    /// Questions about the whole match ("did any creature die this turn?").
    Game,
    /// Questions about one player ("did you cast a spell this turn?").
    Player,
    /// Questions about one object ("did this attack this turn?").
    Object,
}

impl std::fmt::Display for WatcherScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WatcherScope::Game => "GAME",
            WatcherScope::Player => "PLAYER",
            WatcherScope::Object => "OBJECT",
        })
    }
}

/// State shared by every watcher variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherBase {
    pub scope: WatcherScope,
    pub key: String,
    pub controller: PlayerId,
    pub source: EntityId,
    pub condition: bool,
}

impl WatcherBase {
    pub fn new(scope: WatcherScope) -> Self {
        Self {
            scope,
            key: String::new(),
            controller: PlayerId::none(),
            source: EntityId::none(),
            condition: false,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: impl Into<PlayerId>) -> Self {
        self.controller = controller.into();
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<EntityId>) -> Self {
        self.source = source.into();
        self
    }

    pub fn reset(&mut self) {
        self.condition = false;
    }

    /// Whether an event about `player` is relevant to this watcher's owner.
    ///
    /// Game and object scoped watchers care about every player; a player
    /// scoped watcher only about its controller.
    #[must_use]
    pub fn concerns(&self, player: &PlayerId) -> bool {
        self.scope != WatcherScope::Player || self.controller.is_empty() || &self.controller == player
    }
}

/// A stateful observer of the event stream.
///
/// Watchers answer "has X happened since the last reset". They see every
/// published event and filter by type themselves.
pub trait Watcher: Any + Send + Sync + std::fmt::Debug {
    fn base(&self) -> &WatcherBase;

    fn base_mut(&mut self) -> &mut WatcherBase;

    /// Stable name of this watcher variant, used to derive keys.
    fn kind(&self) -> &'static str;

    fn watch(&mut self, event: &Event);

    /// Clear the condition flag and all tracked counts.
    fn reset(&mut self) {
        self.base_mut().reset();
    }

    fn condition_met(&self) -> bool {
        self.base().condition
    }

    fn scope(&self) -> WatcherScope {
        self.base().scope
    }

    fn key(&self) -> &str {
        &self.base().key
    }

    /// Structurally independent copy.
    fn box_clone(&self) -> Box<dyn Watcher>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Watcher> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_builder() {
        let base = WatcherBase::new(WatcherScope::Player)
            .with_key("k")
            .with_controller("alice")
            .with_source("card-1");
        assert_eq!(base.key, "k");
        assert_eq!(base.controller, PlayerId::new("alice"));
        assert!(!base.condition);
    }

    #[test]
    fn test_concerns() {
        let game = WatcherBase::new(WatcherScope::Game);
        assert!(game.concerns(&PlayerId::new("bob")));

        let mine = WatcherBase::new(WatcherScope::Player).with_controller("alice");
        assert!(mine.concerns(&PlayerId::new("alice")));
        assert!(!mine.concerns(&PlayerId::new("bob")));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(WatcherScope::Object.to_string(), "OBJECT");
    }
}
