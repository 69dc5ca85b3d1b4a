//! Boundary to the external game-state store.
//!
//! The rules core never owns cards or players. It asks a
//! [`GameStateAccessor`] what exists and where it is, and treats the
//! answers as authoritative for the duration of one check.
//!
//! [`TableState`] is a plain in-memory accessor for hosts that keep
//! their match state in a single process, and for tests.

use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use super::zone::Zone;

/// What the store knows about a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: EntityId,
    pub name: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub zone: Zone,
    /// Type line words, e.g. `["Creature", "Goblin"]`.
    pub card_types: Vec<String>,
}

impl CardInfo {
    /// Create a card controlled by its owner.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, owner: impl Into<PlayerId>, zone: Zone) -> Self {
        let owner = owner.into();
        Self {
            id: id.into(),
            name: name.into(),
            controller: owner.clone(),
            owner,
            zone,
            card_types: Vec::new(),
        }
    }

    /// Add a type line word (builder pattern).
    #[must_use]
    pub fn with_type(mut self, card_type: impl Into<String>) -> Self {
        self.card_types.push(card_type.into());
        self
    }

    /// Set the controller (builder pattern).
    #[must_use]
    pub fn with_controller(mut self, controller: impl Into<PlayerId>) -> Self {
        self.controller = controller.into();
        self
    }

    /// Case-insensitive type line check.
    #[must_use]
    pub fn has_type(&self, card_type: &str) -> bool {
        self.card_types.iter().any(|t| t.eq_ignore_ascii_case(card_type))
    }
}

/// What the store knows about a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub lost: bool,
    pub left: bool,
}

impl PlayerInfo {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            lost: false,
            left: false,
        }
    }

    /// A player who lost or left can no longer act or be targeted.
    #[must_use]
    pub fn in_match(&self) -> bool {
        !self.lost && !self.left
    }
}

/// Read access to the external match state.
pub trait GameStateAccessor: Send + Sync {
    fn find_card(&self, id: &EntityId) -> Option<CardInfo>;

    fn find_player(&self, id: &PlayerId) -> Option<PlayerInfo>;

    fn card_zone(&self, id: &EntityId) -> Option<Zone> {
        self.find_card(id).map(|card| card.zone)
    }

    fn is_card_in_zone(&self, id: &EntityId, zone: Zone) -> bool {
        self.card_zone(id) == Some(zone)
    }
}

/// In-memory game-state store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableState {
    cards: FxHashMap<EntityId, CardInfo>,
    players: FxHashMap<PlayerId, PlayerInfo>,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat players by name (builder pattern).
    #[must_use]
    pub fn with_players<I, P>(mut self, players: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlayerId>,
    {
        for player in players {
            self.add_player(PlayerInfo::new(player));
        }
        self
    }

    /// Add a card (builder pattern).
    #[must_use]
    pub fn with_card(mut self, card: CardInfo) -> Self {
        self.add_card(card);
        self
    }

    pub fn add_player(&mut self, player: PlayerInfo) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn add_card(&mut self, card: CardInfo) {
        self.cards.insert(card.id.clone(), card);
    }

    /// Move a card. Returns false if the card is unknown.
    pub fn move_card(&mut self, id: &EntityId, zone: Zone) -> bool {
        match self.cards.get_mut(id) {
            Some(card) => {
                card.zone = zone;
                true
            }
            None => false,
        }
    }

    pub fn set_lost(&mut self, id: &PlayerId, lost: bool) {
        if let Some(player) = self.players.get_mut(id) {
            player.lost = lost;
        }
    }

    pub fn set_left(&mut self, id: &PlayerId, left: bool) {
        if let Some(player) = self.players.get_mut(id) {
            player.left = left;
        }
    }
}

impl GameStateAccessor for TableState {
    fn find_card(&self, id: &EntityId) -> Option<CardInfo> {
        self.cards.get(id).cloned()
    }

    fn find_player(&self, id: &PlayerId) -> Option<PlayerInfo> {
        self.players.get(id).cloned()
    }
}

/// A shared, mutable store reads through its lock.
impl<T: GameStateAccessor> GameStateAccessor for RwLock<T> {
    fn find_card(&self, id: &EntityId) -> Option<CardInfo> {
        self.read().unwrap_or_else(PoisonError::into_inner).find_card(id)
    }

    fn find_player(&self, id: &PlayerId) -> Option<PlayerInfo> {
        self.read().unwrap_or_else(PoisonError::into_inner).find_player(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_state_lookup() {
        let state = TableState::new()
            .with_players(["Alice", "Bob"])
            .with_card(CardInfo::new("bears", "Grizzly Bears", "Alice", Zone::Battlefield).with_type("Creature"));

        let bears = state.find_card(&EntityId::new("bears")).unwrap();
        assert!(bears.has_type("creature"));
        assert_eq!(bears.controller, PlayerId::new("Alice"));
        assert!(state.is_card_in_zone(&EntityId::new("bears"), Zone::Battlefield));
        assert!(!state.is_card_in_zone(&EntityId::new("bears"), Zone::Graveyard));
        assert_eq!(state.card_zone(&EntityId::new("missing")), None);
    }

    #[test]
    fn test_player_flags() {
        let mut state = TableState::new().with_players(["Alice"]);
        let alice = PlayerId::new("Alice");
        assert!(state.find_player(&alice).unwrap().in_match());

        state.set_left(&alice, true);
        assert!(!state.find_player(&alice).unwrap().in_match());
    }

    #[test]
    fn test_move_card() {
        let mut state = TableState::new()
            .with_card(CardInfo::new("bolt", "Lightning Bolt", "Alice", Zone::Hand));
        assert!(state.move_card(&EntityId::new("bolt"), Zone::Stack));
        assert_eq!(state.card_zone(&EntityId::new("bolt")), Some(Zone::Stack));
        assert!(!state.move_card(&EntityId::new("ghost"), Zone::Stack));
    }

    #[test]
    fn test_locked_state_reads_through() {
        let state = RwLock::new(TableState::new().with_players(["Alice"]));
        let alice = PlayerId::new("Alice");
        assert!(state.find_player(&alice).unwrap().in_match());

        state.write().unwrap().set_lost(&alice, true);
        assert!(!state.find_player(&alice).unwrap().in_match());
    }
}
