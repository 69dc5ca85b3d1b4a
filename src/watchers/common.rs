//! Watchers most matches need.
//!
//! All four count per player and flip their condition once something they
//! track happens to a player they care about (see
//! [`WatcherBase::concerns`]).

use std::any::Any;

use rustc_hash::FxHashMap;

use crate::core::{EntityId, PlayerId, Zone};
use crate::events::{Event, EventType};

use super::watcher::{Watcher, WatcherBase, WatcherScope};

/// The player an event is about: `player`, falling back to `controller`.
fn acting_player(event: &Event) -> Option<&PlayerId> {
    [&event.player, &event.controller].into_iter().find(|p| !p.is_empty())
}

/// The object an event is about: `target`, falling back to `source`.
fn subject(event: &Event) -> Option<&EntityId> {
    [&event.target, &event.source].into_iter().find(|o| !o.is_empty())
}

/// Spells cast, per player.
#[derive(Clone, Debug)]
pub struct SpellsCastWatcher {
    base: WatcherBase,
    spells: FxHashMap<PlayerId, Vec<EntityId>>,
}

impl SpellsCastWatcher {
    pub fn new(scope: WatcherScope) -> Self {
        Self {
            base: WatcherBase::new(scope),
            spells: FxHashMap::default(),
        }
    }

    /// Watch spells cast by one player.
    pub fn for_player(player: impl Into<PlayerId>) -> Self {
        let mut watcher = Self::new(WatcherScope::Player);
        watcher.base.controller = player.into();
        watcher
    }

    #[must_use]
    pub fn spells_cast(&self, player: &PlayerId) -> &[EntityId] {
        self.spells.get(player).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn count(&self, player: &PlayerId) -> usize {
        self.spells_cast(player).len()
    }
}

impl Watcher for SpellsCastWatcher {
    fn base(&self) -> &WatcherBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WatcherBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "spells_cast"
    }

    fn watch(&mut self, event: &Event) {
        if event.event_type != EventType::SpellCast {
            return;
        }
        let (Some(player), Some(spell)) = (acting_player(event), subject(event)) else {
            return;
        };
        self.spells.entry(player.clone()).or_default().push(spell.clone());
        if self.base.concerns(player) {
            self.base.condition = true;
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.spells.clear();
    }

    fn box_clone(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Creatures that died, per controller and per owner.
///
/// Counts `PERMANENT_DIES`, and `ZONE_CHANGE` events into the graveyard
/// whose `from_zone` metadata is the battlefield.
#[derive(Clone, Debug)]
pub struct CreaturesDiedWatcher {
    base: WatcherBase,
    by_controller: FxHashMap<PlayerId, u32>,
    by_owner: FxHashMap<PlayerId, u32>,
}

impl CreaturesDiedWatcher {
    pub fn new(scope: WatcherScope) -> Self {
        Self {
            base: WatcherBase::new(scope),
            by_controller: FxHashMap::default(),
            by_owner: FxHashMap::default(),
        }
    }

    fn is_death(event: &Event) -> bool {
        match event.event_type {
            EventType::PermanentDies => true,
            EventType::ZoneChange => {
                event.zone == Some(Zone::Graveyard)
                    && event.metadata("from_zone").and_then(Zone::parse) == Some(Zone::Battlefield)
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn amount_by_controller(&self, controller: &PlayerId) -> u32 {
        self.by_controller.get(controller).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn amount_by_owner(&self, owner: &PlayerId) -> u32 {
        self.by_owner.get(owner).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.by_controller.values().sum()
    }
}

impl Watcher for CreaturesDiedWatcher {
    fn base(&self) -> &WatcherBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WatcherBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "creatures_died"
    }

    fn watch(&mut self, event: &Event) {
        if !Self::is_death(event) {
            return;
        }
        let controller = event.controller.clone();
        let owner = event
            .metadata("owner_id")
            .map(PlayerId::new)
            .unwrap_or_else(|| controller.clone());

        if !controller.is_empty() {
            *self.by_controller.entry(controller.clone()).or_default() += 1;
        }
        if !owner.is_empty() {
            *self.by_owner.entry(owner).or_default() += 1;
        }
        if self.base.concerns(&controller) {
            self.base.condition = true;
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.by_controller.clear();
        self.by_owner.clear();
    }

    fn box_clone(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Cards drawn, per player.
#[derive(Clone, Debug)]
pub struct CardsDrawnWatcher {
    base: WatcherBase,
    drawn: FxHashMap<PlayerId, u32>,
}

impl CardsDrawnWatcher {
    pub fn new(scope: WatcherScope) -> Self {
        Self {
            base: WatcherBase::new(scope),
            drawn: FxHashMap::default(),
        }
    }

    pub fn for_player(player: impl Into<PlayerId>) -> Self {
        let mut watcher = Self::new(WatcherScope::Player);
        watcher.base.controller = player.into();
        watcher
    }

    #[must_use]
    pub fn count(&self, player: &PlayerId) -> u32 {
        self.drawn.get(player).copied().unwrap_or(0)
    }
}

impl Watcher for CardsDrawnWatcher {
    fn base(&self) -> &WatcherBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WatcherBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "cards_drawn"
    }

    fn watch(&mut self, event: &Event) {
        if event.event_type != EventType::DrewCard {
            return;
        }
        let Some(player) = acting_player(event) else {
            return;
        };
        *self.drawn.entry(player.clone()).or_default() += 1;
        if self.base.concerns(player) {
            self.base.condition = true;
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.drawn.clear();
    }

    fn box_clone(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Permanents that entered the battlefield, per controller.
#[derive(Clone, Debug)]
pub struct PermanentsEnteredWatcher {
    base: WatcherBase,
    entered: FxHashMap<PlayerId, Vec<EntityId>>,
}

impl PermanentsEnteredWatcher {
    pub fn new(scope: WatcherScope) -> Self {
        Self {
            base: WatcherBase::new(scope),
            entered: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn permanents_entered(&self, controller: &PlayerId) -> &[EntityId] {
        self.entered.get(controller).map_or(&[], Vec::as_slice)
    }
}

impl Watcher for PermanentsEnteredWatcher {
    fn base(&self) -> &WatcherBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WatcherBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "permanents_entered"
    }

    fn watch(&mut self, event: &Event) {
        if !matches!(
            event.event_type,
            EventType::EntersTheBattlefield | EventType::PermanentEntersBattlefield
        ) {
            return;
        }
        if event.controller.is_empty() {
            return;
        }
        let Some(permanent) = subject(event) else {
            return;
        };
        self.entered
            .entry(event.controller.clone())
            .or_default()
            .push(permanent.clone());
        if self.base.concerns(&event.controller) {
            self.base.condition = true;
        }
    }

    fn reset(&mut self) {
        self.base.reset();
        self.entered.clear();
    }

    fn box_clone(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
