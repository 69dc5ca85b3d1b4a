//! Special actions: things a player does without using the stack.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{EntityId, PlayerId};
use crate::error::{Result, RulesError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialActionType {
    PlayLand,
    TurnFaceUp,
    EndEffect,
    IgnoreStaticAbility,
    DiscardCirclingVultures,
    Suspend,
    Companion,
    Foretell,
    Plot,
    Unlock,
}

impl SpecialActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpecialActionType::PlayLand => "PLAY_LAND",
            SpecialActionType::TurnFaceUp => "TURN_FACE_UP",
            SpecialActionType::EndEffect => "END_EFFECT",
            SpecialActionType::IgnoreStaticAbility => "IGNORE_STATIC_ABILITY",
            SpecialActionType::DiscardCirclingVultures => "DISCARD_CIRCLING_VULTURES",
            SpecialActionType::Suspend => "SUSPEND",
            SpecialActionType::Companion => "COMPANION",
            SpecialActionType::Foretell => "FORETELL",
            SpecialActionType::Plot => "PLOT",
            SpecialActionType::Unlock => "UNLOCK",
        }
    }

    /// When this kind of action may be taken.
    #[must_use]
    pub const fn restrictions(self) -> SpecialActionRestriction {
        let priority_only = SpecialActionRestriction {
            requires_priority: true,
            requires_main_phase: false,
            requires_empty_stack: false,
            requires_own_turn: false,
            once_per_game: false,
        };
        match self {
            SpecialActionType::PlayLand | SpecialActionType::Unlock => SpecialActionRestriction {
                requires_main_phase: true,
                requires_empty_stack: true,
                ..priority_only
            },
            SpecialActionType::Companion => SpecialActionRestriction {
                requires_main_phase: true,
                requires_empty_stack: true,
                once_per_game: true,
                ..priority_only
            },
            SpecialActionType::Foretell => SpecialActionRestriction {
                requires_own_turn: true,
                ..priority_only
            },
            SpecialActionType::Plot => SpecialActionRestriction {
                requires_own_turn: true,
                requires_empty_stack: true,
                ..priority_only
            },
            _ => priority_only,
        }
    }
}

impl std::fmt::Display for SpecialActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing rules for one kind of special action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialActionRestriction {
    pub requires_priority: bool,
    pub requires_main_phase: bool,
    pub requires_empty_stack: bool,
    pub requires_own_turn: bool,
    pub once_per_game: bool,
}

/// The game situation a special action is attempted in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTiming {
    pub has_priority: bool,
    pub main_phase: bool,
    pub empty_stack: bool,
    pub own_turn: bool,
}

impl ActionTiming {
    /// Own main phase, empty stack, holding priority.
    #[must_use]
    pub const fn sorcery_speed() -> Self {
        Self {
            has_priority: true,
            main_phase: true,
            empty_stack: true,
            own_turn: true,
        }
    }
}

type ExecuteFn = Arc<dyn Fn() -> Result<()> + Send + Sync>;
type CheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// A special action a player wants to take.
#[derive(Clone)]
pub struct SpecialAction {
    pub action_type: SpecialActionType,
    pub player: PlayerId,
    pub source: EntityId,
    pub description: String,
    execute: Option<ExecuteFn>,
    can_take: Option<CheckFn>,
}

impl SpecialAction {
    pub fn new(action_type: SpecialActionType, player: impl Into<PlayerId>, source: impl Into<EntityId>) -> Self {
        Self {
            action_type,
            player: player.into(),
            source: source.into(),
            description: String::new(),
            execute: None,
            can_take: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// What the action does when taken.
    #[must_use]
    pub fn with_execute<F>(mut self, execute: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.execute = Some(Arc::new(execute));
        self
    }

    /// An extra legality check on top of the timing restrictions.
    #[must_use]
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.can_take = Some(Arc::new(check));
        self
    }
}

impl std::fmt::Debug for SpecialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialAction")
            .field("action_type", &self.action_type)
            .field("player", &self.player)
            .field("source", &self.source)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Enforces special action restrictions and counts what was taken.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpecialActionManager {
    taken_this_game: FxHashMap<PlayerId, FxHashSet<SpecialActionType>>,
    taken_this_turn: FxHashMap<PlayerId, FxHashMap<SpecialActionType, u32>>,
    during_resolve: bool,
}

impl SpecialActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every restriction that applies to `action`.
    pub fn check(&self, action: &SpecialAction, timing: ActionTiming) -> Result<()> {
        let rules = action.action_type.restrictions();
        let deny = |reason: &str| RulesError::SpecialActionNotAllowed {
            action: action.action_type.to_string(),
            reason: reason.to_string(),
        };

        if rules.requires_priority && !timing.has_priority {
            return Err(deny("player does not have priority"));
        }
        if rules.requires_main_phase && !timing.main_phase {
            return Err(deny("only during a main phase"));
        }
        if rules.requires_empty_stack && !timing.empty_stack {
            return Err(deny("the stack is not empty"));
        }
        if rules.requires_own_turn && !timing.own_turn {
            return Err(deny("only during its controller's turn"));
        }
        if rules.once_per_game && self.taken_this_game(&action.player, action.action_type) {
            return Err(deny("already taken this game"));
        }
        if let Some(check) = &action.can_take {
            if !check() {
                return Err(deny("the action's own check failed"));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn can_take_action(&self, action: &SpecialAction, timing: ActionTiming) -> bool {
        self.check(action, timing).is_ok()
    }

    /// Check, execute and record a special action.
    ///
    /// Nothing is recorded if the check or the action fails.
    pub fn take_action(&mut self, action: &SpecialAction, timing: ActionTiming) -> Result<()> {
        self.check(action, timing)?;
        if let Some(execute) = &action.execute {
            execute()?;
        }

        let kind = action.action_type;
        if kind.restrictions().once_per_game {
            self.taken_this_game.entry(action.player.clone()).or_default().insert(kind);
        }
        *self
            .taken_this_turn
            .entry(action.player.clone())
            .or_default()
            .entry(kind)
            .or_insert(0) += 1;
        debug!(action = %kind, player = %action.player, source = %action.source, "special action taken");
        Ok(())
    }

    #[must_use]
    pub fn taken_this_turn(&self, player: &PlayerId, kind: SpecialActionType) -> u32 {
        self.taken_this_turn
            .get(player)
            .and_then(|counts| counts.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn taken_this_game(&self, player: &PlayerId, kind: SpecialActionType) -> bool {
        self.taken_this_game.get(player).is_some_and(|taken| taken.contains(&kind))
    }

    /// Clear per-turn counts. Once-per-game records persist.
    pub fn reset_turn(&mut self) {
        self.taken_this_turn.clear();
    }

    pub fn set_can_take_during_resolve(&mut self, allowed: bool) {
        self.during_resolve = allowed;
    }

    #[must_use]
    pub fn can_take_during_resolve(&self) -> bool {
        self.during_resolve
    }

    pub fn reset(&mut self) {
        self.taken_this_game.clear();
        self.taken_this_turn.clear();
        self.during_resolve = false;
    }
}
