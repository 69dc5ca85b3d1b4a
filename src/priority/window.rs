//! Priority windows opened during casting and resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PlayerId;
use crate::error::{Result, RulesError};

/// Actions a player might take inside a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    ActivateMana,
    SpecialAction,
    CastSpell,
    ActivateAbility,
    MakeChoice,
    SelectTarget,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionType::ActivateMana => "ACTIVATE_MANA",
            ActionType::SpecialAction => "SPECIAL_ACTION",
            ActionType::CastSpell => "CAST_SPELL",
            ActionType::ActivateAbility => "ACTIVATE_ABILITY",
            ActionType::MakeChoice => "MAKE_CHOICE",
            ActionType::SelectTarget => "SELECT_TARGET",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityWindowType {
    ManaPayment,
    Choice,
    Target,
    SpecialAction,
    NestedCast,
}

impl PriorityWindowType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PriorityWindowType::ManaPayment => "MANA_PAYMENT",
            PriorityWindowType::Choice => "CHOICE",
            PriorityWindowType::Target => "TARGET",
            PriorityWindowType::SpecialAction => "SPECIAL_ACTION",
            PriorityWindowType::NestedCast => "NESTED_CAST",
        }
    }
}

impl std::fmt::Display for PriorityWindowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window in which one player may take a restricted set of actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityWindow {
    pub window_type: PriorityWindowType,
    pub player: PlayerId,
    /// What is happening, for logs and clients.
    pub context: String,
    pub allowed_actions: Vec<ActionType>,
}

impl PriorityWindow {
    pub fn new(window_type: PriorityWindowType, player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self {
            window_type,
            player: player.into(),
            context: context.into(),
            allowed_actions: Vec::new(),
        }
    }

    /// Paying costs: mana abilities only.
    pub fn mana_payment(player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self::new(PriorityWindowType::ManaPayment, player, context).with_action(ActionType::ActivateMana)
    }

    /// Special actions, with mana abilities to pay for them.
    pub fn special_action(player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self::new(PriorityWindowType::SpecialAction, player, context)
            .with_action(ActionType::SpecialAction)
            .with_action(ActionType::ActivateMana)
    }

    pub fn choice(player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self::new(PriorityWindowType::Choice, player, context).with_action(ActionType::MakeChoice)
    }

    pub fn target(player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self::new(PriorityWindowType::Target, player, context).with_action(ActionType::SelectTarget)
    }

    /// Casting a spell while another resolves.
    pub fn nested_cast(player: impl Into<PlayerId>, context: impl Into<String>) -> Self {
        Self::new(PriorityWindowType::NestedCast, player, context)
            .with_action(ActionType::CastSpell)
            .with_action(ActionType::ActivateMana)
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionType) -> Self {
        if !self.allowed_actions.contains(&action) {
            self.allowed_actions.push(action);
        }
        self
    }

    #[must_use]
    pub fn allows(&self, action: ActionType) -> bool {
        self.allowed_actions.contains(&action)
    }
}

/// Holds at most one open window, and the windows closed so far.
#[derive(Clone, Debug, Default)]
pub struct PriorityWindowManager {
    active: Option<PriorityWindow>,
    history: Vec<PriorityWindow>,
}

impl PriorityWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window. Fails if one is already open.
    pub fn open_window(&mut self, window: PriorityWindow) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(RulesError::PriorityWindowOpen(active.window_type.to_string()));
        }
        debug!(kind = %window.window_type, player = %window.player, "open priority window");
        self.active = Some(window);
        Ok(())
    }

    /// Close the open window, if any.
    pub fn close_window(&mut self) -> Option<PriorityWindow> {
        let window = self.active.take()?;
        debug!(kind = %window.window_type, "close priority window");
        self.history.push(window.clone());
        Some(window)
    }

    #[must_use]
    pub fn active(&self) -> Option<&PriorityWindow> {
        self.active.as_ref()
    }

    /// Whether the open window allows `action`. False with no window open.
    #[must_use]
    pub fn is_action_allowed(&self, action: ActionType) -> bool {
        self.active.as_ref().is_some_and(|w| w.allows(action))
    }

    /// Closed windows, oldest first.
    #[must_use]
    pub fn history(&self) -> &[PriorityWindow] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_window_at_a_time() {
        let mut windows = PriorityWindowManager::new();
        assert!(!windows.is_action_allowed(ActionType::ActivateMana));

        windows.open_window(PriorityWindow::mana_payment("alice", "paying for bolt")).unwrap();
        assert!(windows.is_action_allowed(ActionType::ActivateMana));
        assert!(!windows.is_action_allowed(ActionType::CastSpell));

        let err = windows.open_window(PriorityWindow::choice("bob", "choose a mode")).unwrap_err();
        assert!(err.to_string().contains("already open"));
        assert_eq!(windows.active().unwrap().window_type, PriorityWindowType::ManaPayment);
    }

    #[test]
    fn test_close_records_history() {
        let mut windows = PriorityWindowManager::new();
        assert!(windows.close_window().is_none());

        windows.open_window(PriorityWindow::special_action("alice", "morph")).unwrap();
        let closed = windows.close_window().unwrap();
        assert!(closed.allows(ActionType::SpecialAction));
        assert!(windows.active().is_none());
        assert_eq!(windows.history().len(), 1);

        windows.open_window(PriorityWindow::nested_cast("alice", "cascade")).unwrap();
        windows.reset();
        assert!(windows.active().is_none());
        assert!(windows.history().is_empty());
    }

    #[test]
    fn test_window_serializes_screaming_names() {
        let window = PriorityWindow::mana_payment("alice", "x");
        let json = serde_json::to_string(&window).unwrap();
        assert!(json.contains("MANA_PAYMENT"));
        assert!(json.contains("ACTIVATE_MANA"));
    }
}
