//! Match-state checks every mana ability activation goes through.

use crate::core::PlayerId;
use crate::error::{Result, RulesError};
use crate::payment::PaymentState;
use crate::priority::{ActionType, PriorityWindow};
use crate::stack::ResolutionContext;

use super::manager::{ManaAbility, ManaAbilityManager};

/// The open payment, priority window and resolution an activation is
/// checked against.
#[derive(Clone, Copy, Debug)]
pub struct ActivationGate<'a> {
    pub payment: Option<&'a PaymentState>,
    pub window: Option<&'a PriorityWindow>,
    pub resolution: &'a ResolutionContext,
}

impl<'a> ActivationGate<'a> {
    pub fn new(resolution: &'a ResolutionContext) -> Self {
        Self {
            payment: None,
            window: None,
            resolution,
        }
    }

    #[must_use]
    pub fn with_payment(mut self, payment: Option<&'a PaymentState>) -> Self {
        self.payment = payment;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: Option<&'a PriorityWindow>) -> Self {
        self.window = window;
        self
    }

    /// Whether `player` may activate `ability` right now.
    ///
    /// Refused when `player` doesn't control the ability, after special
    /// payment moved the open payment to its final step, while resolving
    /// unless mana abilities were opened, and inside a priority window
    /// that doesn't allow them.
    pub fn check(&self, mana: &ManaAbilityManager, ability: &ManaAbility, player: &PlayerId) -> Result<()> {
        if &ability.controller != player {
            return Err(RulesError::ManaAbilitiesDisabled(format!("{player} does not control {}", ability.id)));
        }

        if let Some(payment) = self.payment {
            if !payment.can_activate_mana_abilities() {
                return Err(RulesError::ManaAbilitiesDisabled(format!(
                    "special payment used for {}",
                    payment.id
                )));
            }
            if !mana.can_activate(true, false) {
                return Err(RulesError::ManaAbilitiesDisabled("not while casting".to_string()));
            }
        }
        if self.resolution.is_resolving()
            && !mana.can_activate(false, true)
            && !self.resolution.can_activate_mana_abilities()
        {
            return Err(RulesError::ManaAbilitiesDisabled(format!(
                "resolving {}",
                self.resolution.current_resolving_id().unwrap_or_default()
            )));
        }
        if let Some(window) = self.window {
            if !window.allows(ActionType::ActivateMana) {
                return Err(RulesError::ManaAbilitiesDisabled(format!("{} window is open", window.window_type)));
            }
        }
        Ok(())
    }
}
