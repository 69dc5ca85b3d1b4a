//! Activation bookkeeping for mana abilities.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};

/// Which mana abilities are mid-activation, and how often each resolved
/// in the current window.
///
/// Once a player begins to activate a mana ability, that same ability
/// can't be activated again until it has resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaAbilityActivationContext {
    activating: FxHashSet<String>,
    resolved: FxHashMap<String, u32>,
}

impl ManaAbilityActivationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `ability_id` as activating.
    ///
    /// Fails with `AlreadyActivating` if it already is.
    pub fn begin_activation(&mut self, ability_id: &str) -> Result<()> {
        if !self.activating.insert(ability_id.to_string()) {
            return Err(RulesError::AlreadyActivating(ability_id.to_string()));
        }
        Ok(())
    }

    /// The ability resolved: clear its flag and count the resolution.
    pub fn end_activation(&mut self, ability_id: &str) {
        self.activating.remove(ability_id);
        *self.resolved.entry(ability_id.to_string()).or_insert(0) += 1;
    }

    /// The ability's action failed: clear its flag without counting it.
    pub fn abort_activation(&mut self, ability_id: &str) {
        self.activating.remove(ability_id);
    }

    #[must_use]
    pub fn can_activate(&self, ability_id: &str) -> bool {
        !self.activating.contains(ability_id)
    }

    #[must_use]
    pub fn is_activating(&self, ability_id: &str) -> bool {
        self.activating.contains(ability_id)
    }

    /// Resolutions of `ability_id` since the window was last reset.
    #[must_use]
    pub fn resolved_count(&self, ability_id: &str) -> u32 {
        self.resolved.get(ability_id).copied().unwrap_or(0)
    }

    /// Start a new window. In-flight activations are kept.
    pub fn reset_window(&mut self) {
        self.resolved.clear();
    }

    pub fn reset(&mut self) {
        self.activating.clear();
        self.resolved.clear();
    }
}
