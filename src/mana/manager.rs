//! Mana abilities and the manager that executes them.

use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::{EntityId, PlayerId, RulesConfig};
use crate::error::{Result, RulesError};

use super::context::ManaAbilityActivationContext;

/// What a mana ability does when it resolves.
///
/// The manager is passed in so an action can queue triggered mana
/// abilities or activate other mana abilities.
pub trait ManaAction: Send + Sync {
    fn execute(&self, manager: &ManaAbilityManager) -> Result<()>;
}

impl<F> ManaAction for F
where
    F: Fn(&ManaAbilityManager) -> Result<()> + Send + Sync,
{
    fn execute(&self, manager: &ManaAbilityManager) -> Result<()> {
        self(manager)
    }
}

/// A mana ability: resolves on activation and never uses the stack.
#[derive(Clone)]
pub struct ManaAbility {
    pub id: String,
    pub source: EntityId,
    pub controller: PlayerId,
    pub text: String,
    action: Arc<dyn ManaAction>,
}

impl ManaAbility {
    pub fn new<F>(
        id: impl Into<String>,
        source: impl Into<EntityId>,
        controller: impl Into<PlayerId>,
        action: F,
    ) -> Self
    where
        F: Fn(&ManaAbilityManager) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            source: source.into(),
            controller: controller.into(),
            text: String::new(),
            action: Arc::new(action),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl std::fmt::Debug for ManaAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManaAbility")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("controller", &self.controller)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

/// A mana ability that triggers from another mana ability.
///
/// It doesn't use the stack either; it resolves right after the
/// ability that triggered it.
#[derive(Clone)]
pub struct TriggeredManaAbility {
    pub id: String,
    pub source: EntityId,
    pub controller: PlayerId,
    /// Id of the mana ability that triggered this one.
    pub trigger_id: String,
    pub text: String,
    action: Arc<dyn ManaAction>,
}

impl TriggeredManaAbility {
    pub fn new<F>(
        id: impl Into<String>,
        source: impl Into<EntityId>,
        controller: impl Into<PlayerId>,
        trigger_id: impl Into<String>,
        action: F,
    ) -> Self
    where
        F: Fn(&ManaAbilityManager) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            source: source.into(),
            controller: controller.into(),
            trigger_id: trigger_id.into(),
            text: String::new(),
            action: Arc::new(action),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

impl std::fmt::Debug for TriggeredManaAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggeredManaAbility")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("trigger_id", &self.trigger_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Inner {
    abilities: FxHashMap<String, ManaAbility>,
    context: ManaAbilityActivationContext,
    triggered: VecDeque<TriggeredManaAbility>,
    during_cast: bool,
    during_resolve: bool,
    max_triggered_iterations: usize,
}

impl Inner {
    fn from_config(config: &RulesConfig) -> Self {
        Self {
            abilities: FxHashMap::default(),
            context: ManaAbilityActivationContext::new(),
            triggered: VecDeque::new(),
            during_cast: config.mana_during_cast,
            during_resolve: config.mana_during_resolve,
            max_triggered_iterations: config.max_triggered_mana_iterations,
        }
    }
}

/// Executes mana abilities immediately and drains triggered ones.
///
/// All methods take `&self`. No lock is held while an ability's action
/// runs, so an action may call back into the manager; activating the
/// ability that is currently running fails with `AlreadyActivating`.
#[derive(Debug)]
pub struct ManaAbilityManager {
    inner: RwLock<Inner>,
}

impl Default for ManaAbilityManager {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

impl ManaAbilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::from_config(config)),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an ability to the catalogue, replacing any with the same id.
    pub fn register(&self, ability: ManaAbility) {
        debug!(id = %ability.id, source = %ability.source, "register mana ability");
        self.write().abilities.insert(ability.id.clone(), ability);
    }

    pub fn unregister(&self, ability_id: &str) -> Option<ManaAbility> {
        self.write().abilities.remove(ability_id)
    }

    #[must_use]
    pub fn get(&self, ability_id: &str) -> Option<ManaAbility> {
        self.read().abilities.get(ability_id).cloned()
    }

    /// Activate and resolve a mana ability right away.
    ///
    /// On success the ability's resolution is counted for this window.
    /// If the action fails the activation flag is cleared, so the ability
    /// can be activated again, and the failure is returned wrapped in
    /// `ManaAbilityFailed`.
    pub fn activate(&self, ability: &ManaAbility) -> Result<()> {
        self.write().context.begin_activation(&ability.id)?;
        debug!(id = %ability.id, controller = %ability.controller, "activate mana ability");

        match ability.action.execute(self) {
            Ok(()) => {
                self.write().context.end_activation(&ability.id);
                Ok(())
            }
            Err(err) => {
                self.write().context.abort_activation(&ability.id);
                warn!(id = %ability.id, error = %err, "mana ability failed");
                Err(RulesError::ManaAbilityFailed {
                    id: ability.id.clone(),
                    source: Box::new(err),
                })
            }
        }
    }

    /// Activate a registered ability by id.
    pub fn activate_by_id(&self, ability_id: &str) -> Result<()> {
        let ability = self
            .get(ability_id)
            .ok_or_else(|| RulesError::ManaAbilityNotFound(ability_id.to_string()))?;
        self.activate(&ability)
    }

    pub fn queue_triggered(&self, ability: TriggeredManaAbility) {
        debug!(id = %ability.id, trigger = %ability.trigger_id, "queue triggered mana ability");
        self.write().triggered.push_back(ability);
    }

    /// Resolve queued triggered mana abilities in FIFO order.
    ///
    /// Abilities queued while draining are resolved in the same call.
    /// Returns how many resolved. Stops with `TriggeredManaLimit` once the
    /// configured number of executions is reached, leaving the rest of the
    /// queue in place. A failing action stops the drain and is returned
    /// wrapped in `ManaAbilityFailed`.
    pub fn resolve_triggered(&self) -> Result<usize> {
        let limit = self.read().max_triggered_iterations;
        let mut resolved = 0;
        loop {
            if resolved >= limit && self.has_pending_triggered() {
                warn!(limit, "triggered mana drain hit its iteration limit");
                return Err(RulesError::TriggeredManaLimit { limit });
            }
            let Some(ability) = self.write().triggered.pop_front() else {
                return Ok(resolved);
            };
            ability.action.execute(self).map_err(|err| RulesError::ManaAbilityFailed {
                id: ability.id.clone(),
                source: Box::new(err),
            })?;
            resolved += 1;
        }
    }

    #[must_use]
    pub fn has_pending_triggered(&self) -> bool {
        !self.read().triggered.is_empty()
    }

    #[must_use]
    pub fn pending_triggered(&self) -> usize {
        self.read().triggered.len()
    }

    pub fn set_can_activate_during_cast(&self, allowed: bool) {
        self.write().during_cast = allowed;
    }

    pub fn set_can_activate_during_resolve(&self, allowed: bool) {
        self.write().during_resolve = allowed;
    }

    /// Whether the manager permits activation in the given context.
    ///
    /// Outside casting and resolution a player with priority may always
    /// activate mana abilities.
    #[must_use]
    pub fn can_activate(&self, during_cast: bool, during_resolve: bool) -> bool {
        let inner = self.read();
        if during_cast {
            inner.during_cast
        } else if during_resolve {
            inner.during_resolve
        } else {
            true
        }
    }

    /// Snapshot of the activation bookkeeping.
    #[must_use]
    pub fn activation_context(&self) -> ManaAbilityActivationContext {
        self.read().context.clone()
    }

    #[must_use]
    pub fn is_activating(&self, ability_id: &str) -> bool {
        self.read().context.is_activating(ability_id)
    }

    /// Start a new payment window.
    pub fn reset_window(&self) {
        self.write().context.reset_window();
    }

    /// Clear activation state, the triggered queue and the permissions.
    /// The ability catalogue is kept.
    pub fn reset(&self) {
        let mut inner = self.write();
        inner.context.reset();
        inner.triggered.clear();
        inner.during_cast = true;
        inner.during_resolve = false;
    }
}
