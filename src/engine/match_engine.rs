//! One match's rules state and the operations that drive it.

use std::sync::Arc;

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{EntityId, GameStateAccessor, PlayerId, RulesConfig};
use crate::counters::{Counter, CounterOperations, Counters};
use crate::error::{Result, RulesError};
use crate::events::{Event, EventBus, EventType, SubscriptionHandle};
use crate::mana::{ActivationGate, ManaAbilityManager};
use crate::payment::{ChoiceManager, PaymentState, PaymentWindowManager};
use crate::priority::{
    ActionTiming, ActionType, PassOutcome, PriorityTracker, PriorityWindow, PriorityWindowManager, SpecialAction,
    SpecialActionManager,
};
use crate::stack::{
    CommandContext, CommandOutput, LegalityChecker, LegalityVerdict, ResolutionContext, StackItem, StackItemView,
    StackManager,
};
use crate::triggers::TriggerManager;
use crate::turn::{TurnManager, TurnState};
use crate::watchers::WatcherRegistry;

/// What happened to the item taken off the top of the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveOutcome {
    Resolved { id: String },
    /// The item was no longer legal and left the stack without effect.
    Removed { id: String, reason: String },
}

/// What a priority pass led to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PriorityOutcome {
    /// Priority moved on.
    Passed { next: PlayerId },
    /// Everyone passed with a non-empty stack; the top item left it.
    Resolved(ResolveOutcome),
    /// Everyone passed with an empty stack; the match moved on a step.
    StepAdvanced(TurnState),
}

/// Serializable snapshot of a match for presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchView {
    /// Bottom to top.
    pub stack: Vec<StackItemView>,
    pub turn: TurnState,
    pub priority_player: Option<PlayerId>,
    pub payment: Option<PaymentState>,
    pub window: Option<PriorityWindow>,
    pub pending_choices: usize,
    /// Most recent last.
    pub history: Vector<Event>,
}

/// Rules state of one match.
///
/// The engine is owned by a single worker and mutated through `&mut self`.
/// The event bus and watcher registry may also be read from elsewhere.
pub struct MatchEngine {
    config: RulesConfig,
    bus: EventBus,
    watchers: Arc<WatcherRegistry>,
    watcher_subscription: SubscriptionHandle,
    triggers: TriggerManager,
    stack: StackManager,
    legality: LegalityChecker,
    resolution: ResolutionContext,
    mana: ManaAbilityManager,
    payments: PaymentWindowManager,
    windows: PriorityWindowManager,
    choices: ChoiceManager,
    special_actions: SpecialActionManager,
    turns: TurnManager,
    priority: PriorityTracker,
    counters: FxHashMap<EntityId, Counters>,
    history: Vector<Event>,
    state: Option<Arc<dyn GameStateAccessor>>,
}

impl MatchEngine {
    /// A match between `players` in seat order; the first seat takes turn 1.
    pub fn new<I, P>(players: I, config: RulesConfig) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlayerId>,
    {
        let priority = PriorityTracker::new(players);
        let first = priority.players().first().cloned().unwrap_or_default();

        let bus = EventBus::new();
        let watchers = Arc::new(WatcherRegistry::new());
        let watcher_subscription = watchers.subscribe_to(&bus);

        Self {
            bus,
            watchers,
            watcher_subscription,
            triggers: TriggerManager::new(),
            stack: StackManager::new(),
            legality: LegalityChecker::detached(),
            resolution: ResolutionContext::from_config(&config),
            mana: ManaAbilityManager::from_config(&config),
            payments: PaymentWindowManager::new(),
            windows: PriorityWindowManager::new(),
            choices: ChoiceManager::new(),
            special_actions: SpecialActionManager::new(),
            turns: TurnManager::new(first),
            priority,
            counters: FxHashMap::default(),
            history: Vector::new(),
            state: None,
            config,
        }
    }

    /// Attach the match state used for legality checks and trigger
    /// conditions.
    #[must_use]
    pub fn with_state(mut self, state: Arc<dyn GameStateAccessor>) -> Self {
        self.attach_state(state);
        self
    }

    pub fn attach_state(&mut self, state: Arc<dyn GameStateAccessor>) {
        self.legality.set_state(Arc::clone(&state));
        self.state = Some(state);
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn watchers(&self) -> &Arc<WatcherRegistry> {
        &self.watchers
    }

    pub fn triggers_mut(&mut self) -> &mut TriggerManager {
        &mut self.triggers
    }

    #[must_use]
    pub fn stack(&self) -> &StackManager {
        &self.stack
    }

    #[must_use]
    pub fn resolution(&self) -> &ResolutionContext {
        &self.resolution
    }

    #[must_use]
    pub fn mana(&self) -> &ManaAbilityManager {
        &self.mana
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentWindowManager {
        &self.payments
    }

    pub fn payments_mut(&mut self) -> &mut PaymentWindowManager {
        &mut self.payments
    }

    #[must_use]
    pub fn windows(&self) -> &PriorityWindowManager {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut PriorityWindowManager {
        &mut self.windows
    }

    pub fn choices_mut(&mut self) -> &mut ChoiceManager {
        &mut self.choices
    }

    #[must_use]
    pub fn special_actions(&self) -> &SpecialActionManager {
        &self.special_actions
    }

    #[must_use]
    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    #[must_use]
    pub fn priority(&self) -> &PriorityTracker {
        &self.priority
    }

    #[must_use]
    pub fn history(&self) -> &Vector<Event> {
        &self.history
    }

    #[must_use]
    pub fn counters(&self, object: &EntityId) -> Option<&Counters> {
        self.counters.get(object)
    }

    /// Publish an event: deliver it to listeners and watchers, record it,
    /// and push the stack items of any triggers it fires.
    pub fn publish(&mut self, event: Event) -> Event {
        let delivered = self.bus.publish(event);
        self.absorb(&delivered);
        delivered
    }

    /// Record an event already delivered on the bus and fire triggers.
    fn absorb(&mut self, event: &Event) {
        self.history.push_back(event.clone());
        let limit = self.config.history_limit;
        while limit > 0 && self.history.len() > limit {
            self.history.pop_front();
        }

        let items = self.triggers.handle_with_state(event, self.state.as_deref());
        if items.is_empty() {
            return;
        }
        debug!(event = %event.event_type, count = items.len(), "triggers fired");
        for item in items {
            self.stack.push(item);
        }
        self.priority.reset_passes();
    }

    /// Put an item on the stack. Its controller receives priority.
    pub fn push(&mut self, item: StackItem) {
        let controller = item.controller.clone();
        self.stack.push(item);
        self.priority.reset_passes();
        self.give_priority(&controller);
    }

    fn give_priority(&mut self, player: &PlayerId) {
        if self.priority.set_priority(player) {
            self.turns.set_priority(player.clone());
        }
    }

    /// Pop the top item and resolve it.
    ///
    /// An item that fails its legality or cost check is removed without
    /// effect: its removal hook runs and `STACK_ITEM_REMOVED` is published.
    /// Otherwise the item's command runs inside a resolution; the events
    /// and items it queued are published and pushed afterwards, followed
    /// by `STACK_ITEM_RESOLVED`. A failing command is returned as
    /// `ResolutionFailed` and its queued output is discarded.
    ///
    /// Whatever the outcome, passes are reset and priority returns to the
    /// active player.
    pub fn resolve_top(&mut self) -> Result<ResolveOutcome> {
        let item = self.stack.pop()?;

        let verdict = self.legality.check_stack_item(&item);
        let verdict = if verdict.legal {
            self.legality.check_costs_paid(&item)
        } else {
            verdict
        };
        if !verdict.legal {
            return Ok(self.remove_illegal(item, &verdict));
        }

        if let Err(err) = self.resolution.begin_resolution(&item.id) {
            self.stack.push(item);
            self.after_resolution();
            return Err(err);
        }
        self.publish(
            Event::new(EventType::StackItemResolving, item.source.clone(), item.source.clone(), item.controller.clone())
                .with_data(item.id.clone()),
        );

        let mut output = CommandOutput::new();
        let result = {
            let mut ctx = CommandContext::new(&item, &mut self.resolution, &self.mana, &mut self.choices, &mut output)
                .with_payment(self.payments.active())
                .with_window(self.windows.active());
            item.command.execute(&mut ctx)
        };
        let ended = self.resolution.end_resolution(&item.id);

        if let Err(err) = result {
            info!(item = %item.id, error = %err, "stack item failed to resolve");
            self.after_resolution();
            return Err(RulesError::ResolutionFailed {
                id: item.id.clone(),
                source: Box::new(err),
            });
        }
        if let Err(err) = ended {
            self.after_resolution();
            return Err(err);
        }

        for event in output.events {
            self.publish(event);
        }
        for queued in output.items {
            self.stack.push(queued);
        }
        self.publish(
            Event::new(EventType::StackItemResolved, item.source.clone(), item.source.clone(), item.controller.clone())
                .with_data(item.id.clone())
                .with_metadata("kind", item.kind.as_str()),
        );

        self.after_resolution();
        debug!(item = %item.id, "resolved");
        Ok(ResolveOutcome::Resolved { id: item.id })
    }

    fn remove_illegal(&mut self, item: StackItem, verdict: &LegalityVerdict) -> ResolveOutcome {
        info!(item = %item.id, reason = %verdict.reason, "removing illegal stack item");
        item.notify_removed(verdict);
        self.publish(Self::removed_event(&item, &verdict.reason));
        self.after_resolution();
        ResolveOutcome::Removed {
            id: item.id,
            reason: verdict.reason.clone(),
        }
    }

    fn removed_event(item: &StackItem, reason: &str) -> Event {
        Event::new(EventType::StackItemRemoved, item.source.clone(), item.source.clone(), item.controller.clone())
            .with_data(item.id.clone())
            .with_metadata("reason", reason)
    }

    fn after_resolution(&mut self) {
        let active = self.turns.active_player().clone();
        self.priority.reset_passes();
        self.give_priority(&active);
    }

    /// Remove every stack item that is no longer legal.
    ///
    /// Returns the removed ids; a `STACK_ITEM_REMOVED` event is published
    /// for each.
    pub fn purge_illegal(&mut self) -> Vec<String> {
        let before: FxHashMap<String, StackItem> =
            self.stack.iter().map(|item| (item.id.clone(), item.clone())).collect();
        let removed = self.stack.remove_illegal_items(&self.legality);
        for id in &removed {
            if let Some(item) = before.get(id) {
                self.publish(Self::removed_event(item, "illegal"));
            }
        }
        removed
    }

    /// `player` passes priority.
    ///
    /// Once every player still in the match has passed in succession, the
    /// top of the stack resolves, or the match advances a step if the
    /// stack is empty.
    pub fn pass_priority(&mut self, player: &PlayerId) -> Result<PriorityOutcome> {
        match self.priority.pass(player)? {
            PassOutcome::Passed { next } => {
                self.turns.set_priority(next.clone());
                Ok(PriorityOutcome::Passed { next })
            }
            PassOutcome::AllPassed if self.stack.is_empty() => Ok(PriorityOutcome::StepAdvanced(self.advance_step())),
            PassOutcome::AllPassed => self.resolve_top().map(PriorityOutcome::Resolved),
        }
    }

    /// Move to the next step and announce it.
    ///
    /// A new turn goes to the next player in seat order who is still in
    /// the match, and clears watchers and per-turn special action counts.
    pub fn advance_step(&mut self) -> TurnState {
        let before = self.turns.turn_number();
        let next_active = self.next_active_player();
        self.turns.advance_step(next_active);

        if self.turns.turn_number() != before {
            self.watchers.reset_watchers();
            self.special_actions.reset_turn();
            self.mana.reset_window();
            info!(turn = self.turns.turn_number(), active = %self.turns.active_player(), "turn begins");
        }

        let active = self.turns.active_player().clone();
        self.priority.reset_passes();
        self.give_priority(&active);

        for event in self.turns.step_events() {
            self.publish(event);
        }
        self.turns.turn_state()
    }

    fn next_active_player(&self) -> PlayerId {
        let players = self.priority.players();
        let Some(current) = players.iter().position(|p| p == self.turns.active_player()) else {
            return PlayerId::none();
        };
        (1..=players.len())
            .map(|step| &players[(current + step) % players.len()])
            .find(|p| !self.priority.is_out(p))
            .cloned()
            .unwrap_or_default()
    }

    /// Take a player who lost or left out of priority and turn rotation.
    pub fn remove_player(&mut self, player: &PlayerId) {
        self.priority.mark_out(player);
        if let Some(next) = self.priority.priority_player().cloned() {
            self.turns.set_priority(next);
        }
    }

    /// Activate a mana ability for `player` and drain any triggered mana
    /// abilities it causes.
    ///
    /// The open payment, priority window and resolution are checked by
    /// [`ActivationGate`], the same checks a resolving command goes through.
    pub fn activate_mana_ability(&mut self, player: &PlayerId, ability_id: &str) -> Result<()> {
        let ability = self
            .mana
            .get(ability_id)
            .ok_or_else(|| RulesError::ManaAbilityNotFound(ability_id.to_string()))?;
        ActivationGate::new(&self.resolution)
            .with_payment(self.payments.active())
            .with_window(self.windows.active())
            .check(&self.mana, &ability, player)?;

        self.mana.activate(&ability)?;
        self.mana.resolve_triggered()?;
        self.publish(
            Event::new(EventType::ActivatedAbility, ability.source.clone(), ability.source.clone(), player.clone())
                .with_data(ability.id.clone())
                .with_metadata("mana_ability", "true"),
        );
        Ok(())
    }

    /// Timing facts for an action by `player` right now.
    #[must_use]
    pub fn timing_for(&self, player: &PlayerId) -> ActionTiming {
        ActionTiming {
            has_priority: self.priority.priority_player() == Some(player),
            main_phase: self.turns.current_phase().is_main(),
            empty_stack: self.stack.is_empty(),
            own_turn: self.turns.active_player() == player,
        }
    }

    /// Take a special action. The player keeps priority afterwards.
    pub fn take_special_action(&mut self, action: &SpecialAction) -> Result<()> {
        let deny = |reason: &str| RulesError::SpecialActionNotAllowed {
            action: action.action_type.to_string(),
            reason: reason.to_string(),
        };
        if self.resolution.is_resolving()
            && !self.special_actions.can_take_during_resolve()
            && !self.resolution.can_take_special_actions()
        {
            return Err(deny("a spell or ability is resolving"));
        }
        if self.windows.active().is_some() && !self.windows.is_action_allowed(ActionType::SpecialAction) {
            return Err(deny("the open priority window does not allow it"));
        }

        let timing = self.timing_for(&action.player);
        self.special_actions.take_action(action, timing)?;
        self.priority.reset_passes();
        self.publish(
            Event::new(EventType::TakenSpecialAction, action.source.clone(), action.source.clone(), action.player.clone())
                .with_data(action.action_type.as_str())
                .with_description(action.description.clone()),
        );
        Ok(())
    }

    /// Open the payment window for a spell or ability being cast.
    pub fn begin_payment(&mut self, payment: PaymentState) -> Result<()> {
        self.payments.begin_payment(payment)?;
        self.mana.reset_window();
        Ok(())
    }

    pub fn end_payment(&mut self, id: &str) -> Result<PaymentState> {
        self.payments.end_payment(id)
    }

    /// Put counters on an object and publish `COUNTER_ADDED`.
    pub fn add_counter(&mut self, object: &EntityId, counter: Counter, controller: &PlayerId) -> Event {
        let counters = self.counters.entry(object.clone()).or_default();
        let event = CounterOperations::new(&self.bus).add_counter(counters, object, counter, controller);
        self.absorb(&event);
        event
    }

    /// Take counters off an object. Returns `None` if it had none of them.
    pub fn remove_counter(&mut self, object: &EntityId, name: &str, amount: u32, controller: &PlayerId) -> Option<Event> {
        let counters = self.counters.get_mut(object)?;
        let event = CounterOperations::new(&self.bus).remove_counter(counters, object, name, amount, controller)?;
        self.absorb(&event);
        Some(event)
    }

    /// Serializable snapshot of the match.
    #[must_use]
    pub fn view(&self) -> MatchView {
        MatchView {
            stack: self.stack.views(),
            turn: self.turns.turn_state(),
            priority_player: self.priority.priority_player().cloned(),
            payment: self.payments.active().cloned(),
            window: self.windows.active().cloned(),
            pending_choices: self.choices.pending_count(),
            history: self.history.clone(),
        }
    }
}

impl Drop for MatchEngine {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.watcher_subscription);
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("turn", &self.turns.turn_state())
            .field("stack", &self.stack.len())
            .field("depth", &self.resolution.depth())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
