//! Trigger manager.
//!
//! The manager stores ability triggers and, for each published event,
//! materializes the stack items of every trigger that fires. Content
//! registers triggers when a permanent enters play and unregisters them
//! when it leaves.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{EntityId, GameStateAccessor, PlayerId};
use crate::events::{Event, EventType};
use crate::stack::{StackCommand, StackItem, StackItemKind};

use super::condition::{ConditionContext, ConditionEvaluator, EventCondition};

/// Unique identifier for a trigger. Zero means "assign one".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// Builds the stack item a trigger puts on the stack.
pub trait StackItemBuilder: Send + Sync {
    fn build(&self, trigger: &AbilityTrigger, event: &Event) -> StackItem;
}

impl<F> StackItemBuilder for F
where
    F: Fn(&AbilityTrigger, &Event) -> StackItem + Send + Sync,
{
    fn build(&self, trigger: &AbilityTrigger, event: &Event) -> StackItem {
        self(trigger, event)
    }
}

/// Builds a triggered-ability item that runs a fixed command.
///
/// The item is controlled by the trigger's controller, or by the event's
/// controller when the trigger has none.
#[derive(Clone)]
pub struct TriggeredItem {
    command: Arc<dyn StackCommand>,
}

impl TriggeredItem {
    pub fn new(command: impl StackCommand + 'static) -> Self {
        Self {
            command: Arc::new(command),
        }
    }
}

impl StackItemBuilder for TriggeredItem {
    fn build(&self, trigger: &AbilityTrigger, event: &Event) -> StackItem {
        let controller = if trigger.controller.is_empty() {
            event.controller.clone()
        } else {
            trigger.controller.clone()
        };
        StackItem::new(String::new(), controller, StackItemKind::TriggeredAbility)
            .with_source(trigger.source.clone())
            .with_description(trigger.description.clone())
            .with_shared_command(Arc::clone(&self.command))
    }
}

/// "When [event] happens, if [condition], put [item] on the stack."
#[derive(Clone)]
pub struct AbilityTrigger {
    pub id: TriggerId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub event_type: EventType,
    /// `None` fires on every event of the type.
    pub condition: Option<EventCondition>,
    pub builder: Arc<dyn StackItemBuilder>,
    /// Remove the trigger after it fires once.
    pub once: bool,
    pub description: String,
}

impl AbilityTrigger {
    /// Create a trigger that builds its item with a closure.
    pub fn new<F>(event_type: EventType, builder: F) -> Self
    where
        F: Fn(&AbilityTrigger, &Event) -> StackItem + Send + Sync + 'static,
    {
        Self::with_builder(event_type, builder)
    }

    /// Create a trigger with any item builder.
    pub fn with_builder(event_type: EventType, builder: impl StackItemBuilder + 'static) -> Self {
        Self {
            id: TriggerId::default(),
            source: EntityId::none(),
            controller: PlayerId::none(),
            event_type,
            condition: None,
            builder: Arc::new(builder),
            once: false,
            description: String::new(),
        }
    }

    /// Create a trigger whose item runs `command`.
    pub fn with_command(event_type: EventType, command: impl StackCommand + 'static) -> Self {
        Self::with_builder(event_type, TriggeredItem::new(command))
    }

    #[must_use]
    pub fn with_id(mut self, id: TriggerId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<EntityId>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: impl Into<PlayerId>) -> Self {
        self.controller = controller.into();
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: EventCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Fire at most once (builder pattern).
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

impl std::fmt::Debug for AbilityTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilityTrigger")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("controller", &self.controller)
            .field("event_type", &self.event_type)
            .field("condition", &self.condition)
            .field("once", &self.once)
            .field("description", &self.description)
            .finish()
    }
}

type NamedPredicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Stores triggers and evaluates them against events.
///
/// Triggers matching the same event fire in registration order.
#[derive(Clone)]
pub struct TriggerManager {
    triggers: FxHashMap<TriggerId, AbilityTrigger>,

    /// Index by event type, in registration order.
    by_event_type: FxHashMap<EventType, Vec<TriggerId>>,

    /// Predicates for [`EventCondition::Named`].
    predicates: FxHashMap<String, NamedPredicate>,

    next_id: u32,

    /// Items built so far, for generated item ids.
    built: u64,
}

impl Default for TriggerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerManager {
    pub fn new() -> Self {
        Self {
            triggers: FxHashMap::default(),
            by_event_type: FxHashMap::default(),
            predicates: FxHashMap::default(),
            next_id: 1,
            built: 0,
        }
    }

    /// Register a trigger, returns its ID.
    ///
    /// A trigger registered under an existing ID replaces the old one.
    pub fn register(&mut self, mut trigger: AbilityTrigger) -> TriggerId {
        if trigger.id.raw() == 0 {
            trigger.id = TriggerId::new(self.next_id);
        } else {
            self.unregister(trigger.id);
        }
        self.next_id = self.next_id.max(trigger.id.raw().saturating_add(1));

        let id = trigger.id;
        self.by_event_type.entry(trigger.event_type).or_default().push(id);
        debug!(trigger = %id, event_type = %trigger.event_type, source = %trigger.source, "register()");
        self.triggers.insert(id, trigger);
        id
    }

    pub fn unregister(&mut self, id: TriggerId) -> Option<AbilityTrigger> {
        let trigger = self.triggers.remove(&id)?;
        if let Some(list) = self.by_event_type.get_mut(&trigger.event_type) {
            list.retain(|&tid| tid != id);
            if list.is_empty() {
                self.by_event_type.remove(&trigger.event_type);
            }
        }
        Some(trigger)
    }

    /// Remove all triggers owned by a source object.
    pub fn remove_for_source(&mut self, source: &EntityId) -> usize {
        let to_remove: Vec<_> = self
            .triggers
            .values()
            .filter(|t| &t.source == source)
            .map(|t| t.id)
            .collect();
        for id in &to_remove {
            self.unregister(*id);
        }
        to_remove.len()
    }

    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&AbilityTrigger> {
        self.triggers.get(&id)
    }

    pub fn triggers_for_source<'a>(&'a self, source: &'a EntityId) -> impl Iterator<Item = &'a AbilityTrigger> + 'a {
        self.triggers.values().filter(move |t| &t.source == source)
    }

    /// Make a predicate available to [`EventCondition::Named`] conditions.
    pub fn register_predicate<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
        self.by_event_type.clear();
    }

    /// Evaluate `event` and return the items of every trigger that fires.
    pub fn handle(&mut self, event: &Event) -> Vec<StackItem> {
        self.handle_with_state(event, None)
    }

    /// Like [`handle`](Self::handle), with match state available to
    /// state-dependent conditions.
    pub fn handle_with_state(&mut self, event: &Event, state: Option<&dyn GameStateAccessor>) -> Vec<StackItem> {
        let Some(ids) = self.by_event_type.get(&event.event_type) else {
            return Vec::new();
        };

        let predicates = &self.predicates;
        let named = |name: &str, e: &Event| predicates.get(name).is_some_and(|p| p(e));
        let mut ctx = ConditionContext::new(event).with_named(&named);
        if let Some(state) = state {
            ctx = ctx.with_state(state);
        }

        let mut items = Vec::new();
        let mut spent = Vec::new();
        for id in ids {
            let Some(trigger) = self.triggers.get(id) else {
                continue;
            };
            if let Some(condition) = &trigger.condition {
                if !ConditionEvaluator::evaluate(condition, &ctx) {
                    continue;
                }
            }

            let mut item = trigger.builder.build(trigger, event);
            self.built += 1;
            if item.id.is_empty() {
                item.id = format!("trigger-{}-{}", id.raw(), self.built);
            }
            debug!(trigger = %id, item = %item.id, event_type = %event.event_type, "trigger fired");
            items.push(item);

            if trigger.once {
                spent.push(*id);
            }
        }

        for id in spent {
            self.unregister(id);
        }
        items
    }
}

impl std::fmt::Debug for TriggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerManager")
            .field("triggers", &self.triggers.len())
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::NoOp;

    fn spell_cast(controller: &str, card_name: &str) -> Event {
        Event::new(EventType::SpellCast, "card", "card", controller).with_metadata("card_name", card_name)
    }

    fn echo_controller(event_type: EventType) -> AbilityTrigger {
        AbilityTrigger::new(event_type, |_: &AbilityTrigger, e: &Event| {
            StackItem::new("", e.controller.clone(), StackItemKind::TriggeredAbility)
        })
    }

    #[test]
    fn test_trigger_id() {
        let id = TriggerId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "Trigger(5)");
    }

    #[test]
    fn test_register_assigns_ids() {
        let mut manager = TriggerManager::new();
        let a = manager.register(echo_controller(EventType::SpellCast));
        let b = manager.register(echo_controller(EventType::DrewCard));
        let c = manager.register(echo_controller(EventType::DrewCard).with_id(TriggerId::new(10)));
        let d = manager.register(echo_controller(EventType::DrewCard));

        assert_eq!((a.raw(), b.raw(), c.raw(), d.raw()), (1, 2, 10, 11));
        assert_eq!(manager.len(), 4);
    }

    #[test]
    fn test_unregister() {
        let mut manager = TriggerManager::new();
        let id = manager.register(echo_controller(EventType::SpellCast));

        assert!(manager.unregister(id).is_some());
        assert!(manager.unregister(id).is_none());
        assert!(manager.handle(&spell_cast("alice", "Shock")).is_empty());
    }

    #[test]
    fn test_condition_filters() {
        let mut manager = TriggerManager::new();
        manager.register(
            echo_controller(EventType::SpellCast)
                .with_condition(EventCondition::metadata_equals("card_name", "Lightning Bolt")),
        );

        assert!(manager.handle(&spell_cast("alice", "Shock")).is_empty());
        let items = manager.handle(&spell_cast("alice", "Lightning Bolt"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].controller, PlayerId::new("alice"));
        assert!(items[0].id.starts_with("trigger-1-"));
    }

    #[test]
    fn test_registration_order() {
        let mut manager = TriggerManager::new();
        for name in ["first", "second", "third"] {
            manager.register(AbilityTrigger::new(EventType::DrewCard, move |_: &AbilityTrigger, _: &Event| {
                StackItem::triggered(name, "alice", "")
            }));
        }

        let ids: Vec<_> = manager
            .handle(&Event::of_type(EventType::DrewCard))
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_once_trigger_removed() {
        let mut manager = TriggerManager::new();
        manager.register(echo_controller(EventType::DrewCard).once());

        assert_eq!(manager.handle(&Event::of_type(EventType::DrewCard)).len(), 1);
        assert!(manager.handle(&Event::of_type(EventType::DrewCard)).is_empty());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_named_predicate() {
        let mut manager = TriggerManager::new();
        manager.register_predicate("big", |e: &Event| e.amount >= 5);
        manager.register(echo_controller(EventType::DamagedPlayer).with_condition(EventCondition::named("big")));
        manager.register(echo_controller(EventType::DamagedPlayer).with_condition(EventCondition::named("unknown")));

        let small = Event::of_type(EventType::DamagedPlayer).with_amount(2);
        let big = Event::of_type(EventType::DamagedPlayer).with_amount(7);
        assert!(manager.handle(&small).is_empty());
        assert_eq!(manager.handle(&big).len(), 1);
    }

    #[test]
    fn test_triggered_item_builder() {
        let mut manager = TriggerManager::new();
        manager.register(
            AbilityTrigger::with_command(EventType::EntersTheBattlefield, NoOp)
                .with_source("soul-warden")
                .with_controller("bob")
                .with_description("Gain 1 life"),
        );

        let items = manager.handle(&Event::new(EventType::EntersTheBattlefield, "bears", "", "alice"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].controller, PlayerId::new("bob"));
        assert_eq!(items[0].source, EntityId::new("soul-warden"));
        assert_eq!(items[0].kind, StackItemKind::TriggeredAbility);
        assert_eq!(items[0].description, "Gain 1 life");
    }

    #[test]
    fn test_remove_for_source() {
        let mut manager = TriggerManager::new();
        manager.register(echo_controller(EventType::DrewCard).with_source("a"));
        manager.register(echo_controller(EventType::SpellCast).with_source("a"));
        manager.register(echo_controller(EventType::SpellCast).with_source("b"));

        let source = EntityId::new("a");
        assert_eq!(manager.triggers_for_source(&source).count(), 2);
        assert_eq!(manager.remove_for_source(&source), 2);
        assert_eq!(manager.len(), 1);
    }
}
