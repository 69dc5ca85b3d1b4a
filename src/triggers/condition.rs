//! Trigger conditions.
//!
//! Conditions decide whether a trigger whose event type matched should
//! actually fire. They are plain data so content can be inspected and
//! serialized; the [`EventCondition::Custom`] escape hatch wraps a closure
//! for anything the built-in filters cannot express.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameStateAccessor, PlayerId, Zone};
use crate::events::Event;

/// Closure predicate over an event.
#[derive(Clone)]
pub struct EventPredicate(pub Arc<dyn Fn(&Event) -> bool + Send + Sync>);

impl EventPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn test(&self, event: &Event) -> bool {
        (self.0)(event)
    }
}

impl std::fmt::Debug for EventPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventPredicate(..)")
    }
}

/// A condition checked against the triggering event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EventCondition {
    /// Always matches.
    Always,

    /// Never matches (disabled trigger).
    Never,

    // === Event fields ===

    /// Metadata `key` equals `value`.
    MetadataEquals { key: String, value: String },

    /// Metadata `key` is present.
    HasMetadata(String),

    ControllerIs(PlayerId),

    /// The player the event is about.
    PlayerIs(PlayerId),

    SourceIs(EntityId),

    TargetIs(EntityId),

    AmountAtLeast(i64),

    AmountAtMost(i64),

    FlagIs(bool),

    // === Match state ===

    /// The event's source is controlled by this player.
    SourceControlledBy(PlayerId),

    /// The event's target is in this zone.
    TargetInZone(Zone),

    // === Combinators ===

    All(Vec<EventCondition>),

    Any(Vec<EventCondition>),

    Not(Box<EventCondition>),

    // === Content ===

    /// A predicate registered by name on the trigger manager.
    Named(String),

    /// A closure. Not serializable.
    #[serde(skip)]
    Custom(EventPredicate),
}

impl EventCondition {
    /// Create a metadata equality condition.
    pub fn metadata_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MetadataEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn controller_is(player: impl Into<PlayerId>) -> Self {
        Self::ControllerIs(player.into())
    }

    pub fn source_is(source: impl Into<EntityId>) -> Self {
        Self::SourceIs(source.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wrap a closure as a condition.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Self::Custom(EventPredicate::new(f))
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = EventCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = EventCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: EventCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: EventCondition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
pub struct ConditionContext<'a> {
    /// The event being checked.
    pub event: &'a Event,
    /// Match state, when the caller has one.
    pub state: Option<&'a dyn GameStateAccessor>,
    /// Lookup for [`EventCondition::Named`] predicates.
    pub named: Option<&'a dyn Fn(&str, &Event) -> bool>,
}

impl<'a> ConditionContext<'a> {
    pub fn new(event: &'a Event) -> Self {
        Self {
            event,
            state: None,
            named: None,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: &'a dyn GameStateAccessor) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn with_named(mut self, named: &'a dyn Fn(&str, &Event) -> bool) -> Self {
        self.named = Some(named);
        self
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    ///
    /// Conditions that need match state or a named predicate fail when the
    /// context has none.
    pub fn evaluate(condition: &EventCondition, ctx: &ConditionContext<'_>) -> bool {
        let event = ctx.event;
        match condition {
            EventCondition::Always => true,

            EventCondition::Never => false,

            EventCondition::MetadataEquals { key, value } => event.metadata(key) == Some(value.as_str()),

            EventCondition::HasMetadata(key) => event.metadata(key).is_some(),

            EventCondition::ControllerIs(player) => &event.controller == player,

            EventCondition::PlayerIs(player) => &event.player == player,

            EventCondition::SourceIs(entity) => &event.source == entity,

            EventCondition::TargetIs(entity) => &event.target == entity,

            EventCondition::AmountAtLeast(min) => event.amount >= *min,

            EventCondition::AmountAtMost(max) => event.amount <= *max,

            EventCondition::FlagIs(flag) => event.flag == *flag,

            EventCondition::SourceControlledBy(player) => ctx
                .state
                .and_then(|state| state.find_card(&event.source))
                .is_some_and(|card| &card.controller == player),

            EventCondition::TargetInZone(zone) => ctx
                .state
                .is_some_and(|state| state.is_card_in_zone(&event.target, *zone)),

            EventCondition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            EventCondition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),

            EventCondition::Not(inner) => !Self::evaluate(inner, ctx),

            EventCondition::Named(name) => ctx.named.is_some_and(|named| named(name.as_str(), event)),

            EventCondition::Custom(predicate) => predicate.test(event),
        }
    }
}
