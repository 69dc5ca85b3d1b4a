//! Trigger system for event-driven abilities.
//!
//! Triggers let cards respond to events by putting abilities on the stack.
//!
//! ## Key Components
//!
//! - [`EventCondition`]: Inspectable filter over the triggering event
//! - [`AbilityTrigger`]: Event type + optional condition + item builder
//! - [`TriggerManager`]: Storage, lookup and firing
//!
//! ## Design
//!
//! The manager indexes triggers by event type. When several triggers match
//! one event they fire in registration order, so the resulting stack
//! items are deterministic; ordering them for APNAP purposes is the
//! caller's business.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::events::{Event, EventType};
//! use ccg_rules::stack::{StackItem, StackItemKind};
//! use ccg_rules::triggers::{AbilityTrigger, EventCondition, TriggerManager};
//!
//! let mut triggers = TriggerManager::new();
//! triggers.register(
//!     AbilityTrigger::new(EventType::SpellCast, |_: &AbilityTrigger, event: &Event| {
//!         StackItem::new("", event.controller.clone(), StackItemKind::TriggeredAbility)
//!             .with_description("Deal 3 damage")
//!     })
//!     .with_condition(EventCondition::metadata_equals("card_name", "Lightning Bolt")),
//! );
//!
//! let cast = Event::new(EventType::SpellCast, "bolt", "bolt", "Alice")
//!     .with_metadata("card_name", "Lightning Bolt");
//! let items = triggers.handle(&cast);
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].controller.as_str(), "Alice");
//! ```

mod condition;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, EventCondition, EventPredicate};
pub use registry::{AbilityTrigger, StackItemBuilder, TriggerId, TriggerManager, TriggeredItem};
