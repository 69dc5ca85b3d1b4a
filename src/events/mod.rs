//! Event records and the synchronous event bus.
//!
//! Every rule-applying operation describes what it did as an [`Event`].
//! Watchers, triggers and the match history all learn about the game
//! through the [`EventBus`].

pub mod event;
pub mod bus;

pub use event::{Event, EventTargets, EventType, UnknownEventType};
pub use bus::{EventBus, Listener, SubscriptionHandle};
