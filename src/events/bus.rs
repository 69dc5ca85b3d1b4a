//! Synchronous publish/subscribe dispatch.
//!
//! ## Dispatch Order
//!
//! `publish` delivers to every all-events listener (in subscription
//! order), then to every listener registered for the event's type (in
//! subscription order), and returns only after all of them have run.
//!
//! ## Reentrancy
//!
//! The listener set is snapshotted under the read lock and the lock is
//! released before any callback runs. A callback may therefore publish,
//! subscribe or unsubscribe; changes to the listener set take effect from
//! the next `publish`.
//!
//! The bus does no error handling of its own. A listener that can fail
//! must contain its failure.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::event::{Event, EventType};

/// Callback invoked for a published event.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionHandle(pub u64);

impl SubscriptionHandle {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

#[derive(Default)]
struct Listeners {
    generic: BTreeMap<SubscriptionHandle, Listener>,
    typed: FxHashMap<EventType, Vec<(SubscriptionHandle, Listener)>>,
}

/// Event dispatcher shared by every component of a match.
pub struct EventBus {
    listeners: RwLock<Listeners>,
    next_handle: AtomicU64,
    clock: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("clock", &self.clock.load(Ordering::Relaxed))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Listeners::default()),
            next_handle: AtomicU64::new(0),
            clock: AtomicU64::new(0),
        }
    }

    fn allocate_handle(&self) -> SubscriptionHandle {
        SubscriptionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Listen to every event.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionHandle
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handle = self.allocate_handle();
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.generic.insert(handle, Arc::new(listener));
        handle
    }

    /// Listen to events of one type.
    pub fn subscribe_typed<F>(&self, event_type: EventType, listener: F) -> SubscriptionHandle
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handle = self.allocate_handle();
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners
            .typed
            .entry(event_type)
            .or_default()
            .push((handle, Arc::new(listener)));
        handle
    }

    /// Remove a listener of either kind.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.generic.remove(&handle);
        Self::remove_typed(&mut listeners, handle);
    }

    /// Remove a typed listener. All-events listeners are left alone.
    pub fn unsubscribe_typed(&self, handle: SubscriptionHandle) {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        Self::remove_typed(&mut listeners, handle);
    }

    fn remove_typed(listeners: &mut Listeners, handle: SubscriptionHandle) {
        listeners.typed.retain(|_, list| {
            list.retain(|(h, _)| *h != handle);
            !list.is_empty()
        });
    }

    /// Stamp an event with an id and logical timestamp if it has none.
    pub fn stamp(&self, event: &mut Event) {
        if event.timestamp == 0 {
            event.timestamp = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        }
        if event.id.is_empty() {
            event.id = format!("evt-{}", event.timestamp);
        }
    }

    /// Deliver an event to all matching listeners. Returns the event as delivered.
    pub fn publish(&self, mut event: Event) -> Event {
        self.stamp(&mut event);

        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            let typed = listeners
                .typed
                .get(&event.event_type)
                .into_iter()
                .flatten()
                .map(|(_, l)| Arc::clone(l));
            listeners
                .generic
                .values()
                .map(Arc::clone)
                .chain(typed)
                .collect()
        };

        trace!(event = %event.event_type, id = %event.id, listeners = snapshot.len(), "publish");
        for listener in &snapshot {
            listener(&event);
        }
        event
    }

    /// Publish several events in order.
    pub fn publish_batch(&self, events: impl IntoIterator<Item = Event>) -> Vec<Event> {
        events.into_iter().map(|event| self.publish(event)).collect()
    }

    /// Number of registered listeners of both kinds.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        listeners.generic.len() + listeners.typed.values().map(Vec::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Event) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for = {
            let log = Arc::clone(&log);
            move |tag: &str| {
                let log = Arc::clone(&log);
                let tag = tag.to_string();
                Box::new(move |e: &Event| {
                    log.lock().unwrap().push(format!("{}:{}", tag, e.event_type));
                }) as Box<dyn Fn(&Event) + Send + Sync>
            }
        };
        (log, log_for)
    }

    #[test]
    fn test_generic_then_typed() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        bus.subscribe_typed(EventType::SpellCast, make("typed"));
        bus.subscribe(make("all"));

        bus.publish(Event::of_type(EventType::SpellCast));
        bus.publish(Event::of_type(EventType::DrewCard));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["all:SPELL_CAST", "typed:SPELL_CAST", "all:DREW_CARD"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let (log, make) = recorder();

        let all = bus.subscribe(make("all"));
        let typed = bus.subscribe_typed(EventType::Tapped, make("typed"));
        assert_eq!(bus.listener_count(), 2);

        bus.unsubscribe_typed(all);
        assert_eq!(bus.listener_count(), 2);

        bus.unsubscribe(typed);
        bus.unsubscribe(all);
        assert_eq!(bus.listener_count(), 0);

        bus.publish(Event::of_type(EventType::Tapped));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_subscribe_during_publish_takes_effect_later() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(Mutex::new(0));

        {
            let bus_inner = Arc::clone(&bus);
            let count = Arc::clone(&count);
            bus.subscribe(move |_| {
                let count = Arc::clone(&count);
                bus_inner.subscribe(move |_| *count.lock().unwrap() += 1);
            });
        }

        bus.publish(Event::of_type(EventType::BeginTurn));
        assert_eq!(*count.lock().unwrap(), 0);

        bus.publish(Event::of_type(EventType::BeginTurn));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_publish_from_listener() {
        let bus = Arc::new(EventBus::new());
        let (log, make) = recorder();
        {
            let inner = Arc::clone(&bus);
            bus.subscribe_typed(EventType::CastSpell, move |e| {
                inner.publish(Event::new(EventType::SpellCast, e.target.clone(), e.source.clone(), e.controller.clone()));
            });
        }
        bus.subscribe_typed(EventType::SpellCast, make("cast"));

        bus.publish(Event::of_type(EventType::CastSpell));
        assert_eq!(*log.lock().unwrap(), vec!["cast:SPELL_CAST"]);
    }

    #[test]
    fn test_stamping() {
        let bus = EventBus::new();
        let first = bus.publish(Event::of_type(EventType::Tap));
        let second = bus.publish(Event::of_type(EventType::Untap));
        assert!(second.timestamp > first.timestamp);
        assert_ne!(first.id, second.id);

        let explicit = bus.publish(Event::of_type(EventType::Tap).with_id("mine"));
        assert_eq!(explicit.id, "mine");
    }

    #[test]
    fn test_publish_batch() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(make("all"));

        let delivered = bus.publish_batch(vec![
            Event::of_type(EventType::DamagedPermanent),
            Event::of_type(EventType::DamagedBatchForPermanents),
        ]);
        assert_eq!(delivered.len(), 2);
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
