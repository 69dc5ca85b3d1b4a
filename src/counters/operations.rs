//! Counter changes that announce themselves on the event bus.

use tracing::debug;

use crate::core::{EntityId, PlayerId};
use crate::events::{Event, EventBus, EventType};

use super::counter::{Counter, Counters};

/// Applies counter changes to an object and publishes the matching events.
///
/// Each method returns the events as delivered so callers can feed them to
/// the rest of the match (history, triggers).
#[derive(Clone, Copy, Debug)]
pub struct CounterOperations<'a> {
    bus: &'a EventBus,
}

impl<'a> CounterOperations<'a> {
    pub fn new(bus: &'a EventBus) -> Self {
        Self { bus }
    }

    /// Put counters on an object and publish `COUNTER_ADDED`.
    pub fn add_counter(
        &self,
        counters: &mut Counters,
        object: &EntityId,
        counter: Counter,
        controller: &PlayerId,
    ) -> Event {
        let event = Event::new(EventType::CounterAdded, object.clone(), object.clone(), controller.clone())
            .with_amount(i64::from(counter.count))
            .with_data(counter.name.clone())
            .with_metadata("counter_name", counter.name.clone())
            .with_metadata("counter_count", counter.count.to_string())
            .with_description(format!("Added {} {} counter(s) to {}", counter.count, counter.name, object));

        debug!(object = %object, counter = %counter.name, count = counter.count, "add_counter()");
        counters.add_counter(counter);
        self.bus.publish(event)
    }

    /// Take counters off an object and publish `COUNTER_REMOVED`.
    ///
    /// Returns `None` (and publishes nothing) when nothing was removed.
    pub fn remove_counter(
        &self,
        counters: &mut Counters,
        object: &EntityId,
        name: &str,
        amount: u32,
        controller: &PlayerId,
    ) -> Option<Event> {
        let removed = counters.get_count(name).min(amount);
        if !counters.remove_counter(name, amount) {
            return None;
        }

        debug!(object = %object, counter = name, removed, "remove_counter()");
        let event = Event::new(EventType::CounterRemoved, object.clone(), object.clone(), controller.clone())
            .with_amount(i64::from(removed))
            .with_data(name)
            .with_metadata("counter_name", name)
            .with_metadata("counter_count", removed.to_string())
            .with_description(format!("Removed {} {} counter(s) from {}", removed, name, object));
        Some(self.bus.publish(event))
    }

    /// Put several counters on an object: one `COUNTERS_ADDED` summary,
    /// then one `COUNTER_ADDED` per counter.
    pub fn add_counters(
        &self,
        counters: &mut Counters,
        object: &EntityId,
        added: Vec<Counter>,
        controller: &PlayerId,
    ) -> Vec<Event> {
        if added.is_empty() {
            return Vec::new();
        }
        let summary = Event::new(EventType::CountersAdded, object.clone(), object.clone(), controller.clone())
            .with_amount(added.len() as i64)
            .with_metadata("counter_count", added.len().to_string())
            .with_description(format!("Added {} counter(s) to {}", added.len(), object));

        let mut events = vec![self.bus.publish(summary)];
        for counter in added {
            events.push(self.add_counter(counters, object, counter, controller));
        }
        events
    }

    /// Take several kinds of counters off an object: one `COUNTERS_REMOVED`
    /// summary, then one `COUNTER_REMOVED` per kind actually removed.
    pub fn remove_counters(
        &self,
        counters: &mut Counters,
        object: &EntityId,
        removed: &[(String, u32)],
        controller: &PlayerId,
    ) -> Vec<Event> {
        if removed.is_empty() {
            return Vec::new();
        }
        let summary = Event::new(EventType::CountersRemoved, object.clone(), object.clone(), controller.clone())
            .with_amount(removed.len() as i64)
            .with_metadata("counter_count", removed.len().to_string())
            .with_description(format!("Removed counters from {}", object));

        let mut events = vec![self.bus.publish(summary)];
        for (name, amount) in removed {
            events.extend(self.remove_counter(counters, object, name, *amount, controller));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterType;
    use std::sync::{Arc, Mutex};

    fn capture(bus: &EventBus) -> Arc<Mutex<Vec<Event>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        seen
    }

    #[test]
    fn test_add_publishes() {
        let bus = EventBus::new();
        let seen = capture(&bus);
        let ops = CounterOperations::new(&bus);
        let mut counters = Counters::new();
        let bears = EntityId::new("bears");

        let event = ops.add_counter(&mut counters, &bears, CounterType::P1P1.create_instance(2), &PlayerId::new("alice"));

        assert_eq!(counters.get_count("+1/+1"), 2);
        assert_eq!(event.event_type, EventType::CounterAdded);
        assert_eq!(event.amount, 2);
        assert_eq!(event.data, "+1/+1");
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_reports_actual_amount() {
        let bus = EventBus::new();
        let ops = CounterOperations::new(&bus);
        let mut counters = Counters::new();
        let bears = EntityId::new("bears");
        let alice = PlayerId::new("alice");
        counters.add_counter(Counter::new("stun", 1));

        let event = ops.remove_counter(&mut counters, &bears, "stun", 3, &alice).unwrap();
        assert_eq!(event.amount, 1);
        assert!(ops.remove_counter(&mut counters, &bears, "stun", 1, &alice).is_none());
    }

    #[test]
    fn test_bulk_operations() {
        let bus = EventBus::new();
        let seen = capture(&bus);
        let ops = CounterOperations::new(&bus);
        let mut counters = Counters::new();
        let walker = EntityId::new("walker");
        let alice = PlayerId::new("alice");

        let events = ops.add_counters(
            &mut counters,
            &walker,
            vec![CounterType::Loyalty.create_instance(3), CounterType::Shield.create_instance(1)],
            &alice,
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event_type, EventType::CountersAdded);

        let events = ops.remove_counters(
            &mut counters,
            &walker,
            &[("loyalty".to_string(), 1), ("oil".to_string(), 1)],
            &alice,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(counters.get_count("loyalty"), 2);
        assert_eq!(seen.lock().unwrap().len(), 5);
    }
}
