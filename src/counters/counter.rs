//! Named counters on game objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::boost::{parse_boost_name, BoostCounter};

/// A named counter with a positive count.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub count: u32,
}

impl Counter {
    /// Create a counter. A non-positive count is normalized to 1.
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count: normalize(count),
        }
    }

    pub fn add(&mut self, amount: u32) {
        self.count = self.count.saturating_add(amount);
    }

    /// Remove up to `amount`, flooring at zero.
    pub fn remove(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
    }

    /// Read this counter as a power/toughness modifier, if its name is one.
    #[must_use]
    pub fn as_boost(&self) -> Option<BoostCounter> {
        parse_boost_name(&self.name).map(|(power, toughness)| BoostCounter {
            power,
            toughness,
            count: self.count,
        })
    }
}

pub(crate) fn normalize(count: i64) -> u32 {
    if count <= 0 {
        1
    } else {
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// All counters on one object, keyed by name.
///
/// Adding a counter whose name is already present sums the counts.
/// Removing floors at zero and drops the entry when it reaches zero, so
/// every stored counter has a positive count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    counters: BTreeMap<String, Counter>,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_counter(&mut self, counter: Counter) {
        match self.counters.get_mut(&counter.name) {
            Some(existing) => existing.add(counter.count),
            None => {
                self.counters.insert(counter.name.clone(), counter);
            }
        }
    }

    /// Remove `amount` counters of a kind.
    ///
    /// Returns true if the object had that counter and `amount` is positive.
    pub fn remove_counter(&mut self, name: &str, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        let Some(counter) = self.counters.get_mut(name) else {
            return false;
        };
        counter.remove(amount);
        if counter.count == 0 {
            self.counters.remove(name);
        }
        true
    }

    #[must_use]
    pub fn get_count(&self, name: &str) -> u32 {
        self.counters.get(name).map_or(0, |c| c.count)
    }

    #[must_use]
    pub fn has_counter(&self, name: &str) -> bool {
        self.get_count(name) > 0
    }

    /// Sum of every count, saturating at `u32::MAX`.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.counters.values().fold(0, |total, c| total.saturating_add(c.count))
    }

    /// Snapshot of every counter, sorted by name.
    #[must_use]
    pub fn get_all(&self) -> Vec<Counter> {
        self.counters.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Counter> {
        self.counters.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Every counter whose name is a power/toughness modifier.
    ///
    /// Counters with other names are skipped.
    #[must_use]
    pub fn boost_counters(&self) -> Vec<BoostCounter> {
        self.counters.values().filter_map(Counter::as_boost).collect()
    }

    /// Net power/toughness change from all boost counters.
    #[must_use]
    pub fn boost_totals(&self) -> (i64, i64) {
        self.boost_counters().iter().fold((0, 0), |(p, t), b| {
            (
                p + i64::from(b.power) * i64::from(b.count),
                t + i64::from(b.toughness) * i64::from(b.count),
            )
        })
    }
}
