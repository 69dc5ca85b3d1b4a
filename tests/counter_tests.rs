//! Counter integration tests.
//!
//! Property tests cover counter arithmetic and the boost name grammar;
//! the rest checks counters through a match engine.

use ccg_rules::core::{EntityId, PlayerId, RulesConfig};
use ccg_rules::counters::{boost_name, parse_boost_name, BoostCounter, Counter, CounterType, Counters};
use ccg_rules::engine::MatchEngine;
use ccg_rules::events::EventType;
use proptest::prelude::*;

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// Adding counters of one name sums their counts.
    #[test]
    fn prop_counts_sum(counts in prop::collection::vec(1i64..1000, 1..20)) {
        let mut counters = Counters::new();
        for &count in &counts {
            counters.add_counter(Counter::new("charge", count));
        }
        let expected: i64 = counts.iter().sum();
        prop_assert_eq!(i64::from(counters.get_count("charge")), expected);
        prop_assert_eq!(counters.get_all().len(), 1);
    }

    /// Removing floors at zero and never leaves an empty entry.
    #[test]
    fn prop_remove_floors_at_zero(added in 1i64..100, removed in 0u32..200) {
        let mut counters = Counters::new();
        counters.add_counter(Counter::new("time", added));
        counters.remove_counter("time", removed);

        let left = u32::try_from(added).unwrap().saturating_sub(removed);
        prop_assert_eq!(counters.get_count("time"), left);
        prop_assert_eq!(counters.has_counter("time"), left > 0);
        prop_assert!(counters.iter().all(|c| c.count > 0));
    }

    /// Every power/toughness pair has one canonical name that parses back.
    #[test]
    fn prop_boost_names_parse_back(power in -50i32..50, toughness in -50i32..50) {
        let name = boost_name(power, toughness);
        prop_assert_eq!(parse_boost_name(&name), Some((power, toughness)));
        prop_assert!(name.starts_with('+') || name.starts_with('-'));
    }
}

// =============================================================================
// Boost Tests
// =============================================================================

/// Test that boost totals combine opposing modifiers.
#[test]
fn test_boost_totals() {
    let mut counters = Counters::new();
    counters.add_counter(BoostCounter::new(1, 1, 3).into());
    counters.add_counter(CounterType::M1M1.create_instance(1));
    counters.add_counter(Counter::new("+0/+2", 1));
    counters.add_counter(Counter::new("charge", 4));

    assert_eq!(counters.boost_counters().len(), 3);
    assert_eq!(counters.boost_totals(), (2, 4));
}

/// Test that names outside the grammar are not boosts.
#[test]
fn test_non_boost_names() {
    for name in ["charge", "+1", "+1/", "/+1", "+a/+1", "1/1/1"] {
        assert_eq!(parse_boost_name(name), None, "{name}");
    }
}

// =============================================================================
// Engine Tests
// =============================================================================

/// Test that counters placed through the engine are published and kept
/// per object.
#[test]
fn test_engine_counters_publish() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    let bears = EntityId::new("bears");
    let alice = PlayerId::new("alice");

    engine.add_counter(&bears, CounterType::P1P1.create_instance(2), &alice);
    let removed = engine.remove_counter(&bears, "+1/+1", 5, &alice).unwrap();

    assert_eq!(removed.event_type, EventType::CounterRemoved);
    assert_eq!(removed.amount, 2);
    assert!(engine.counters(&bears).unwrap().is_empty());
    assert!(engine.remove_counter(&bears, "+1/+1", 1, &alice).is_none());

    let types: Vec<EventType> = engine.history().iter().map(|e| e.event_type).collect();
    assert_eq!(types, vec![EventType::CounterAdded, EventType::CounterRemoved]);
}
