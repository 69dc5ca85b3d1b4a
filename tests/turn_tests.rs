//! Turn structure and priority integration tests.

use ccg_rules::core::{PlayerId, RulesConfig};
use ccg_rules::engine::{MatchEngine, PriorityOutcome, ResolveOutcome};
use ccg_rules::error::RulesError;
use ccg_rules::events::EventType;
use ccg_rules::stack::{command_fn, CommandContext, StackItem};
use ccg_rules::turn::{Phase, Step, TurnManager, BASE_SEQUENCE};

fn pid(name: &str) -> PlayerId {
    PlayerId::new(name)
}

// =============================================================================
// Turn Sequence Tests
// =============================================================================

/// Test the full turn: eleven advances stay on turn 1, the twelfth
/// starts turn 2 with the new active player holding priority.
#[test]
fn test_turn_sequence_and_rotation() {
    let mut turns = TurnManager::new("Alice");
    let mut visited = vec![(turns.current_phase(), turns.current_step())];
    for _ in 0..11 {
        visited.push(turns.advance_step(""));
    }
    assert_eq!(visited, BASE_SEQUENCE.to_vec());
    assert_eq!(turns.turn_number(), 1);
    assert_eq!(turns.current_step(), Step::Cleanup);

    assert_eq!(turns.advance_step("Bob"), (Phase::Beginning, Step::Untap));
    assert_eq!(turns.turn_number(), 2);
    assert_eq!(turns.active_player(), &pid("Bob"));
    assert_eq!(turns.priority_player(), &pid("Bob"));
}

/// Test that the first-strike step sits between blockers and regular
/// damage and disappears at the next turn.
#[test]
fn test_first_strike_step() {
    let mut turns = TurnManager::new("Alice");
    turns.set_has_first_strike(true);

    let mut steps = vec![turns.current_step()];
    for _ in 0..12 {
        steps.push(turns.advance_step("Bob").1);
    }
    assert_eq!(
        &steps[6..9],
        &[Step::DeclareBlockers, Step::FirstStrikeDamage, Step::CombatDamage]
    );
    assert_eq!(steps[12], Step::Cleanup);
    assert!(turns.turn_state().has_first_strike);

    turns.advance_step("Bob");
    assert_eq!(turns.turn_number(), 2);
    assert!(!turns.has_first_strike());
    assert_eq!(turns.sequence().len(), 12);
}

/// Test the events announcing each step through a whole turn.
#[test]
fn test_step_events_through_engine() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    for _ in 0..12 {
        engine.advance_step();
    }

    let changes = engine
        .history()
        .iter()
        .filter(|e| e.event_type == EventType::ChangeStep)
        .count();
    assert_eq!(changes, 12);

    let phases: Vec<EventType> = engine
        .history()
        .iter()
        .map(|e| e.event_type)
        .filter(|t| {
            matches!(
                t,
                EventType::BeginningPhase
                    | EventType::PrecombatMainPhase
                    | EventType::CombatPhase
                    | EventType::PostcombatMainPhase
                    | EventType::EndPhase
            )
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            EventType::PrecombatMainPhase,
            EventType::CombatPhase,
            EventType::PostcombatMainPhase,
            EventType::EndPhase,
            EventType::BeginningPhase,
        ]
    );

    let untap = engine.history().last().unwrap();
    assert_eq!(untap.event_type, EventType::UntapStep);
    assert_eq!(untap.player, pid("bob"));
    assert_eq!(untap.amount, 2);
}

// =============================================================================
// Priority Tests
// =============================================================================

/// Test that every player passing in succession resolves the top item,
/// and that priority returns to the active player afterwards.
#[test]
fn test_all_pass_resolves_top() {
    let mut engine = MatchEngine::new(["alice", "bob", "carol"], RulesConfig::default());
    engine.push(StackItem::spell("bolt", "bob", "bolt"));
    assert_eq!(engine.priority().priority_player(), Some(&pid("bob")));

    assert_eq!(
        engine.pass_priority(&pid("bob")).unwrap(),
        PriorityOutcome::Passed { next: pid("carol") }
    );
    assert_eq!(
        engine.pass_priority(&pid("carol")).unwrap(),
        PriorityOutcome::Passed { next: pid("alice") }
    );
    assert_eq!(
        engine.pass_priority(&pid("alice")).unwrap(),
        PriorityOutcome::Resolved(ResolveOutcome::Resolved { id: "bolt".into() })
    );
    assert_eq!(engine.priority().priority_player(), Some(&pid("alice")));
}

/// Test that pushing an item resets the passes already made.
#[test]
fn test_response_resets_passes() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    engine.push(StackItem::spell("bolt", "alice", "bolt"));
    engine.pass_priority(&pid("alice")).unwrap();

    engine.push(StackItem::spell("counterspell", "bob", "counterspell"));
    assert_eq!(engine.priority().consecutive_passes(), 0);

    engine.pass_priority(&pid("bob")).unwrap();
    let outcome = engine.pass_priority(&pid("alice")).unwrap();
    assert_eq!(
        outcome,
        PriorityOutcome::Resolved(ResolveOutcome::Resolved {
            id: "counterspell".into()
        })
    );
    assert_eq!(engine.stack().len(), 1);
}

/// Test that a failed resolution restarts passing, so the next item
/// waits for every player to pass again.
#[test]
fn test_failed_resolution_resets_passes() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    engine.push(StackItem::spell("bottom", "alice", "bottom"));
    engine.push(StackItem::spell("bad", "alice", "bad").with_command(command_fn(
        "fizzle",
        |_: &mut CommandContext<'_>| Err(RulesError::content("boom")),
    )));

    engine.pass_priority(&pid("alice")).unwrap();
    let err = engine.pass_priority(&pid("bob")).unwrap_err();
    assert!(matches!(err, RulesError::ResolutionFailed { ref id, .. } if id == "bad"));

    assert_eq!(engine.priority().consecutive_passes(), 0);
    assert_eq!(engine.priority().priority_player(), Some(&pid("alice")));
    assert!(matches!(
        engine.pass_priority(&pid("bob")),
        Err(RulesError::NotPriorityPlayer(_))
    ));

    assert_eq!(
        engine.pass_priority(&pid("alice")).unwrap(),
        PriorityOutcome::Passed { next: pid("bob") }
    );
    assert_eq!(engine.stack().len(), 1);
    assert_eq!(
        engine.pass_priority(&pid("bob")).unwrap(),
        PriorityOutcome::Resolved(ResolveOutcome::Resolved { id: "bottom".into() })
    );
}

/// Test that passing on an empty stack moves the match on a step.
#[test]
fn test_all_pass_on_empty_stack_advances() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    engine.pass_priority(&pid("alice")).unwrap();
    let outcome = engine.pass_priority(&pid("bob")).unwrap();

    match outcome {
        PriorityOutcome::StepAdvanced(state) => {
            assert_eq!(state.step, Step::Upkeep);
            assert_eq!(state.priority_player, pid("alice"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// Test that only the priority holder may pass.
#[test]
fn test_pass_out_of_turn() {
    let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
    let err = engine.pass_priority(&pid("bob")).unwrap_err();
    assert!(matches!(err, RulesError::NotPriorityPlayer(p) if p == pid("bob")));
}

/// Test that a player who left is skipped for priority and turns.
#[test]
fn test_removed_player_skipped() {
    let mut engine = MatchEngine::new(["alice", "bob", "carol"], RulesConfig::default());
    engine.remove_player(&pid("bob"));

    assert_eq!(
        engine.pass_priority(&pid("alice")).unwrap(),
        PriorityOutcome::Passed { next: pid("carol") }
    );
    assert!(matches!(
        engine.pass_priority(&pid("carol")).unwrap(),
        PriorityOutcome::StepAdvanced(_)
    ));

    for _ in 0..11 {
        engine.advance_step();
    }
    assert_eq!(engine.turns().turn_number(), 2);
    assert_eq!(engine.turns().active_player(), &pid("carol"));
}
