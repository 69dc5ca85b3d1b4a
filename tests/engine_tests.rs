//! Match engine and worker integration tests.
//!
//! These tests play short sequences of a match: casting, paying, choosing,
//! special actions, and the async worker that owns a match.

use ccg_rules::core::{PlayerId, RulesConfig};
use ccg_rules::engine::{MatchEngine, MatchWorker, PriorityOutcome, ResolveOutcome};
use ccg_rules::error::RulesError;
use ccg_rules::events::{Event, EventType};
use ccg_rules::mana::{ManaAbility, ManaAbilityManager};
use ccg_rules::payment::{Choice, ChoiceType, Cost, CostType, PaymentState};
use ccg_rules::priority::{PriorityWindow, SpecialAction, SpecialActionType};
use ccg_rules::stack::{command_fn, CommandContext, StackItem};
use ccg_rules::turn::Step;

fn pid(name: &str) -> PlayerId {
    PlayerId::new(name)
}

fn engine() -> MatchEngine {
    MatchEngine::new(["alice", "bob"], RulesConfig::default())
}

fn to_main_phase(engine: &mut MatchEngine) {
    while engine.turns().current_step() != Step::Main1 {
        engine.advance_step();
    }
}

// =============================================================================
// Casting Flow Tests
// =============================================================================

/// Test a cast from payment to resolution: costs are paid with a mana
/// ability, the payment closes, both players pass and the spell resolves.
#[test]
fn test_cast_pay_and_resolve() {
    let mut engine = engine();
    engine
        .mana()
        .register(ManaAbility::new("mountain-r", "mountain", "alice", |_: &ManaAbilityManager| Ok(())));
    let alice = pid("alice");

    engine
        .begin_payment(PaymentState::new("bolt", "alice", vec![Cost::mana(1, "{R}")]))
        .unwrap();
    assert!(matches!(
        engine.begin_payment(PaymentState::new("shock", "alice", vec![])),
        Err(RulesError::PaymentInProgress(_))
    ));

    engine.activate_mana_ability(&alice, "mountain-r").unwrap();
    let payment = engine.payments_mut().active_mut().unwrap();
    payment.pay_mana(1);
    assert!(payment.is_cost_paid(CostType::Mana));
    assert!(payment.is_fully_paid());

    let paid = engine.end_payment("bolt").unwrap();
    assert_eq!(paid.total_mana_paid(), 1);
    assert_eq!(engine.payments().history(), ["bolt".to_string()]);

    engine.push(StackItem::spell("bolt", "alice", "bolt"));
    engine.pass_priority(&alice).unwrap();
    assert_eq!(
        engine.pass_priority(&pid("bob")).unwrap(),
        PriorityOutcome::Resolved(ResolveOutcome::Resolved { id: "bolt".into() })
    );
}

/// Test that a resolving spell can queue a choice and the answer is
/// validated against its options.
#[test]
fn test_resolution_queues_choice() {
    let mut engine = engine();
    engine.push(
        StackItem::spell("charm", "alice", "charm").with_command(command_fn("choose_mode", |ctx: &mut CommandContext<'_>| {
            let controller = ctx.item().controller.clone();
            ctx.choices().add_choice(
                Choice::new(ChoiceType::Mode, controller, "Choose one").with_options(["damage", "draw", "bounce"]),
            );
            Ok(())
        })),
    );
    engine.resolve_top().unwrap();
    assert_eq!(engine.view().pending_choices, 1);

    let choices = engine.choices_mut();
    let choice = choices.next_choice().unwrap();
    assert_eq!(choice.player, pid("alice"));
    assert!(matches!(
        choices.make_choice(vec!["discard".into()]),
        Err(RulesError::InvalidChoice(_))
    ));
    let made = choices.make_choice(vec!["draw".into()]).unwrap();
    assert_eq!(made.result, vec!["draw".to_string()]);
    assert_eq!(engine.view().pending_choices, 0);
}

// =============================================================================
// Special Action Tests
// =============================================================================

/// Test that playing a land needs the player's own main phase with an
/// empty stack.
#[test]
fn test_play_land_timing() {
    let mut engine = engine();
    let land = SpecialAction::new(SpecialActionType::PlayLand, "alice", "forest");
    to_main_phase(&mut engine);

    engine.push(StackItem::spell("bolt", "alice", "bolt"));
    assert!(matches!(
        engine.take_special_action(&land),
        Err(RulesError::SpecialActionNotAllowed { .. })
    ));

    engine.resolve_top().unwrap();
    engine.take_special_action(&land).unwrap();
    assert_eq!(engine.special_actions().taken_this_turn(&pid("alice"), SpecialActionType::PlayLand), 1);

    let taken = engine.history().last().unwrap();
    assert_eq!(taken.event_type, EventType::TakenSpecialAction);
    assert_eq!(taken.data, "PLAY_LAND");
}

/// Test that a companion can be put into hand only once per game.
#[test]
fn test_companion_once_per_game() {
    let mut engine = engine();
    let companion = SpecialAction::new(SpecialActionType::Companion, "alice", "lurrus");
    to_main_phase(&mut engine);

    engine.take_special_action(&companion).unwrap();
    for _ in 0..24 {
        engine.advance_step();
    }
    to_main_phase(&mut engine);
    assert_eq!(engine.turns().turn_number(), 3);

    let err = engine.take_special_action(&companion).unwrap_err();
    assert!(err.to_string().contains("already taken this game"));
}

/// Test that a failing special action records nothing.
#[test]
fn test_failed_special_action_not_recorded() {
    let mut engine = engine();
    let action = SpecialAction::new(SpecialActionType::TurnFaceUp, "alice", "morph")
        .with_execute(|| Err(RulesError::content("no morph cost paid")));

    assert!(engine.take_special_action(&action).is_err());
    assert_eq!(
        engine.special_actions().taken_this_turn(&pid("alice"), SpecialActionType::TurnFaceUp),
        0
    );
    assert!(engine.history().is_empty());
}

/// Test that a priority window without special actions blocks them.
#[test]
fn test_window_blocks_special_actions() {
    let mut engine = engine();
    let morph = SpecialAction::new(SpecialActionType::TurnFaceUp, "alice", "morph");

    engine
        .windows_mut()
        .open_window(PriorityWindow::mana_payment("alice", "bolt"))
        .unwrap();
    assert!(engine.take_special_action(&morph).is_err());

    engine.windows_mut().close_window();
    engine
        .windows_mut()
        .open_window(PriorityWindow::special_action("alice", "morph"))
        .unwrap();
    engine.take_special_action(&morph).unwrap();
}

// =============================================================================
// View Tests
// =============================================================================

/// Test that the view serializes the visible match state.
#[test]
fn test_view_serializes() {
    let mut engine = engine();
    engine.push(StackItem::spell("bolt", "alice", "bolt").with_description("Lightning Bolt deals 3 damage"));
    engine
        .begin_payment(PaymentState::new("bolt", "alice", vec![Cost::mana(1, "{R}")]))
        .unwrap();

    let json = serde_json::to_value(engine.view()).unwrap();
    assert_eq!(json["stack"][0]["description"], "Lightning Bolt deals 3 damage");
    assert_eq!(json["turn"]["step"], "UNTAP");
    assert_eq!(json["priority_player"], "alice");
    assert_eq!(json["payment"]["id"], "bolt");
    assert!(json["window"].is_null());
}

// =============================================================================
// Worker Tests
// =============================================================================

/// Test that a worker applies intents in order and hands the engine back
/// once every handle is gone.
#[tokio::test]
async fn test_worker_round_trip() {
    let (handle, join) = MatchWorker::spawn(engine());
    let other = handle.clone();

    handle.push(StackItem::spell("bolt", "alice", "bolt")).await.unwrap();
    other.pass_priority("alice").await.unwrap();
    let outcome = handle.pass_priority("bob").await.unwrap();
    assert!(matches!(outcome, PriorityOutcome::Resolved(_)));

    let published = handle
        .publish(Event::new(EventType::SpellCast, "shock", "shock", "bob"))
        .await
        .unwrap();
    assert!(published.timestamp > 0);

    let state = handle.advance_step().await.unwrap();
    assert_eq!(state.step, Step::Upkeep);
    assert_eq!(handle.snapshot().turn.step, Step::Upkeep);

    drop(handle);
    drop(other);
    let engine = join.await.unwrap();
    assert!(engine
        .history()
        .iter()
        .any(|e| e.event_type == EventType::StackItemResolved));
}

/// Test that separate matches run independently on one runtime.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_matches() {
    let mut tasks = Vec::new();
    for n in 0..4 {
        tasks.push(tokio::spawn(async move {
            let (handle, _join) = MatchWorker::spawn(MatchEngine::new(["alice", "bob"], RulesConfig::default()));
            for i in 0..=n {
                handle
                    .push(StackItem::spell(format!("spell-{i}"), "alice", ""))
                    .await
                    .unwrap();
            }
            handle.view().await.unwrap().stack.len()
        }));
    }

    let mut sizes = Vec::new();
    for task in tasks {
        sizes.push(task.await.unwrap());
    }
    assert_eq!(sizes, vec![1, 2, 3, 4]);
}

/// Test that errors from the engine reach the caller and leave the
/// worker running.
#[tokio::test]
async fn test_worker_survives_errors() {
    let (handle, _join) = MatchWorker::spawn(engine());
    let bad = handle.activate_mana("alice", "missing").await.unwrap_err();
    assert!(matches!(bad, RulesError::ManaAbilityNotFound(_)));

    let view = handle.view().await.unwrap();
    assert!(view.stack.is_empty());
    assert!(view.history.is_empty());
}
