//! The turn state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PlayerId;
use crate::events::{Event, EventType};

use super::phase::{Phase, Step, BASE_SEQUENCE};

/// Serializable snapshot of where the match is in its turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub priority_player: PlayerId,
    pub phase: Phase,
    pub step: Step,
    pub has_first_strike: bool,
}

/// Tracks turn number, active and priority player, and the current step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnManager {
    sequence: Vec<(Phase, Step)>,
    index: usize,
    turn_number: u32,
    active_player: PlayerId,
    priority_player: PlayerId,
}

impl TurnManager {
    /// Start turn 1 at the untap step with `active_player` holding priority.
    pub fn new(active_player: impl Into<PlayerId>) -> Self {
        let active = active_player.into();
        Self {
            sequence: BASE_SEQUENCE.to_vec(),
            index: 0,
            turn_number: 1,
            priority_player: active.clone(),
            active_player: active,
        }
    }

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.sequence[self.index].0
    }

    #[must_use]
    pub fn current_step(&self) -> Step {
        self.sequence[self.index].1
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn active_player(&self) -> &PlayerId {
        &self.active_player
    }

    #[must_use]
    pub fn priority_player(&self) -> &PlayerId {
        &self.priority_player
    }

    pub fn set_priority(&mut self, player: impl Into<PlayerId>) {
        self.priority_player = player.into();
    }

    #[must_use]
    pub fn has_first_strike(&self) -> bool {
        self.sequence.contains(&(Phase::Combat, Step::FirstStrikeDamage))
    }

    /// Steps of the current turn, in order.
    #[must_use]
    pub fn sequence(&self) -> &[(Phase, Step)] {
        &self.sequence
    }

    /// Add or remove the first-strike damage step before combat damage.
    ///
    /// Setting the current value again changes nothing. The cursor stays
    /// on the same step, except that removing the first-strike step while
    /// on it leaves the cursor on combat damage.
    pub fn set_has_first_strike(&mut self, first_strike: bool) {
        let existing = self.sequence.iter().position(|&(_, s)| s == Step::FirstStrikeDamage);
        match (first_strike, existing) {
            (true, None) => {
                let Some(at) = self.sequence.iter().position(|&(_, s)| s == Step::CombatDamage) else {
                    return;
                };
                self.sequence.insert(at, (Phase::Combat, Step::FirstStrikeDamage));
                if self.index >= at {
                    self.index += 1;
                }
            }
            (false, Some(at)) => {
                self.sequence.remove(at);
                if self.index > at {
                    self.index -= 1;
                }
            }
            _ => {}
        }
    }

    /// Move to the next step.
    ///
    /// Past cleanup the turn number increases, the active player becomes
    /// `next_active_player` unless that is empty, and the sequence drops
    /// any first-strike step. Priority always goes to the active player.
    pub fn advance_step(&mut self, next_active_player: impl Into<PlayerId>) -> (Phase, Step) {
        self.index += 1;
        if self.index >= self.sequence.len() {
            self.index = 0;
            self.turn_number += 1;
            self.sequence = BASE_SEQUENCE.to_vec();
            let next = next_active_player.into();
            if !next.is_empty() {
                self.active_player = next;
            }
            debug!(turn = self.turn_number, active = %self.active_player, "new turn");
        }
        self.priority_player = self.active_player.clone();
        debug!(phase = %self.current_phase(), step = %self.current_step(), "advance step");
        (self.current_phase(), self.current_step())
    }

    /// Whether the current step is the first of its phase.
    #[must_use]
    pub fn is_phase_start(&self) -> bool {
        self.index == 0 || self.sequence[self.index - 1].0 != self.current_phase()
    }

    /// Events announcing the current step: `CHANGE_STEP`, then the phase
    /// event if the step opens a phase, then the step's own event.
    #[must_use]
    pub fn step_events(&self) -> Vec<Event> {
        let phase = self.current_phase();
        let step = self.current_step();
        let announce = |event_type: EventType| {
            Event::of_type(event_type)
                .with_player(self.active_player.clone())
                .with_amount(i64::from(self.turn_number))
                .with_metadata("phase", phase.as_str())
                .with_metadata("step", step.as_str())
        };

        let mut events = vec![announce(EventType::ChangeStep).with_data(step.as_str())];
        if self.is_phase_start() {
            events.push(announce(phase.event_type()));
        }
        events.push(announce(step.event_type()));
        events
    }

    #[must_use]
    pub fn turn_state(&self) -> TurnState {
        TurnState {
            turn_number: self.turn_number,
            active_player: self.active_player.clone(),
            priority_player: self.priority_player.clone(),
            phase: self.current_phase(),
            step: self.current_step(),
            has_first_strike: self.has_first_strike(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_untap() {
        let turns = TurnManager::new("Alice");
        assert_eq!(turns.turn_number(), 1);
        assert_eq!(turns.current_phase(), Phase::Beginning);
        assert_eq!(turns.current_step(), Step::Untap);
        assert_eq!(turns.priority_player().as_str(), "Alice");
    }

    #[test]
    fn test_empty_next_player_keeps_active() {
        let mut turns = TurnManager::new("Alice");
        for _ in 0..12 {
            turns.advance_step("");
        }
        assert_eq!(turns.turn_number(), 2);
        assert_eq!(turns.active_player().as_str(), "Alice");
    }

    #[test]
    fn test_priority_resets_each_step() {
        let mut turns = TurnManager::new("Alice");
        turns.set_priority("Bob");
        assert_eq!(turns.priority_player().as_str(), "Bob");
        turns.advance_step("");
        assert_eq!(turns.priority_player().as_str(), "Alice");
    }

    #[test]
    fn test_first_strike_insert_and_remove() {
        let mut turns = TurnManager::new("Alice");
        turns.set_has_first_strike(true);
        turns.set_has_first_strike(true);
        assert_eq!(turns.sequence().len(), 13);

        for _ in 0..7 {
            turns.advance_step("");
        }
        assert_eq!(turns.current_step(), Step::FirstStrikeDamage);
        assert_eq!(turns.advance_step(""), (Phase::Combat, Step::CombatDamage));

        turns.set_has_first_strike(false);
        assert_eq!(turns.sequence().len(), 12);
        assert_eq!(turns.current_step(), Step::CombatDamage);
    }

    #[test]
    fn test_first_strike_cleared_on_new_turn() {
        let mut turns = TurnManager::new("Alice");
        turns.set_has_first_strike(true);
        for _ in 0..13 {
            turns.advance_step("Bob");
        }
        assert_eq!(turns.turn_number(), 2);
        assert!(!turns.has_first_strike());
    }

    #[test]
    fn test_insert_after_cursor_passed_combat() {
        let mut turns = TurnManager::new("Alice");
        for _ in 0..9 {
            turns.advance_step("");
        }
        assert_eq!(turns.current_step(), Step::Main2);
        turns.set_has_first_strike(true);
        assert_eq!(turns.current_step(), Step::Main2);
    }

    #[test]
    fn test_step_events() {
        let mut turns = TurnManager::new("Alice");
        let types: Vec<EventType> = turns.step_events().iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::ChangeStep, EventType::BeginningPhase, EventType::UntapStep]);

        turns.advance_step("");
        let events = turns.step_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "UPKEEP");
        assert_eq!(events[1].event_type, EventType::UpkeepStep);
        assert_eq!(events[1].player.as_str(), "Alice");
        assert_eq!(events[1].metadata("phase"), Some("BEGINNING"));
    }

    #[test]
    fn test_turn_state_serializes() {
        let turns = TurnManager::new("Alice");
        let json = serde_json::to_value(turns.turn_state()).unwrap();
        assert_eq!(json["step"], "UNTAP");
        assert_eq!(json["turn_number"], 1);
    }
}
