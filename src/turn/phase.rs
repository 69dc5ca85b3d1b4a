//! Phases and steps of a turn.

use serde::{Deserialize, Serialize};

use crate::events::EventType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Beginning => "BEGINNING",
            Phase::PrecombatMain => "PRECOMBAT_MAIN",
            Phase::Combat => "COMBAT",
            Phase::PostcombatMain => "POSTCOMBAT_MAIN",
            Phase::Ending => "ENDING",
        }
    }

    /// Event announcing the start of this phase.
    #[must_use]
    pub const fn event_type(self) -> EventType {
        match self {
            Phase::Beginning => EventType::BeginningPhase,
            Phase::PrecombatMain => EventType::PrecombatMainPhase,
            Phase::Combat => EventType::CombatPhase,
            Phase::PostcombatMain => EventType::PostcombatMainPhase,
            Phase::Ending => EventType::EndPhase,
        }
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Phase::PrecombatMain | Phase::PostcombatMain)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main1,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    /// Only present while a creature with first or double strike is in combat.
    FirstStrikeDamage,
    CombatDamage,
    EndCombat,
    Main2,
    End,
    Cleanup,
}

impl Step {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Step::Untap => "UNTAP",
            Step::Upkeep => "UPKEEP",
            Step::Draw => "DRAW",
            Step::Main1 => "MAIN1",
            Step::BeginCombat => "BEGIN_COMBAT",
            Step::DeclareAttackers => "DECLARE_ATTACKERS",
            Step::DeclareBlockers => "DECLARE_BLOCKERS",
            Step::FirstStrikeDamage => "FIRST_STRIKE_DAMAGE",
            Step::CombatDamage => "COMBAT_DAMAGE",
            Step::EndCombat => "END_COMBAT",
            Step::Main2 => "MAIN2",
            Step::End => "END",
            Step::Cleanup => "CLEANUP",
        }
    }

    /// Event announcing the start of this step.
    #[must_use]
    pub const fn event_type(self) -> EventType {
        match self {
            Step::Untap => EventType::UntapStep,
            Step::Upkeep => EventType::UpkeepStep,
            Step::Draw => EventType::DrawStep,
            Step::Main1 => EventType::PrecombatMainStep,
            Step::BeginCombat => EventType::BeginCombatStep,
            Step::DeclareAttackers => EventType::DeclareAttackersStep,
            Step::DeclareBlockers => EventType::DeclareBlockersStep,
            Step::FirstStrikeDamage => EventType::CombatDamageStepPre,
            Step::CombatDamage => EventType::CombatDamageStep,
            Step::EndCombat => EventType::EndCombatStep,
            Step::Main2 => EventType::PostcombatMainStep,
            Step::End => EventType::EndTurnStep,
            Step::Cleanup => EventType::CleanupStep,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The turn structure without a first-strike damage step.
pub const BASE_SEQUENCE: [(Phase, Step); 12] = [
    (Phase::Beginning, Step::Untap),
    (Phase::Beginning, Step::Upkeep),
    (Phase::Beginning, Step::Draw),
    (Phase::PrecombatMain, Step::Main1),
    (Phase::Combat, Step::BeginCombat),
    (Phase::Combat, Step::DeclareAttackers),
    (Phase::Combat, Step::DeclareBlockers),
    (Phase::Combat, Step::CombatDamage),
    (Phase::Combat, Step::EndCombat),
    (Phase::PostcombatMain, Step::Main2),
    (Phase::Ending, Step::End),
    (Phase::Ending, Step::Cleanup),
];
