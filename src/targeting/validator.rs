//! Checking chosen targets against the match state.

use crate::core::{EntityId, GameStateAccessor, PlayerId, Zone};
use crate::error::{Result, RulesError};

use super::requirement::{TargetSelection, TargetType};

/// Validates targets against a [`GameStateAccessor`].
#[derive(Clone, Copy)]
pub struct TargetValidator<'a> {
    state: &'a dyn GameStateAccessor,
}

impl<'a> TargetValidator<'a> {
    pub fn new(state: &'a dyn GameStateAccessor) -> Self {
        Self { state }
    }

    /// Whether `target` is a legal choice for `target_type`.
    #[must_use]
    pub fn is_legal_target(&self, target_type: TargetType, target: &str) -> bool {
        self.check_target(target_type, target).is_ok()
    }

    /// Check one target.
    pub fn check_target(&self, target_type: TargetType, target: &str) -> Result<()> {
        let invalid = |why: &str| RulesError::InvalidTargets(format!("{target}: {why}"));

        match target_type {
            TargetType::Player => self.check_player(target).map_err(|why| invalid(why)),
            TargetType::Spell => {
                let card = self.state.find_card(&EntityId::new(target)).ok_or_else(|| invalid("not found"))?;
                if card.zone != Zone::Stack {
                    return Err(invalid("not a spell on the stack"));
                }
                Ok(())
            }
            TargetType::Permanent => {
                let card = self.state.find_card(&EntityId::new(target)).ok_or_else(|| invalid("not found"))?;
                if card.zone != Zone::Battlefield {
                    return Err(invalid("not on the battlefield"));
                }
                Ok(())
            }
            TargetType::Any => {
                if self.check_player(target).is_ok() {
                    return Ok(());
                }
                let card = self.state.find_card(&EntityId::new(target)).ok_or_else(|| invalid("not found"))?;
                if card.zone == Zone::Battlefield && (card.has_type("Creature") || card.has_type("Planeswalker")) {
                    Ok(())
                } else {
                    Err(invalid("not a creature, planeswalker or player"))
                }
            }
            typed => {
                let card = self.state.find_card(&EntityId::new(target)).ok_or_else(|| invalid("not found"))?;
                if card.zone != Zone::Battlefield {
                    return Err(invalid("not on the battlefield"));
                }
                match typed.card_type() {
                    Some(required) if !card.has_type(required) => Err(invalid(&format!("not a {typed}"))),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Check a whole selection: bounds, duplicates, then every target.
    pub fn validate(&self, selection: &TargetSelection) -> Result<()> {
        selection.validate()?;
        for target in &selection.targets {
            self.check_target(selection.requirement.target_type, target)?;
        }
        Ok(())
    }

    fn check_player(&self, target: &str) -> std::result::Result<(), &'static str> {
        match self.state.find_player(&PlayerId::new(target)) {
            Some(player) if player.in_match() => Ok(()),
            Some(_) => Err("player has left or lost"),
            None => Err("not a player"),
        }
    }
}

impl std::fmt::Debug for TargetValidator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TargetValidator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardInfo, TableState};
    use crate::targeting::TargetRequirement;

    fn table() -> TableState {
        let mut state = TableState::new()
            .with_players(["alice", "bob", "carol"])
            .with_card(CardInfo::new("bears", "Grizzly Bears", "bob", Zone::Battlefield).with_type("Creature"))
            .with_card(CardInfo::new("jace", "Jace", "bob", Zone::Battlefield).with_type("Planeswalker"))
            .with_card(CardInfo::new("forest", "Forest", "alice", Zone::Battlefield).with_type("Land"))
            .with_card(CardInfo::new("bolt", "Lightning Bolt", "alice", Zone::Stack).with_type("Instant"))
            .with_card(CardInfo::new("elf", "Llanowar Elves", "alice", Zone::Graveyard).with_type("Creature"));
        state.set_lost(&PlayerId::new("carol"), true);
        state
    }

    #[test]
    fn test_card_types() {
        let state = table();
        let validator = TargetValidator::new(&state);

        assert!(validator.is_legal_target(TargetType::Creature, "bears"));
        assert!(!validator.is_legal_target(TargetType::Creature, "forest"));
        assert!(!validator.is_legal_target(TargetType::Creature, "elf"));
        assert!(validator.is_legal_target(TargetType::Land, "forest"));
        assert!(validator.is_legal_target(TargetType::Permanent, "forest"));
        assert!(validator.is_legal_target(TargetType::Spell, "bolt"));
        assert!(!validator.is_legal_target(TargetType::Spell, "bears"));
    }

    #[test]
    fn test_players_and_any() {
        let state = table();
        let validator = TargetValidator::new(&state);

        assert!(validator.is_legal_target(TargetType::Player, "bob"));
        assert!(!validator.is_legal_target(TargetType::Player, "carol"));
        assert!(!validator.is_legal_target(TargetType::Player, "bears"));

        assert!(validator.is_legal_target(TargetType::Any, "bob"));
        assert!(validator.is_legal_target(TargetType::Any, "bears"));
        assert!(validator.is_legal_target(TargetType::Any, "jace"));
        assert!(!validator.is_legal_target(TargetType::Any, "forest"));
        assert!(!validator.is_legal_target(TargetType::Any, "nobody"));
    }

    #[test]
    fn test_validate_selection() {
        let state = table();
        let validator = TargetValidator::new(&state);

        let ok = TargetSelection::new(TargetRequirement::new(TargetType::Any, 1, 2))
            .with_target("bob")
            .with_target("bears");
        assert!(validator.validate(&ok).is_ok());

        let dup = TargetSelection::new(TargetRequirement::new(TargetType::Any, 1, 2))
            .with_target("bob")
            .with_target("bob");
        assert!(validator.validate(&dup).is_err());

        let bad = TargetSelection::new(TargetRequirement::single(TargetType::Creature)).with_target("forest");
        let err = validator.validate(&bad).unwrap_err();
        assert!(err.to_string().contains("forest"));
    }
}
