//! Target requirements and selections.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RulesError};

/// What kind of object a target slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Creature,
    Player,
    Spell,
    Permanent,
    Artifact,
    Enchantment,
    Land,
    Planeswalker,
    /// Creature, planeswalker or player.
    Any,
}

impl TargetType {
    pub const ALL: [TargetType; 9] = [
        TargetType::Creature,
        TargetType::Player,
        TargetType::Spell,
        TargetType::Permanent,
        TargetType::Artifact,
        TargetType::Enchantment,
        TargetType::Land,
        TargetType::Planeswalker,
        TargetType::Any,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetType::Creature => "creature",
            TargetType::Player => "player",
            TargetType::Spell => "spell",
            TargetType::Permanent => "permanent",
            TargetType::Artifact => "artifact",
            TargetType::Enchantment => "enchantment",
            TargetType::Land => "land",
            TargetType::Planeswalker => "planeswalker",
            TargetType::Any => "any",
        }
    }

    /// Type line word a card must carry, for card-type targets.
    #[must_use]
    pub const fn card_type(self) -> Option<&'static str> {
        match self {
            TargetType::Creature => Some("Creature"),
            TargetType::Artifact => Some("Artifact"),
            TargetType::Enchantment => Some("Enchantment"),
            TargetType::Land => Some("Land"),
            TargetType::Planeswalker => Some("Planeswalker"),
            _ => None,
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target slot of a spell or ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequirement {
    pub target_type: TargetType,
    pub min_targets: usize,
    /// 0 means no upper bound.
    pub max_targets: usize,
    /// An optional slot may be left empty regardless of `min_targets`.
    pub optional: bool,
    pub description: String,
}

impl TargetRequirement {
    pub fn new(target_type: TargetType, min_targets: usize, max_targets: usize) -> Self {
        Self {
            target_type,
            min_targets,
            max_targets,
            optional: false,
            description: format!("target {target_type}"),
        }
    }

    /// Exactly one target.
    pub fn single(target_type: TargetType) -> Self {
        Self::new(target_type, 1, 1)
    }

    /// "Up to N target ...".
    pub fn up_to(target_type: TargetType, max_targets: usize) -> Self {
        let mut requirement = Self::new(target_type, 0, max_targets);
        requirement.optional = true;
        requirement.description = format!("up to {max_targets} target {target_type}");
        requirement
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Check a target count against this slot's bounds.
    pub fn check_count(&self, count: usize) -> Result<()> {
        if count == 0 && self.optional {
            return Ok(());
        }
        if count < self.min_targets {
            return Err(RulesError::InvalidTargets(format!(
                "{}: expected at least {} target(s), got {count}",
                self.description, self.min_targets
            )));
        }
        if self.max_targets > 0 && count > self.max_targets {
            return Err(RulesError::InvalidTargets(format!(
                "{}: expected at most {} target(s), got {count}",
                self.description, self.max_targets
            )));
        }
        Ok(())
    }
}

/// Targets chosen for one requirement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelection {
    pub requirement: TargetRequirement,
    pub targets: Vec<String>,
}

impl TargetSelection {
    pub fn new(requirement: TargetRequirement) -> Self {
        Self {
            requirement,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    /// Check the count bounds, and that no target is chosen twice.
    pub fn validate(&self) -> Result<()> {
        self.requirement.check_count(self.targets.len())?;
        for (i, target) in self.targets.iter().enumerate() {
            if self.targets[..i].contains(target) {
                return Err(RulesError::InvalidTargets(format!("{target} chosen more than once")));
            }
        }
        Ok(())
    }
}
