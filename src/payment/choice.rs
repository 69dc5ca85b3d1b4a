//! Choices players make while something resolves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PlayerId;
use crate::error::{Result, RulesError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    Mode,
    Target,
    #[serde(rename = "X_VALUE")]
    X,
    Color,
    Number,
    YesNo,
    Card,
    Player,
    Other,
}

/// A pending decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub choice_type: ChoiceType,
    pub player: PlayerId,
    pub prompt: String,
    /// Allowed answers. Empty means free-form.
    pub options: Vec<String>,
    pub min_choices: usize,
    /// 0 means no upper bound.
    pub max_choices: usize,
    pub result: Vec<String>,
    pub made: bool,
}

impl Choice {
    /// A choice of exactly one answer.
    pub fn new(choice_type: ChoiceType, player: impl Into<PlayerId>, prompt: impl Into<String>) -> Self {
        Self {
            choice_type,
            player: player.into(),
            prompt: prompt.into(),
            options: Vec::new(),
            min_choices: 1,
            max_choices: 1,
            result: Vec::new(),
            made: false,
        }
    }

    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min_choices: usize, max_choices: usize) -> Self {
        self.min_choices = min_choices;
        self.max_choices = max_choices;
        self
    }

    /// Check a proposed answer against the bounds and options.
    pub fn check(&self, result: &[String]) -> Result<()> {
        if result.len() < self.min_choices {
            return Err(RulesError::InvalidChoice(format!(
                "too few choices (need at least {})",
                self.min_choices
            )));
        }
        if self.max_choices > 0 && result.len() > self.max_choices {
            return Err(RulesError::InvalidChoice(format!(
                "too many choices (max {})",
                self.max_choices
            )));
        }
        if !self.options.is_empty() {
            if let Some(bad) = result.iter().find(|r| !self.options.contains(r)) {
                return Err(RulesError::InvalidChoice(format!("{bad} is not an option")));
            }
        }
        Ok(())
    }
}

/// FIFO queue of choices with at most one current choice.
///
/// Choices for several players are served in the order they were added,
/// so callers add them in APNAP order.
#[derive(Clone, Debug, Default)]
pub struct ChoiceManager {
    pending: VecDeque<Choice>,
    current: Option<Choice>,
    made: Vec<Choice>,
}

impl ChoiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_choice(&mut self, choice: Choice) {
        debug!(player = %choice.player, kind = ?choice.choice_type, "add choice");
        self.pending.push_back(choice);
    }

    /// Make the next pending choice current and return it.
    ///
    /// An unanswered current choice stays current.
    pub fn next_choice(&mut self) -> Option<&Choice> {
        if self.current.is_none() {
            self.current = self.pending.pop_front();
        }
        self.current.as_ref()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Choice> {
        self.current.as_ref()
    }

    /// Answer the current choice.
    ///
    /// A rejected answer leaves the choice current.
    pub fn make_choice(&mut self, result: Vec<String>) -> Result<&Choice> {
        let current = self.current.as_ref().ok_or(RulesError::NoChoicePending)?;
        current.check(&result)?;

        let mut choice = self.current.take().ok_or(RulesError::NoChoicePending)?;
        choice.result = result;
        choice.made = true;
        self.made.push(choice);
        self.made.last().ok_or(RulesError::NoChoicePending)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Queued choices plus the current one, if unanswered.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    /// Queued choices for `player`, in serving order.
    #[must_use]
    pub fn pending_for(&self, player: &PlayerId) -> Vec<&Choice> {
        self.pending.iter().filter(|c| &c.player == player).collect()
    }

    /// Answered choices, oldest first.
    #[must_use]
    pub fn made_choices(&self) -> &[Choice] {
        &self.made
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
        self.made.clear();
    }
}
