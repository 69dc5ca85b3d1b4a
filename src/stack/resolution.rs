//! Nested resolution tracking.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::RulesConfig;
use crate::error::{Result, RulesError};

/// Default bound on nested resolution.
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 10;

/// Which items are resolving right now, innermost last.
///
/// Resolution may nest (a spell copying and resolving another spell). The
/// depth is bounded; exceeding it is rejected rather than truncated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    resolving: Vec<String>,
    max_depth: usize,
    allow_mana_abilities: bool,
    allow_special_actions: bool,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            resolving: Vec::with_capacity(max_depth.min(16)),
            max_depth,
            allow_mana_abilities: false,
            allow_special_actions: false,
        }
    }

    pub fn from_config(config: &RulesConfig) -> Self {
        Self::with_max_depth(config.max_resolution_depth)
    }

    /// Start resolving `item_id` inside whatever is resolving now.
    pub fn begin_resolution(&mut self, item_id: &str) -> Result<()> {
        if self.resolving.len() >= self.max_depth {
            warn!(item = item_id, max = self.max_depth, "resolution depth exceeded");
            return Err(RulesError::MaxResolutionDepth { max: self.max_depth });
        }
        self.resolving.push(item_id.to_string());
        debug!(item = item_id, depth = self.resolving.len(), "begin_resolution()");
        Ok(())
    }

    /// Finish resolving `item_id`, which must be the innermost item.
    pub fn end_resolution(&mut self, item_id: &str) -> Result<()> {
        let Some(current) = self.resolving.last() else {
            return Err(RulesError::NotResolving);
        };
        if current != item_id {
            return Err(RulesError::ResolutionMismatch {
                expected: current.clone(),
                actual: item_id.to_string(),
            });
        }
        self.resolving.pop();
        debug!(item = item_id, depth = self.resolving.len(), "end_resolution()");
        Ok(())
    }

    #[must_use]
    pub fn is_resolving(&self) -> bool {
        !self.resolving.is_empty()
    }

    /// Innermost resolving item.
    #[must_use]
    pub fn current_resolving_id(&self) -> Option<&str> {
        self.resolving.last().map(String::as_str)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.resolving.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_allow_mana_abilities(&mut self, allow: bool) {
        self.allow_mana_abilities = allow;
    }

    #[must_use]
    pub fn can_activate_mana_abilities(&self) -> bool {
        self.allow_mana_abilities
    }

    pub fn set_allow_special_actions(&mut self, allow: bool) {
        self.allow_special_actions = allow;
    }

    #[must_use]
    pub fn can_take_special_actions(&self) -> bool {
        self.allow_special_actions
    }

    /// Clear the resolving stack and both permissions. The bound is kept.
    pub fn reset(&mut self) {
        self.resolving.clear();
        self.allow_mana_abilities = false;
        self.allow_special_actions = false;
    }
}
