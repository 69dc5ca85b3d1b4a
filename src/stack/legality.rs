//! Resolution-time legality checks.
//!
//! Right before an item resolves, the engine asks whether it still can:
//! its controller may have left, its source may have moved, its targets may
//! be gone. The answer is a [`LegalityVerdict`], never an error; illegal
//! items are removed from the stack, not reported as failures.
//!
//! ## Checks
//!
//! In order, stopping at the first failure:
//!
//! 1. The controller is still in the match.
//! 2. The source is in a zone its kind allows. A spell whose source card
//!    vanished is illegal; an ability whose source vanished still resolves.
//! 3. Every target named in the `targets` (comma list) or `target`
//!    metadata still exists. Card targets must be on the battlefield unless
//!    `target_zone` names another zone; player targets must still be in
//!    the match.
//! 4. The item is not flagged `timing_violation`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameStateAccessor, PlayerId, Zone};

use super::item::{StackItem, StackItemKind};

/// Outcome of a legality check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalityVerdict {
    pub legal: bool,
    pub reason: String,
    pub details: FxHashMap<String, String>,
}

impl LegalityVerdict {
    pub fn legal(reason: impl Into<String>) -> Self {
        Self {
            legal: true,
            reason: reason.into(),
            details: FxHashMap::default(),
        }
    }

    pub fn illegal(reason: impl Into<String>) -> Self {
        Self {
            legal: false,
            reason: reason.into(),
            details: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Validates stack items against the current match state.
#[derive(Clone, Default)]
pub struct LegalityChecker {
    state: Option<Arc<dyn GameStateAccessor>>,
}

impl LegalityChecker {
    pub fn new(state: Arc<dyn GameStateAccessor>) -> Self {
        Self { state: Some(state) }
    }

    /// A checker with no state attached. Every item is legal.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, state: Arc<dyn GameStateAccessor>) {
        self.state = Some(state);
    }

    /// Whether `item` may still resolve.
    #[must_use]
    pub fn check_stack_item(&self, item: &StackItem) -> LegalityVerdict {
        let Some(state) = self.state.as_deref() else {
            return LegalityVerdict::legal("legality checker not attached");
        };

        if let Some(verdict) = check_controller(state, &item.controller) {
            return verdict;
        }
        if let Some(verdict) = check_source(state, item) {
            return verdict;
        }
        let targets = extract_targets(item);
        if !targets.is_empty() {
            let zone = item.metadata("target_zone").and_then(Zone::parse).unwrap_or(Zone::Battlefield);
            if let Some(verdict) = check_targets(state, &targets, zone) {
                return verdict;
            }
        }
        if item.metadata("timing_violation") == Some("true") {
            return LegalityVerdict::illegal("timing restriction violation").with_detail("kind", item.kind.as_str());
        }

        LegalityVerdict::legal("all legality checks passed")
    }

    /// Whether the item's costs were paid.
    ///
    /// Items carry `costs_paid = "false"` while payment is outstanding;
    /// anything else counts as paid.
    #[must_use]
    pub fn check_costs_paid(&self, item: &StackItem) -> LegalityVerdict {
        if item.metadata("costs_paid") == Some("false") {
            return LegalityVerdict::illegal("costs not paid").with_detail("item_id", item.id.clone());
        }
        LegalityVerdict::legal("costs paid")
    }
}

impl std::fmt::Debug for LegalityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegalityChecker")
            .field("attached", &self.state.is_some())
            .finish()
    }
}

fn check_controller(state: &dyn GameStateAccessor, controller: &PlayerId) -> Option<LegalityVerdict> {
    if controller.is_empty() {
        return None;
    }
    match state.find_player(controller) {
        None => Some(LegalityVerdict::illegal("controller not found").with_detail("controller_id", controller.as_str())),
        Some(player) if !player.in_match() => Some(
            LegalityVerdict::illegal("controller has left or lost the game")
                .with_detail("controller_id", controller.as_str())
                .with_detail("lost", player.lost.to_string())
                .with_detail("left", player.left.to_string()),
        ),
        Some(_) => None,
    }
}

/// Zones a source may be in for its item to resolve.
fn source_zone_allowed(kind: StackItemKind, zone: Zone) -> bool {
    match kind {
        StackItemKind::Spell => zone == Zone::Stack,
        StackItemKind::ActivatedAbility => !matches!(zone, Zone::Library | Zone::Command),
        StackItemKind::TriggeredAbility => true,
    }
}

fn check_source(state: &dyn GameStateAccessor, item: &StackItem) -> Option<LegalityVerdict> {
    if item.source.is_empty() {
        return None;
    }
    match state.find_card(&item.source) {
        None if item.kind == StackItemKind::Spell => Some(
            LegalityVerdict::illegal("source card no longer exists")
                .with_detail("source_id", item.source.as_str())
                .with_detail("kind", item.kind.as_str()),
        ),
        None => None,
        Some(card) if !source_zone_allowed(item.kind, card.zone) => Some(
            LegalityVerdict::illegal("source card not in valid zone")
                .with_detail("source_id", item.source.as_str())
                .with_detail("source_zone", card.zone.as_u8().to_string())
                .with_detail("kind", item.kind.as_str()),
        ),
        Some(_) => None,
    }
}

/// Target ids named in an item's metadata.
#[must_use]
pub fn extract_targets(item: &StackItem) -> Vec<String> {
    let raw = match item.metadata("targets").filter(|t| !t.trim().is_empty()) {
        Some(list) => list,
        None => match item.metadata("target").filter(|t| !t.trim().is_empty()) {
            Some(single) => single,
            None => return Vec::new(),
        },
    };
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_targets(state: &dyn GameStateAccessor, targets: &[String], zone: Zone) -> Option<LegalityVerdict> {
    let mut invalid = Vec::new();
    for target in targets {
        if let Some(card) = state.find_card(&EntityId::new(target.as_str())) {
            if card.zone != zone {
                invalid.push(format!("{target} (zone {})", card.zone.as_u8()));
            }
        } else if let Some(player) = state.find_player(&PlayerId::new(target.as_str())) {
            if !player.in_match() {
                invalid.push(format!("{target} (lost/left)"));
            }
        } else {
            invalid.push(format!("{target} (not found)"));
        }
    }

    if invalid.is_empty() {
        return None;
    }
    Some(LegalityVerdict::illegal("one or more targets are illegal").with_detail("invalid_targets", invalid.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardInfo, TableState};

    fn table() -> TableState {
        TableState::new()
            .with_players(["alice", "bob"])
            .with_card(CardInfo::new("bolt", "Lightning Bolt", "alice", Zone::Stack))
            .with_card(CardInfo::new("bears", "Grizzly Bears", "bob", Zone::Battlefield))
            .with_card(CardInfo::new("corpse", "Dead Elf", "bob", Zone::Graveyard))
    }

    fn checker(state: TableState) -> LegalityChecker {
        LegalityChecker::new(Arc::new(state))
    }

    #[test]
    fn test_detached_is_legal() {
        let item = StackItem::spell("s1", "nobody", "nothing");
        assert!(LegalityChecker::detached().check_stack_item(&item).legal);
    }

    #[test]
    fn test_controller_checks() {
        let mut state = table();
        state.set_left(&PlayerId::new("bob"), true);
        let checker = checker(state);

        let verdict = checker.check_stack_item(&StackItem::triggered("t1", "bob", ""));
        assert!(!verdict.legal);
        assert_eq!(verdict.details.get("left").map(String::as_str), Some("true"));

        let verdict = checker.check_stack_item(&StackItem::triggered("t2", "carol", ""));
        assert_eq!(verdict.reason, "controller not found");
    }

    #[test]
    fn test_spell_source_must_be_on_stack() {
        let checker = checker(table());
        assert!(checker.check_stack_item(&StackItem::spell("s1", "alice", "bolt")).legal);
        assert!(!checker.check_stack_item(&StackItem::spell("s2", "alice", "bears")).legal);
        assert!(!checker.check_stack_item(&StackItem::spell("s3", "alice", "ghost")).legal);
    }

    #[test]
    fn test_ability_tolerates_missing_source() {
        let checker = checker(table());
        assert!(checker.check_stack_item(&StackItem::activated("a1", "alice", "ghost")).legal);
        assert!(checker.check_stack_item(&StackItem::triggered("t1", "alice", "corpse")).legal);
    }

    #[test]
    fn test_targets() {
        let checker = checker(table());
        let ok = StackItem::spell("s1", "alice", "bolt").with_metadata("targets", "bears, bob");
        assert!(checker.check_stack_item(&ok).legal);

        let bad = StackItem::spell("s2", "alice", "bolt").with_metadata("target", "corpse");
        let verdict = checker.check_stack_item(&bad);
        assert!(!verdict.legal);
        assert!(verdict.details["invalid_targets"].contains("corpse (zone 3)"));

        let graveyard = bad.clone().with_metadata("target_zone", "graveyard");
        assert!(checker.check_stack_item(&graveyard).legal);
    }

    #[test]
    fn test_timing_and_costs() {
        let checker = checker(table());
        let item = StackItem::spell("s1", "alice", "bolt").with_metadata("timing_violation", "true");
        assert_eq!(checker.check_stack_item(&item).reason, "timing restriction violation");

        let unpaid = StackItem::spell("s2", "alice", "bolt").with_metadata("costs_paid", "false");
        assert!(!checker.check_costs_paid(&unpaid).legal);
        assert!(checker.check_costs_paid(&item).legal);
    }

    #[test]
    fn test_extract_targets() {
        let item = StackItem::spell("s", "a", "b").with_metadata("targets", " x ,, y ");
        assert_eq!(extract_targets(&item), vec!["x", "y"]);
        assert!(extract_targets(&StackItem::spell("s", "a", "b")).is_empty());
    }
}
