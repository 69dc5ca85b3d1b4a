//! The pending-action stack.

use tracing::{debug, info};

use crate::error::{Result, RulesError};

use super::item::{StackItem, StackItemView};
use super::legality::LegalityChecker;

/// LIFO stack of spells and abilities.
///
/// Items are stored bottom first; the last element is the top.
#[derive(Clone, Debug, Default)]
pub struct StackManager {
    items: Vec<StackItem>,
}

impl StackManager {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, item: StackItem) {
        debug!(item = %item.id, kind = %item.kind, controller = %item.controller, "push()");
        self.items.push(item);
    }

    /// Take the top item.
    pub fn pop(&mut self) -> Result<StackItem> {
        let item = self.items.pop().ok_or(RulesError::EmptyStack)?;
        debug!(item = %item.id, "pop()");
        Ok(item)
    }

    /// Take an item from anywhere in the stack, searching from the top.
    pub fn remove(&mut self, id: &str) -> Option<StackItem> {
        let index = self.items.iter().rposition(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    #[must_use]
    pub fn peek(&self) -> Option<&StackItem> {
        self.items.last()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StackItem> {
        self.items.iter().rev().find(|item| item.id == id)
    }

    /// Copy of the stack, bottom to top.
    #[must_use]
    pub fn list(&self) -> Vec<StackItem> {
        self.items.clone()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn views(&self) -> Vec<StackItemView> {
        self.items.iter().map(StackItem::view).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Remove every item the checker rejects and return their ids.
    ///
    /// Each removed item's removal hook is called with its verdict.
    /// Survivors keep their relative order.
    pub fn remove_illegal_items(&mut self, checker: &LegalityChecker) -> Vec<String> {
        let mut removed = Vec::new();
        let mut survivors = Vec::with_capacity(self.items.len());

        for item in self.items.drain(..) {
            let verdict = checker.check_stack_item(&item);
            if verdict.legal {
                survivors.push(item);
            } else {
                info!(item = %item.id, reason = %verdict.reason, "removing illegal stack item");
                item.notify_removed(&verdict);
                removed.push(item.id);
            }
        }

        self.items = survivors;
        removed
    }
}
