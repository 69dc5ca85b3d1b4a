//! Stack items: spells and abilities waiting to resolve.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

use super::command::{NoOp, StackCommand};
use super::legality::LegalityVerdict;

/// What put an item on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackItemKind {
    Spell,
    ActivatedAbility,
    TriggeredAbility,
}

impl StackItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StackItemKind::Spell => "SPELL",
            StackItemKind::ActivatedAbility => "ACTIVATED_ABILITY",
            StackItemKind::TriggeredAbility => "TRIGGERED_ABILITY",
        }
    }

    #[must_use]
    pub const fn is_ability(self) -> bool {
        !matches!(self, StackItemKind::Spell)
    }
}

impl std::fmt::Display for StackItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Called when an item is taken off the stack without resolving.
pub trait RemovalHook: Send + Sync {
    fn on_removed(&self, item: &StackItem, verdict: &LegalityVerdict);
}

impl<F> RemovalHook for F
where
    F: Fn(&StackItem, &LegalityVerdict) + Send + Sync,
{
    fn on_removed(&self, item: &StackItem, verdict: &LegalityVerdict) {
        self(item, verdict)
    }
}

/// A spell or ability on the stack.
///
/// The item carries its own resolution behavior as a [`StackCommand`].
/// Cloning an item shares the command.
#[derive(Clone)]
pub struct StackItem {
    pub id: String,
    pub controller: PlayerId,
    pub kind: StackItemKind,
    pub source: EntityId,
    pub description: String,
    pub metadata: FxHashMap<String, String>,
    pub command: Arc<dyn StackCommand>,
    pub on_removed: Option<Arc<dyn RemovalHook>>,
}

impl StackItem {
    /// Create an item that does nothing when it resolves.
    pub fn new(id: impl Into<String>, controller: impl Into<PlayerId>, kind: StackItemKind) -> Self {
        Self {
            id: id.into(),
            controller: controller.into(),
            kind,
            source: EntityId::none(),
            description: String::new(),
            metadata: FxHashMap::default(),
            command: Arc::new(NoOp),
            on_removed: None,
        }
    }

    pub fn spell(id: impl Into<String>, controller: impl Into<PlayerId>, source: impl Into<EntityId>) -> Self {
        Self::new(id, controller, StackItemKind::Spell).with_source(source)
    }

    pub fn activated(id: impl Into<String>, controller: impl Into<PlayerId>, source: impl Into<EntityId>) -> Self {
        Self::new(id, controller, StackItemKind::ActivatedAbility).with_source(source)
    }

    pub fn triggered(id: impl Into<String>, controller: impl Into<PlayerId>, source: impl Into<EntityId>) -> Self {
        Self::new(id, controller, StackItemKind::TriggeredAbility).with_source(source)
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<EntityId>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the resolution behavior (builder pattern).
    #[must_use]
    pub fn with_command(mut self, command: impl StackCommand + 'static) -> Self {
        self.command = Arc::new(command);
        self
    }

    /// Set a shared resolution behavior (builder pattern).
    #[must_use]
    pub fn with_shared_command(mut self, command: Arc<dyn StackCommand>) -> Self {
        self.command = command;
        self
    }

    /// Set the removal callback (builder pattern).
    #[must_use]
    pub fn with_removal_hook(mut self, hook: impl RemovalHook + 'static) -> Self {
        self.on_removed = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Invoke the removal callback, if any.
    pub fn notify_removed(&self, verdict: &LegalityVerdict) {
        if let Some(hook) = &self.on_removed {
            hook.on_removed(self, verdict);
        }
    }

    /// Serializable description of this item.
    #[must_use]
    pub fn view(&self) -> StackItemView {
        StackItemView {
            id: self.id.clone(),
            controller: self.controller.clone(),
            kind: self.kind,
            source: self.source.clone(),
            description: self.description.clone(),
            metadata: self.metadata.clone(),
            command: self.command.name().to_string(),
        }
    }
}

impl std::fmt::Debug for StackItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackItem")
            .field("id", &self.id)
            .field("controller", &self.controller)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("description", &self.description)
            .field("command", &self.command.name())
            .field("has_removal_hook", &self.on_removed.is_some())
            .finish()
    }
}

/// Read-only, serializable form of a [`StackItem`] for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItemView {
    pub id: String,
    pub controller: PlayerId,
    pub kind: StackItemKind,
    pub source: EntityId,
    pub description: String,
    pub metadata: FxHashMap<String, String>,
    /// Name of the resolution command.
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_item_builders() {
        let item = StackItem::spell("s1", "alice", "bolt")
            .with_description("Lightning Bolt")
            .with_metadata("target", "bob");

        assert_eq!(item.kind, StackItemKind::Spell);
        assert_eq!(item.source, EntityId::new("bolt"));
        assert_eq!(item.metadata("target"), Some("bob"));
        assert_eq!(item.command.name(), "noop");
        assert!(!item.kind.is_ability());
        assert!(StackItemKind::TriggeredAbility.is_ability());
    }

    #[test]
    fn test_removal_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let item = StackItem::triggered("t1", "alice", "src")
            .with_removal_hook(move |_: &StackItem, _: &LegalityVerdict| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        item.notify_removed(&LegalityVerdict::illegal("gone"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_view_serializes() {
        let view = StackItem::activated("a1", "bob", "prodigy").with_description("Ping").view();
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("ACTIVATED_ABILITY"));
        let back: StackItemView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
