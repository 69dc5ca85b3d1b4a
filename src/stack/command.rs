//! Resolution behavior carried by stack items.
//!
//! ## Design
//!
//! A stack item owns a [`StackCommand`] instead of a bare closure, so every
//! behavior has a name that shows up in logs and in [`StackItemView`]s.
//! Built-in commands cover the generic cases (do nothing, emit an event,
//! run several commands in order); card content supplies its own types or
//! wraps a closure with [`command_fn`].
//!
//! Commands run with a [`CommandContext`]. Through it they can emit events,
//! queue new stack items, resolve another item in place (nested
//! resolution), activate mana abilities and queue player choices. Events
//! and items are buffered in a [`CommandOutput`] and published by the
//! engine once the command returns.
//!
//! [`StackItemView`]: super::StackItemView

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, RulesError};
use crate::events::Event;
use crate::mana::{ActivationGate, ManaAbilityManager};
use crate::payment::{ChoiceManager, PaymentState};
use crate::priority::PriorityWindow;

use super::item::StackItem;
use super::resolution::ResolutionContext;

/// What a stack item does when it resolves.
pub trait StackCommand: Send + Sync {
    /// Stable name used in logs and views.
    fn name(&self) -> &str;

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()>;
}

/// Resolves without effect.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

impl StackCommand for NoOp {
    fn name(&self) -> &str {
        "noop"
    }

    fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Emits a fixed event on resolution.
#[derive(Clone, Debug)]
pub struct EmitEvent(pub Event);

impl StackCommand for EmitEvent {
    fn name(&self) -> &str {
        "emit_event"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.emit(self.0.clone());
        Ok(())
    }
}

/// Runs commands in order, stopping at the first failure.
#[derive(Clone, Default)]
pub struct Sequence(pub Vec<Arc<dyn StackCommand>>);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, command: impl StackCommand + 'static) -> Self {
        self.0.push(Arc::new(command));
        self
    }
}

impl StackCommand for Sequence {
    fn name(&self) -> &str {
        "sequence"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        for command in &self.0 {
            command.execute(ctx)?;
        }
        Ok(())
    }
}

/// A named closure.
pub struct FnCommand<F> {
    name: String,
    f: F,
}

impl<F> StackCommand for FnCommand<F>
where
    F: Fn(&mut CommandContext<'_>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        (self.f)(ctx)
    }
}

/// Wrap a closure as a named command.
///
/// ```
/// use ccg_rules::events::{Event, EventType};
/// use ccg_rules::stack::{command_fn, StackItem};
///
/// let item = StackItem::spell("s1", "alice", "bolt").with_command(command_fn("bolt", |ctx| {
///     ctx.emit(Event::new(EventType::DamagedPlayer, "", "bolt", "alice").with_amount(3));
///     Ok(())
/// }));
/// assert_eq!(item.command.name(), "bolt");
/// ```
pub fn command_fn<F>(name: impl Into<String>, f: F) -> FnCommand<F>
where
    F: Fn(&mut CommandContext<'_>) -> Result<()> + Send + Sync,
{
    FnCommand { name: name.into(), f }
}

/// Events and stack items produced while resolving.
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub events: Vec<Event>,
    pub items: Vec<StackItem>,
}

impl CommandOutput {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.items.is_empty()
    }
}

/// What a command can reach while it executes.
pub struct CommandContext<'a> {
    item: &'a StackItem,
    resolution: &'a mut ResolutionContext,
    mana: &'a ManaAbilityManager,
    choices: &'a mut ChoiceManager,
    output: &'a mut CommandOutput,
    payment: Option<&'a PaymentState>,
    window: Option<&'a PriorityWindow>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        item: &'a StackItem,
        resolution: &'a mut ResolutionContext,
        mana: &'a ManaAbilityManager,
        choices: &'a mut ChoiceManager,
        output: &'a mut CommandOutput,
    ) -> Self {
        Self {
            item,
            resolution,
            mana,
            choices,
            output,
            payment: None,
            window: None,
        }
    }

    /// The payment open while resolving, if any.
    #[must_use]
    pub fn with_payment(mut self, payment: Option<&'a PaymentState>) -> Self {
        self.payment = payment;
        self
    }

    /// The priority window open while resolving, if any.
    #[must_use]
    pub fn with_window(mut self, window: Option<&'a PriorityWindow>) -> Self {
        self.window = window;
        self
    }

    /// The item being resolved.
    #[must_use]
    pub fn item(&self) -> &StackItem {
        self.item
    }

    /// Queue an event for publication after the command returns.
    pub fn emit(&mut self, event: Event) {
        self.output.events.push(event);
    }

    /// Queue an item to be pushed onto the stack after the command returns.
    pub fn push(&mut self, item: StackItem) {
        self.output.items.push(item);
    }

    /// Current nested resolution depth (1 for a top-level resolution).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.resolution.depth()
    }

    pub fn resolution(&self) -> &ResolutionContext {
        &*self.resolution
    }

    pub fn choices(&mut self) -> &mut ChoiceManager {
        &mut *self.choices
    }

    /// Resolve another item in place, inside the current resolution.
    ///
    /// Fails with [`RulesError::MaxResolutionDepth`] once nesting reaches
    /// the configured bound. The nested resolution is always ended, even
    /// when its command fails.
    pub fn resolve_nested(&mut self, item: &StackItem) -> Result<()> {
        self.resolution.begin_resolution(&item.id)?;
        debug!(item = %item.id, depth = self.resolution.depth(), "resolve_nested()");

        let result = {
            let mut nested = CommandContext {
                item,
                resolution: &mut *self.resolution,
                mana: self.mana,
                choices: &mut *self.choices,
                output: &mut *self.output,
                payment: self.payment,
                window: self.window,
            };
            item.command.execute(&mut nested)
        };

        let ended = self.resolution.end_resolution(&item.id);
        result?;
        ended
    }

    /// Activate a registered mana ability mid-resolution on behalf of the
    /// item's controller.
    ///
    /// Goes through the same [`ActivationGate`] as a player's own
    /// activation: the controller must control the ability, the open
    /// payment and window must allow it, and the manager or the resolution
    /// context must permit activation while resolving.
    pub fn activate_mana(&mut self, ability_id: &str) -> Result<()> {
        let ability = self
            .mana
            .get(ability_id)
            .ok_or_else(|| RulesError::ManaAbilityNotFound(ability_id.to_string()))?;
        ActivationGate::new(&*self.resolution)
            .with_payment(self.payment)
            .with_window(self.window)
            .check(self.mana, &ability, &self.item.controller)?;
        self.mana.activate(&ability)?;
        self.mana.resolve_triggered().map(|_| ())
    }
}

impl std::fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("item", &self.item.id)
            .field("depth", &self.resolution.depth())
            .field("output", &self.output)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use crate::mana::ManaAbility;

    struct Harness {
        resolution: ResolutionContext,
        mana: ManaAbilityManager,
        choices: ChoiceManager,
        output: CommandOutput,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                resolution: ResolutionContext::new(),
                mana: ManaAbilityManager::new(),
                choices: ChoiceManager::new(),
                output: CommandOutput::new(),
            }
        }

        fn run(&mut self, item: &StackItem) -> Result<()> {
            self.resolution.begin_resolution(&item.id)?;
            let result = {
                let mut ctx = CommandContext::new(
                    item,
                    &mut self.resolution,
                    &self.mana,
                    &mut self.choices,
                    &mut self.output,
                );
                item.command.execute(&mut ctx)
            };
            self.resolution.end_resolution(&item.id)?;
            result
        }
    }

    #[test]
    fn test_sequence_emits_in_order() {
        let mut h = Harness::new();
        let item = StackItem::spell("s1", "alice", "card").with_command(
            Sequence::new()
                .then(EmitEvent(Event::of_type(EventType::GainedLife)))
                .then(EmitEvent(Event::of_type(EventType::DrewCard))),
        );

        h.run(&item).unwrap();
        let types: Vec<_> = h.output.events.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::GainedLife, EventType::DrewCard]);
    }

    #[test]
    fn test_nested_resolution_depth() {
        let mut h = Harness::new();
        let inner = StackItem::spell("copy", "alice", "card").with_command(command_fn("inner", |ctx| {
            assert_eq!(ctx.depth(), 2);
            ctx.emit(Event::of_type(EventType::CustomEvent));
            Ok(())
        }));
        let outer = StackItem::spell("orig", "alice", "card").with_command(command_fn("outer", move |ctx| {
            ctx.resolve_nested(&inner)
        }));

        h.run(&outer).unwrap();
        assert_eq!(h.output.events.len(), 1);
        assert!(!h.resolution.is_resolving());
    }

    #[test]
    fn test_nested_failure_still_ends() {
        let mut h = Harness::new();
        let inner = StackItem::spell("bad", "alice", "card")
            .with_command(command_fn("fails", |_| Err(RulesError::content("fizzle"))));
        let outer = StackItem::spell("orig", "alice", "card").with_command(command_fn("outer", move |ctx| {
            let err = ctx.resolve_nested(&inner).unwrap_err();
            assert!(matches!(err, RulesError::Content(_)));
            assert_eq!(ctx.depth(), 1);
            Ok(())
        }));

        h.run(&outer).unwrap();
        assert_eq!(h.resolution.depth(), 0);
    }

    #[test]
    fn test_activate_mana_requires_permission() {
        let mut h = Harness::new();
        h.mana.register(ManaAbility::new("tap-forest", "forest", "alice", |_: &ManaAbilityManager| Ok(())));
        let item = StackItem::spell("s1", "alice", "card")
            .with_command(command_fn("pay", |ctx| ctx.activate_mana("tap-forest")));

        let err = h.run(&item).unwrap_err();
        assert!(matches!(err, RulesError::ManaAbilitiesDisabled(_)));

        h.resolution.set_allow_mana_abilities(true);
        h.run(&item).unwrap();
        assert_eq!(h.mana.activation_context().resolved_count("tap-forest"), 1);
    }
}
