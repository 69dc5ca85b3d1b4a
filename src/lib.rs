//! # ccg-rules
//!
//! Rules-resolution core for a multiplayer turn-based card game.
//!
//! ## Design Principles
//!
//! 1. **Commands on the stack**: Every spell or ability carries its own
//!    resolution behavior. The stack never inspects what an item does.
//!
//! 2. **Events drive everything**: Watchers, triggers and counters learn
//!    about the match only through published [`Event`]s.
//!
//! 3. **Legality is a verdict, not an error**: Items that lose their
//!    legality leave the stack with a reason; errors are reserved for
//!    structural misuse and content failures.
//!
//! ## Architecture
//!
//! - **Single owner per match**: A [`MatchEngine`] is mutated through
//!   `&mut self`. The async [`MatchWorker`] serializes client intents for
//!   one match; separate matches run in parallel.
//!
//! - **Shared registries**: The event bus, watcher registry and mana
//!   ability manager lock internally so listeners and nested activations
//!   can reach them through shared references.
//!
//! - **Persistent history**: The event log is an `im::Vector`, so match
//!   views clone in O(1).
//!
//! ## Modules
//!
//! - `core`: Entity and player ids, zones, the read-only match state seam,
//!   configuration
//! - `events`: Event taxonomy and the publish/subscribe bus
//! - `counters`: Named counters and power/toughness boosts
//! - `watchers`: Per-turn event observers
//! - `triggers`: Triggered abilities and their conditions
//! - `targeting`: Target requirements and validation
//! - `stack`: Stack items, commands, resolution depth, legality
//! - `mana`: Mana abilities that resolve immediately
//! - `payment`: Cost payment and player choices
//! - `priority`: Priority passing, priority windows, special actions
//! - `turn`: Phases, steps and turn rotation
//! - `engine`: One match wired together, and its async worker

pub mod core;
pub mod error;
pub mod events;
pub mod counters;
pub mod watchers;
pub mod triggers;
pub mod targeting;
pub mod stack;
pub mod mana;
pub mod payment;
pub mod priority;
pub mod turn;
pub mod engine;

// Re-export commonly used types
pub use crate::core::{CardInfo, EntityId, GameStateAccessor, PlayerId, PlayerInfo, RulesConfig, TableState, Zone};

pub use crate::error::{Result, RulesError};

pub use crate::events::{Event, EventBus, EventType, SubscriptionHandle};

pub use crate::counters::{BoostCounter, Counter, CounterOperations, CounterType, Counters};

pub use crate::watchers::{Watcher, WatcherRegistry, WatcherScope};

pub use crate::triggers::{AbilityTrigger, EventCondition, TriggerId, TriggerManager};

pub use crate::targeting::{TargetRequirement, TargetSelection, TargetType, TargetValidator};

pub use crate::stack::{
    CommandContext, LegalityChecker, LegalityVerdict, ResolutionContext, StackCommand, StackItem, StackItemKind,
    StackManager,
};

pub use crate::mana::{ManaAbility, ManaAbilityManager, TriggeredManaAbility};

pub use crate::payment::{Choice, ChoiceManager, ChoiceType, Cost, CostType, PaymentState, PaymentStep, PaymentWindowManager};

pub use crate::priority::{
    PriorityTracker, PriorityWindow, PriorityWindowManager, PriorityWindowType, SpecialAction, SpecialActionManager,
    SpecialActionType,
};

pub use crate::turn::{Phase, Step, TurnManager, TurnState};

pub use crate::engine::{MatchEngine, MatchHandle, MatchView, MatchWorker, PriorityOutcome, ResolveOutcome};
