//! Match engine: the pieces of the rules core wired into one match.
//!
//! ## Design
//!
//! [`MatchEngine`] owns the stack, the resolution context, priority and
//! turn tracking, the payment and priority windows, triggers, watchers and
//! counters of a single match. It is mutated through `&mut self` by one
//! owner. Running it inside a [`MatchWorker`] gives each match its own
//! tokio task that applies client intents strictly in order, so separate
//! matches proceed in parallel while each match stays single-threaded.
//!
//! ## Key Components
//!
//! - [`MatchEngine`]: publish events, push and resolve stack items, pass
//!   priority, advance steps, activate mana abilities, take special actions
//! - [`MatchView`]: serializable snapshot for presentation
//! - [`MatchWorker`] / [`MatchHandle`]: async ownership and client access
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::core::{PlayerId, RulesConfig};
//! use ccg_rules::engine::{MatchEngine, PriorityOutcome, ResolveOutcome};
//! use ccg_rules::stack::StackItem;
//!
//! let mut engine = MatchEngine::new(["alice", "bob"], RulesConfig::default());
//! engine.push(StackItem::spell("bolt", "alice", "lightning-bolt"));
//!
//! engine.pass_priority(&PlayerId::new("alice")).unwrap();
//! let outcome = engine.pass_priority(&PlayerId::new("bob")).unwrap();
//! assert_eq!(outcome, PriorityOutcome::Resolved(ResolveOutcome::Resolved { id: "bolt".into() }));
//! ```

mod match_engine;
mod worker;

pub use match_engine::{MatchEngine, MatchView, PriorityOutcome, ResolveOutcome};
pub use worker::{Intent, MatchHandle, MatchWorker, DEFAULT_QUEUE_CAPACITY};
