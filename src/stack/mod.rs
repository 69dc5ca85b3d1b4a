//! The pending-action stack and its resolution machinery.
//!
//! Spells and abilities wait on the [`StackManager`] and resolve last in,
//! first out. Before an item resolves, the [`LegalityChecker`] confirms it
//! still can; while it resolves, the [`ResolutionContext`] tracks nesting
//! and what players may do mid-resolution.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::stack::{ResolutionContext, StackItem, StackManager};
//!
//! let mut stack = StackManager::new();
//! stack.push(StackItem::spell("bolt-1", "alice", "bolt"));
//! stack.push(StackItem::spell("counter-1", "bob", "counterspell"));
//!
//! let mut resolution = ResolutionContext::new();
//! let top = stack.pop().unwrap();
//! assert_eq!(top.id, "counter-1");
//!
//! resolution.begin_resolution(&top.id).unwrap();
//! assert_eq!(resolution.current_resolving_id(), Some("counter-1"));
//! resolution.end_resolution(&top.id).unwrap();
//! ```

mod command;
mod item;
mod legality;
mod manager;
mod resolution;

pub use command::{command_fn, CommandContext, CommandOutput, EmitEvent, FnCommand, NoOp, Sequence, StackCommand};
pub use item::{RemovalHook, StackItem, StackItemKind, StackItemView};
pub use legality::{extract_targets, LegalityChecker, LegalityVerdict};
pub use manager::StackManager;
pub use resolution::{ResolutionContext, DEFAULT_MAX_RESOLUTION_DEPTH};
