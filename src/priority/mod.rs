//! Priority: who may act, and what they may do.
//!
//! ## Key Components
//!
//! - [`PriorityTracker`]: priority holder and consecutive passes
//! - [`PriorityWindowManager`]: restricted windows during casting and
//!   resolution (mana payment, choices, special actions)
//! - [`SpecialActionManager`]: timing rules and counts for actions that
//!   don't use the stack
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::core::PlayerId;
//! use ccg_rules::priority::{PassOutcome, PriorityTracker};
//!
//! let mut tracker = PriorityTracker::new(["alice", "bob"]);
//! tracker.pass(&PlayerId::new("alice")).unwrap();
//! let outcome = tracker.pass(&PlayerId::new("bob")).unwrap();
//! assert_eq!(outcome, PassOutcome::AllPassed);
//! ```

mod special;
mod tracker;
mod window;

pub use special::{ActionTiming, SpecialAction, SpecialActionManager, SpecialActionRestriction, SpecialActionType};
pub use tracker::{PassOutcome, PriorityTracker};
pub use window::{ActionType, PriorityWindow, PriorityWindowManager, PriorityWindowType};
