//! Turn structure.
//!
//! A turn is a fixed sequence of twelve (phase, step) pairs. While a
//! creature with first strike is in combat an extra damage step sits in
//! front of regular combat damage; it is dropped again when the turn ends.
//!
//! ```
//! use ccg_rules::turn::{Phase, Step, TurnManager};
//!
//! let mut turns = TurnManager::new("Alice");
//! for _ in 0..11 {
//!     turns.advance_step("");
//! }
//! assert_eq!(turns.turn_number(), 1);
//!
//! assert_eq!(turns.advance_step("Bob"), (Phase::Beginning, Step::Untap));
//! assert_eq!(turns.turn_number(), 2);
//! assert_eq!(turns.priority_player().as_str(), "Bob");
//! ```

mod manager;
mod phase;

pub use manager::{TurnManager, TurnState};
pub use phase::{Phase, Step, BASE_SEQUENCE};
