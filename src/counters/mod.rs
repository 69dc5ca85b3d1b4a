//! Generic counters on game objects.
//!
//! Counters are plain named tallies. A counter whose name reads as a
//! power/toughness pair ("+1/+1", "-2/-2") is also a [`BoostCounter`];
//! the rules core only interprets that encoding, never what a counter
//! means for a specific card.

pub mod counter;
pub mod boost;
pub mod types;
pub mod operations;

pub use counter::{Counter, Counters};
pub use boost::{boost_name, parse_boost_name, BoostCounter};
pub use types::CounterType;
pub use operations::CounterOperations;
