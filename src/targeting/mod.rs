//! Targeting: what a spell may target, and whether its choices hold.
//!
//! - [`TargetRequirement`]: one target slot (type and count bounds)
//! - [`TargetSelection`]: targets chosen for a slot
//! - [`TargetValidator`]: checks choices against the match state
//!
//! Stack items record their chosen targets as a comma list in the
//! `targets` metadata key; [`format_targets`] and [`parse_targets`]
//! convert to and from it.

mod parse;
mod requirement;
mod validator;

pub use parse::{format_targets, parse_target_requirements, parse_targets};
pub use requirement::{TargetRequirement, TargetSelection, TargetType};
pub use validator::TargetValidator;
