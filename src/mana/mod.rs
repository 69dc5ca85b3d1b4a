//! Mana abilities.
//!
//! Mana abilities resolve as soon as they are activated and never go on
//! the stack. That makes them the one way to interrupt a resolution in
//! progress, so the manager guards against an ability activating itself
//! while it is already resolving.
//!
//! ## Key Components
//!
//! - [`ManaAbilityActivationContext`]: in-flight flags and per-window counts
//! - [`ManaAbility`]: id, source, controller and an action
//! - [`TriggeredManaAbility`]: fires off another mana ability, queued FIFO
//! - [`ManaAbilityManager`]: catalogue, activation and the triggered drain
//! - [`ActivationGate`]: payment, window and resolution checks shared by
//!   every activation path
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::mana::{ManaAbility, ManaAbilityManager};
//!
//! let mana = ManaAbilityManager::new();
//! mana.register(ManaAbility::new("forest-g", "forest", "alice", |_: &ManaAbilityManager| Ok(())));
//! mana.activate_by_id("forest-g").unwrap();
//! assert_eq!(mana.activation_context().resolved_count("forest-g"), 1);
//! ```

mod context;
mod gate;
mod manager;

pub use context::ManaAbilityActivationContext;
pub use gate::ActivationGate;
pub use manager::{ManaAbility, ManaAbilityManager, ManaAction, TriggeredManaAbility};
