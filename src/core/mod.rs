//! Core types: entities, players, zones, the state boundary, configuration.
//!
//! Everything else in the crate builds on these. None of them carry rules
//! behavior of their own.

pub mod entity;
pub mod player;
pub mod zone;
pub mod state;
pub mod config;

pub use entity::EntityId;
pub use player::PlayerId;
pub use zone::Zone;
pub use state::{CardInfo, GameStateAccessor, PlayerInfo, TableState};
pub use config::RulesConfig;
