//! Watchers: stateful observers of the event stream.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::events::{Event, EventType};
//! use ccg_rules::watchers::{SpellsCastWatcher, WatcherRegistry, WatcherScope};
//!
//! let registry = WatcherRegistry::new();
//! let key = registry
//!     .add_watcher(Box::new(SpellsCastWatcher::new(WatcherScope::Game)))
//!     .unwrap();
//!
//! registry.notify_watchers(&Event::new(EventType::SpellCast, "bolt", "bolt", "alice"));
//! assert!(registry.condition_met(&key));
//!
//! registry.reset_watchers();
//! assert!(!registry.condition_met(&key));
//! ```

pub mod watcher;
pub mod registry;
pub mod common;

pub use watcher::{Watcher, WatcherBase, WatcherScope};
pub use registry::WatcherRegistry;
pub use common::{CardsDrawnWatcher, CreaturesDiedWatcher, PermanentsEnteredWatcher, SpellsCastWatcher};
