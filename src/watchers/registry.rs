//! Watcher registry.
//!
//! The registry owns every watcher of a match, indexes them by scope, and
//! forwards events to them. It is shared between the worker that publishes
//! events and readers answering "has X happened" queries, so its state sits
//! behind a reader/writer lock.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Result, RulesError};
use crate::events::{Event, EventBus, SubscriptionHandle};

use super::watcher::{Watcher, WatcherScope};

#[derive(Debug, Default)]
struct Inner {
    watchers: BTreeMap<String, Box<dyn Watcher>>,
    by_scope: FxHashMap<WatcherScope, Vec<String>>,
}

/// Keyed store of watchers.
#[derive(Debug, Default)]
pub struct WatcherRegistry {
    inner: RwLock<Inner>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key a watcher would be registered under.
    ///
    /// An explicit key wins. Otherwise the key is the watcher's kind,
    /// qualified by its controller (player scope) or source (object scope).
    #[must_use]
    pub fn derive_key(watcher: &dyn Watcher) -> String {
        if !watcher.key().is_empty() {
            return watcher.key().to_string();
        }
        let base = watcher.base();
        let owner = match watcher.scope() {
            WatcherScope::Game => "",
            WatcherScope::Player => base.controller.as_str(),
            WatcherScope::Object => base.source.as_str(),
        };
        if owner.is_empty() {
            watcher.kind().to_string()
        } else {
            format!("{}:{}", watcher.kind(), owner)
        }
    }

    /// Register a watcher and return its key.
    ///
    /// Fails if another watcher already holds the key.
    pub fn add_watcher(&self, mut watcher: Box<dyn Watcher>) -> Result<String> {
        let key = Self::derive_key(watcher.as_ref());
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.watchers.contains_key(&key) {
            return Err(RulesError::DuplicateWatcher(key));
        }
        watcher.base_mut().key = key.clone();
        let scope = watcher.scope();
        inner.by_scope.entry(scope).or_default().push(key.clone());
        inner.watchers.insert(key.clone(), watcher);
        debug!(key = %key, scope = %scope, "add_watcher()");
        Ok(key)
    }

    /// Unregister a watcher. It receives no further events.
    pub fn remove_watcher(&self, key: &str) -> Option<Box<dyn Watcher>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let watcher = inner.watchers.remove(key)?;
        if let Some(keys) = inner.by_scope.get_mut(&watcher.scope()) {
            keys.retain(|k| k != key);
        }
        Some(watcher)
    }

    /// Deep copy of a registered watcher.
    #[must_use]
    pub fn get_watcher(&self, key: &str) -> Option<Box<dyn Watcher>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.watchers.get(key).map(|w| w.box_clone())
    }

    /// Read a watcher as its concrete type.
    ///
    /// Returns `None` if the key is unknown or the watcher is another type.
    pub fn with_watcher<W, R>(&self, key: &str, f: impl FnOnce(&W) -> R) -> Option<R>
    where
        W: Watcher,
    {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let watcher = inner.watchers.get(key)?;
        watcher.as_any().downcast_ref::<W>().map(f)
    }

    /// Whether the watcher under `key` has seen its condition.
    #[must_use]
    pub fn condition_met(&self, key: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.watchers.get(key).is_some_and(|w| w.condition_met())
    }

    /// Deep copies of every watcher in a scope, in registration order.
    #[must_use]
    pub fn watchers_by_scope(&self, scope: WatcherScope) -> Vec<Box<dyn Watcher>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .by_scope
            .get(&scope)
            .into_iter()
            .flatten()
            .filter_map(|key| inner.watchers.get(key))
            .map(|w| w.box_clone())
            .collect()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.watchers.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).watchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset_watchers(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for watcher in inner.watchers.values_mut() {
            watcher.reset();
        }
    }

    pub fn reset_watchers_by_scope(&self, scope: WatcherScope) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let Inner { watchers, by_scope } = &mut *inner;
        for key in by_scope.get(&scope).into_iter().flatten() {
            if let Some(watcher) = watchers.get_mut(key) {
                watcher.reset();
            }
        }
    }

    /// Show an event to every watcher.
    pub fn notify_watchers(&self, event: &Event) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for watcher in inner.watchers.values_mut() {
            watcher.watch(event);
        }
    }

    /// Feed every event published on `bus` to this registry.
    ///
    /// The subscription holds a weak reference; dropping the registry
    /// silences it.
    pub fn subscribe_to(self: &Arc<Self>, bus: &EventBus) -> SubscriptionHandle {
        let registry = Arc::downgrade(self);
        bus.subscribe(move |event| {
            if let Some(registry) = registry.upgrade() {
                registry.notify_watchers(event);
            }
        })
    }
}
