//! Named-event listener registry.
//!
//! Listeners are plain callbacks keyed by event name. `emit` takes a snapshot
//! of the listener list before calling anything, so a callback may register
//! or remove listeners (including itself) without deadlocking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Handle returned by [`EventDispatcher::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Table {
    listeners: HashMap<String, Vec<(SubscriptionId, Listener)>>,
}

#[derive(Clone, Default)]
pub struct EventDispatcher {
    table: Arc<Mutex<Table>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`. Listeners run in registration order.
    pub fn on<F>(&self, event: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.table()
            .listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn off(&self, event: &str, id: SubscriptionId) -> bool {
        let mut table = self.table();
        let Some(list) = table.listeners.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            table.listeners.remove(event);
        }
        removed
    }

    /// Call every listener of `event` with `data`. Returns how many ran.
    pub fn emit(&self, event: &str, data: &Value) -> usize {
        let snapshot: Vec<Listener> = self
            .table()
            .listeners
            .get(event)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in &snapshot {
            listener(data);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.table().listeners.get(event).map_or(0, Vec::len)
    }

    fn table(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
