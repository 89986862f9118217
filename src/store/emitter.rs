//! Named-event emitter backing each store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Event emitted by [`GuardedStore`](super::GuardedStore) when no custom event is named.
pub const CHANGE_EVENT: &str = "change";

/// One emission as seen by a handler.
#[derive(Debug, Clone, Copy)]
pub struct StoreEvent<'a> {
    /// Name of the emitting store.
    pub store: &'a str,
    /// Event name.
    pub name: &'a str,
    pub payload: Option<&'a Value>,
}

/// Callback type for store events.
pub type EventHandler = Arc<dyn Fn(&StoreEvent<'_>) + Send + Sync>;

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    event: String,
    handler: EventHandler,
}

/// Synchronous event emitter.
///
/// Handlers run on the emitting thread, in subscription order. The handler list is
/// snapshotted before dispatch, so handlers may subscribe or unsubscribe re-entrantly.
pub struct EventEmitter {
    owner: String,
    handlers: Mutex<Vec<HandlerEntry>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn on<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent<'_>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push(HandlerEntry {
            id,
            event: event.to_string(),
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns false if it was not subscribed.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|entry| entry.id != id);
        handlers.len() != before
    }

    /// Call every handler subscribed to `event`. Returns how many were called.
    pub fn emit(&self, event: &str, payload: Option<&Value>) -> usize {
        let matching: Vec<HandlerEntry> = self
            .handlers
            .lock()
            .iter()
            .filter(|entry| entry.event == event)
            .cloned()
            .collect();

        let store_event = StoreEvent {
            store: &self.owner,
            name: event,
            payload,
        };
        for entry in &matching {
            (entry.handler)(&store_event);
        }
        tracing::trace!(store = %self.owner, event, listeners = matching.len(), "Event emitted");
        matching.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers
            .lock()
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }
}
