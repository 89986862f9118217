//! Store whose whole state is a single persistent value.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::emitter::{EventEmitter, StoreEvent, SubscriptionId, CHANGE_EVENT};
use crate::value::PersistentValue;

/// Errors that can occur when restoring store state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to deserialize state for store '{store}': {source}")]
    Deserialize {
        store: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How `set_state` decides that a new value is a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualityMode {
    /// Equal contents mean no change.
    #[default]
    Structural,
    /// Only the very same persistent node means no change.
    Reference,
}

impl EqualityMode {
    pub fn is_unchanged(self, current: &PersistentValue, next: &PersistentValue) -> bool {
        match self {
            EqualityMode::Structural => current == next,
            EqualityMode::Reference => current.ptr_eq(next),
        }
    }
}

/// Thread-safe store holding one [`PersistentValue`].
///
/// Subscribers are notified at most once per distinct value: replacing the state with an
/// equal value neither mutates the store nor emits. Emission always happens after the
/// state lock is released, so handlers observe the new value.
#[derive(Clone)]
pub struct GuardedStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    name: String,
    equality: EqualityMode,
    state: RwLock<PersistentValue>,
    emitter: EventEmitter,
}

impl GuardedStore {
    /// Create a store with an empty map as its state.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_equality(name, EqualityMode::default())
    }

    pub fn with_equality(name: impl Into<String>, equality: EqualityMode) -> Self {
        let name = name.into();
        let store = Self {
            inner: Arc::new(StoreInner {
                emitter: EventEmitter::new(name.clone()),
                name,
                equality,
                state: RwLock::new(PersistentValue::empty_map()),
            }),
        };
        store.initialize();
        store
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn equality(&self) -> EqualityMode {
        self.inner.equality
    }

    /// Reset the state to an empty map.
    pub fn initialize(&self) {
        *self.inner.state.write() = PersistentValue::empty_map();
    }

    /// Replace the state with the deep conversion of `state`. Never emits.
    pub fn rehydrate(&self, state: &Value) {
        *self.inner.state.write() = PersistentValue::from_plain(state);
        tracing::debug!(store = %self.inner.name, "State rehydrated");
    }

    /// Rehydrate from serialized JSON text.
    pub fn rehydrate_json(&self, text: &str) -> Result<(), StoreError> {
        let value: Value = serde_json::from_str(text).map_err(|e| StoreError::Deserialize {
            store: self.inner.name.clone(),
            source: e,
        })?;
        self.rehydrate(&value);
        Ok(())
    }

    /// The current state itself. Cloning shares structure, nothing is copied.
    pub fn dehydrate(&self) -> PersistentValue {
        self.inner.state.read().clone()
    }

    /// The current state as a plain JSON value.
    pub fn dehydrate_plain(&self) -> Value {
        self.inner.state.read().to_plain()
    }

    pub fn get_state(&self) -> PersistentValue {
        self.dehydrate()
    }

    /// Replace the state and emit the generic change event if it changed.
    pub fn set_state(&self, state: impl Into<PersistentValue>) -> bool {
        self.set_state_with(state, None, None)
    }

    /// Replace the state; on change emit `event` (or the generic change event) with
    /// `payload`. Returns whether the state changed.
    pub fn set_state_with(
        &self,
        state: impl Into<PersistentValue>,
        event: Option<&str>,
        payload: Option<Value>,
    ) -> bool {
        let next = state.into();
        self.replace_with(|_| next, event, payload)
    }

    /// Shallow-merge `fragment` over the state, then behave like `set_state`.
    pub fn merge_state(&self, fragment: impl Into<PersistentValue>) -> bool {
        self.merge_state_with(fragment, None, None)
    }

    pub fn merge_state_with(
        &self,
        fragment: impl Into<PersistentValue>,
        event: Option<&str>,
        payload: Option<Value>,
    ) -> bool {
        let fragment = fragment.into();
        self.replace_with(|current| current.merge(&fragment), event, payload)
    }

    fn replace_with<F>(&self, update: F, event: Option<&str>, payload: Option<Value>) -> bool
    where
        F: FnOnce(&PersistentValue) -> PersistentValue,
    {
        {
            let mut state = self.inner.state.write();
            let next = update(&*state);
            if self.inner.equality.is_unchanged(&*state, &next) {
                tracing::trace!(store = %self.inner.name, "State unchanged, skipping emit");
                return false;
            }
            *state = next;
        }

        let event = event.unwrap_or(CHANGE_EVENT);
        tracing::debug!(store = %self.inner.name, event, "State replaced");
        self.inner.emitter.emit(event, payload.as_ref());
        true
    }

    pub fn on<F>(&self, event: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent<'_>) + Send + Sync + 'static,
    {
        self.inner.emitter.on(event, handler)
    }

    /// Subscribe to the generic change event.
    pub fn on_change<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent<'_>) + Send + Sync + 'static,
    {
        self.on(CHANGE_EVENT, handler)
    }

    pub fn off(&self, id: SubscriptionId) -> bool {
        self.inner.emitter.off(id)
    }

    pub fn emit(&self, event: &str, payload: Option<&Value>) -> usize {
        self.inner.emitter.emit(event, payload)
    }

    pub fn emit_change(&self, payload: Option<&Value>) -> usize {
        self.emit(CHANGE_EVENT, payload)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.emitter.listener_count(event)
    }

    /// Whether two handles point to the same store.
    pub fn ptr_eq(&self, other: &GuardedStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for GuardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedStore")
            .field("name", &self.inner.name)
            .field("equality", &self.inner.equality)
            .field("state", &*self.inner.state.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(store: &GuardedStore, event: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        store.on(event, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn starts_with_empty_map() {
        let store = GuardedStore::new("ImmutableStore");
        assert_eq!(store.dehydrate_plain(), json!({}));
    }

    #[test]
    fn rehydrate_sets_state_without_emitting() {
        let store = GuardedStore::new("S");
        let changes = counter(&store, CHANGE_EVENT);
        store.rehydrate(&json!({"list": [1, 2, 3], "error": null}));
        assert_eq!(store.dehydrate_plain(), json!({"list": [1, 2, 3], "error": null}));
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rehydrate_json_reports_malformed_text() {
        let store = GuardedStore::new("S");
        let err = store.rehydrate_json("{not json").unwrap_err();
        assert!(err.to_string().contains("store 'S'"));
        store.rehydrate_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(store.dehydrate_plain(), json!({"a": 1}));
    }

    #[test]
    fn dehydrate_returns_the_held_value() {
        let store = GuardedStore::new("S");
        store.rehydrate(&json!({"a": {"b": 1}}));
        assert!(store.dehydrate().ptr_eq(&store.get_state()));
    }

    #[test]
    fn handler_observes_new_state() {
        let store = GuardedStore::new("S");
        let seen = Arc::new(Mutex::new(None));
        let (s, reader) = (seen.clone(), store.clone());
        store.on_change(move |_| {
            *s.lock() = Some(reader.dehydrate_plain());
        });
        store.set_state(store.get_state().set("list", PersistentValue::list([1i64, 2, 3])));
        assert_eq!(seen.lock().clone(), Some(json!({"list": [1, 2, 3]})));
    }

    #[test]
    fn equal_replacement_is_a_noop() {
        let store = GuardedStore::new("S");
        let changes = counter(&store, CHANGE_EVENT);
        let next = store.get_state().set("list", PersistentValue::list([1i64, 2, 3]));
        assert!(store.set_state(next.clone()));
        assert!(!store.set_state(next.clone()));
        assert!(!store.set_state(next));
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_event_replaces_change_event() {
        let store = GuardedStore::new("S");
        let changes = counter(&store, CHANGE_EVENT);
        let renames = counter(&store, "rename");
        store.set_state_with(store.get_state().set("name", "_mo"), Some("rename"), None);
        assert_eq!(renames.load(Ordering::SeqCst), 1);
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reference_mode_emits_for_equal_but_distinct_values() {
        let store = GuardedStore::with_equality("S", EqualityMode::Reference);
        let changes = counter(&store, CHANGE_EVENT);
        assert!(store.set_state(json!({"a": 1})));
        assert!(store.set_state(json!({"a": 1})));
        let held = store.get_state();
        assert!(!store.set_state(held));
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn initialize_resets_state() {
        let store = GuardedStore::new("S");
        store.rehydrate(&json!({"a": 1}));
        store.initialize();
        assert_eq!(store.dehydrate_plain(), json!({}));
    }

    #[test]
    fn equality_mode_parses_from_snake_case() {
        let mode: EqualityMode = serde_json::from_str("\"reference\"").unwrap();
        assert_eq!(mode, EqualityMode::Reference);
    }
}
