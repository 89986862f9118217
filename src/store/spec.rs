//! Store definitions and the factory that instantiates them.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::StoreSettings;

use super::guarded::{EqualityMode, GuardedStore};

/// Handler for one action: receives the store instance and the action payload.
pub type ActionHandler = Arc<dyn Fn(&GuardedStore, &Value) + Send + Sync>;

/// Called once after construction to seed the initial state.
pub type InitializeFn = Arc<dyn Fn(&GuardedStore) + Send + Sync>;

/// Declarative description of a store class.
#[derive(Clone)]
pub struct StoreSpec {
    store_name: String,
    handlers: BTreeMap<String, ActionHandler>,
    initialize: Option<InitializeFn>,
    equality: EqualityMode,
}

impl StoreSpec {
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            handlers: BTreeMap::new(),
            initialize: None,
            equality: EqualityMode::default(),
        }
    }

    /// Route `action` to `handler`. A later registration for the same action wins.
    pub fn handler<F>(mut self, action: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&GuardedStore, &Value) + Send + Sync + 'static,
    {
        self.handlers.insert(action.into(), Arc::new(handler));
        self
    }

    /// Run after the default empty-map initialization.
    pub fn initialize<F>(mut self, initialize: F) -> Self
    where
        F: Fn(&GuardedStore) + Send + Sync + 'static,
    {
        self.initialize = Some(Arc::new(initialize));
        self
    }

    pub fn equality(mut self, equality: EqualityMode) -> Self {
        self.equality = equality;
        self
    }

    /// Apply store defaults loaded from settings.
    pub fn settings(self, settings: &StoreSettings) -> Self {
        self.equality(settings.equality)
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }
}

/// Turn a store definition into a factory of guarded stores.
pub fn create_immutable_store(spec: StoreSpec) -> StoreFactory {
    StoreFactory {
        spec: Arc::new(spec),
    }
}

/// Creates [`GuardedStore`] instances from a [`StoreSpec`].
#[derive(Clone)]
pub struct StoreFactory {
    spec: Arc<StoreSpec>,
}

impl StoreFactory {
    pub fn store_name(&self) -> &str {
        &self.spec.store_name
    }

    pub fn create(&self) -> GuardedStore {
        let store = GuardedStore::with_equality(self.spec.store_name.clone(), self.spec.equality);
        if let Some(initialize) = &self.spec.initialize {
            initialize(&store);
        }
        store
    }

    pub fn handles(&self, action: &str) -> bool {
        self.spec.handlers.contains_key(action)
    }

    pub fn handler_for(&self, action: &str) -> Option<ActionHandler> {
        self.spec.handlers.get(action).cloned()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.spec.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for StoreFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreFactory")
            .field("store_name", &self.spec.store_name)
            .field("actions", &self.actions().collect::<Vec<_>>())
            .field("equality", &self.spec.equality)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_applies_initialize_override() {
        let factory = create_immutable_store(
            StoreSpec::new("TodoStore").initialize(|store| {
                store.rehydrate(&json!({"todos": []}));
            }),
        );
        let store = factory.create();
        assert_eq!(store.name(), "TodoStore");
        assert_eq!(store.dehydrate_plain(), json!({"todos": []}));
    }

    #[test]
    fn each_create_is_a_fresh_instance() {
        let factory = create_immutable_store(StoreSpec::new("S"));
        let a = factory.create();
        let b = factory.create();
        a.set_state(json!({"x": 1}));
        assert!(!a.ptr_eq(&b));
        assert_eq!(b.dehydrate_plain(), json!({}));
    }

    #[test]
    fn handlers_are_looked_up_by_action() {
        let factory = create_immutable_store(
            StoreSpec::new("S").handler("ADD", |store, payload| {
                store.merge_state(payload);
            }),
        );
        assert!(factory.handles("ADD"));
        assert!(!factory.handles("REMOVE"));
        let store = factory.create();
        if let Some(handler) = factory.handler_for("ADD") {
            handler(&store, &json!({"a": 1}));
        }
        assert_eq!(store.dehydrate_plain(), json!({"a": 1}));
    }

    #[test]
    fn equality_mode_is_passed_to_instances() {
        let factory = create_immutable_store(StoreSpec::new("S").equality(EqualityMode::Reference));
        assert_eq!(factory.create().equality(), EqualityMode::Reference);
    }
}
