//! Action routing and whole-context state transfer.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::guarded::GuardedStore;
use super::spec::StoreFactory;

/// Errors that can occur while dispatching or transferring state.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Store '{store}' is not registered")]
    StoreNotRegistered { store: String },

    #[error("Cannot dispatch '{action}' while '{current}' is being dispatched")]
    NestedDispatch { action: String, current: String },

    #[error("Invalid dehydrated state: {message}")]
    InvalidState { message: String },

    #[error("Component '{component}' subscribes to stores but was mounted without a dispatcher context")]
    MissingContext { component: String },
}

/// Registry of store factories. Each request or session gets its own
/// [`DispatcherContext`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    factories: BTreeMap<String, StoreFactory>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store factory. Registering the same name again replaces it.
    pub fn register_store(&mut self, factory: StoreFactory) {
        let name = factory.store_name().to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            tracing::warn!(store = %name, "Store registered twice, replacing");
        }
    }

    pub fn is_registered(&self, store: &str) -> bool {
        self.factories.contains_key(store)
    }

    pub fn create_context(&self) -> DispatcherContext {
        DispatcherContext {
            factories: self.factories.clone(),
            stores: Mutex::new(BTreeMap::new()),
            current_action: Mutex::new(None),
        }
    }
}

/// Store instances for one session, created lazily on first use.
pub struct DispatcherContext {
    factories: BTreeMap<String, StoreFactory>,
    stores: Mutex<BTreeMap<String, GuardedStore>>,
    current_action: Mutex<Option<String>>,
}

/// Clears the in-flight action when dispatch finishes, even on panic.
struct DispatchGuard<'a> {
    current: &'a Mutex<Option<String>>,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        *self.current.lock() = None;
    }
}

impl DispatcherContext {
    /// Get (or create) the store instance registered under `name`.
    pub fn get_store(&self, name: &str) -> Result<GuardedStore, DispatchError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DispatchError::StoreNotRegistered {
                store: name.to_string(),
            })?;

        let mut stores = self.stores.lock();
        let store = stores
            .entry(name.to_string())
            .or_insert_with(|| factory.create());
        Ok(store.clone())
    }

    /// Route `action` to every store that handles it.
    ///
    /// Returns how many stores handled the action. Dispatching from inside a handler is
    /// rejected with [`DispatchError::NestedDispatch`].
    pub fn dispatch(&self, action: &str, payload: &Value) -> Result<usize, DispatchError> {
        let _guard = {
            let mut current = self.current_action.lock();
            if let Some(current) = current.as_ref() {
                return Err(DispatchError::NestedDispatch {
                    action: action.to_string(),
                    current: current.clone(),
                });
            }
            *current = Some(action.to_string());
            DispatchGuard {
                current: &self.current_action,
            }
        };

        tracing::debug!(action, "Dispatching action");

        let mut handled = 0;
        for (name, factory) in &self.factories {
            let Some(handler) = factory.handler_for(action) else {
                continue;
            };
            let store = self.get_store(name)?;
            handler(&store, payload);
            handled += 1;
        }

        if handled == 0 {
            tracing::trace!(action, "No store handled action");
        }
        Ok(handled)
    }

    /// Name of the action currently being dispatched, if any.
    pub fn current_action(&self) -> Option<String> {
        self.current_action.lock().clone()
    }

    /// Plain snapshot of every instantiated store: `{"stores": {name: state}}`.
    pub fn dehydrate(&self) -> Value {
        let stores = self.stores.lock();
        let mut out = Map::new();
        for (name, store) in stores.iter() {
            out.insert(name.clone(), store.dehydrate_plain());
        }
        let mut root = Map::new();
        root.insert("stores".to_string(), Value::Object(out));
        Value::Object(root)
    }

    /// Restore a snapshot produced by [`DispatcherContext::dehydrate`]. Never emits.
    ///
    /// Every store named in the snapshot must be registered; otherwise nothing is
    /// restored.
    pub fn rehydrate(&self, state: &Value) -> Result<(), DispatchError> {
        let stores = state
            .get("stores")
            .and_then(Value::as_object)
            .ok_or_else(|| DispatchError::InvalidState {
                message: "expected an object with a 'stores' object".to_string(),
            })?;

        if let Some(missing) = stores.keys().find(|name| !self.factories.contains_key(*name)) {
            return Err(DispatchError::StoreNotRegistered {
                store: missing.clone(),
            });
        }

        for (name, store_state) in stores {
            self.get_store(name)?.rehydrate(store_state);
        }
        Ok(())
    }
}

impl std::fmt::Debug for DispatcherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherContext")
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .field("instantiated", &self.stores.lock().keys().cloned().collect::<Vec<_>>())
            .finish()
    }
}
