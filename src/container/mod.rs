//! Container wrapper: a thin component around another component that checks its props
//! for plain mutable values and, optionally, derives extra props from stores.

mod connector;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::{default_sink, WarningSink};
use crate::mixin::ComponentSpec;
use crate::store::{DispatchError, DispatcherContext, GuardedStore};
use crate::value::PropMap;

pub use connector::ContainerInstance;

/// Derives props from one store, given the container's own props.
pub type StorePropsFn = Arc<dyn Fn(&GuardedStore, &PropMap) -> PropMap + Send + Sync>;

/// Options accepted by [`wrap`].
#[derive(Clone, Default)]
pub struct ContainerOptions {
    ignore: Vec<String>,
    ignore_warnings: bool,
    stores: Vec<String>,
    get_state_from_stores: BTreeMap<String, StorePropsFn>,
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props that are never checked for mutability.
    pub fn ignore<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn ignore_warnings(mut self, ignore: bool) -> Self {
        self.ignore_warnings = ignore;
        self
    }

    /// Stores to subscribe to. Defaults to every store with a props provider.
    pub fn stores<I, S>(mut self, stores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stores.extend(stores.into_iter().map(Into::into));
        self
    }

    /// Derive props from `store` whenever it changes.
    pub fn state_from_store<F>(mut self, store: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&GuardedStore, &PropMap) -> PropMap + Send + Sync + 'static,
    {
        self.get_state_from_stores.insert(store.into(), Arc::new(derive));
        self
    }

    fn store_names(&self) -> Vec<String> {
        if self.stores.is_empty() {
            self.get_state_from_stores.keys().cloned().collect()
        } else {
            self.stores.clone()
        }
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("ignore", &self.ignore)
            .field("ignore_warnings", &self.ignore_warnings)
            .field("stores", &self.store_names())
            .finish()
    }
}

/// A wrapped component, ready to be mounted.
#[derive(Clone)]
pub struct ImmutableContainer {
    wrapped: String,
    display_name: String,
    options: ContainerOptions,
    stores: Vec<String>,
    sink: Arc<dyn WarningSink>,
}

/// Wrap `component` in an immutability-checking container.
pub fn wrap(component: &ComponentSpec, options: ContainerOptions) -> ImmutableContainer {
    let stores = options.store_names();
    let wrapped = component.display_name().to_string();
    let display_name = if stores.is_empty() {
        format!("{wrapped}:Immutable")
    } else {
        format!("{wrapped}:ImmutableStoreConnector")
    };

    ImmutableContainer {
        wrapped,
        display_name,
        options,
        stores,
        sink: default_sink(),
    }
}

impl ImmutableContainer {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Name of the wrapped component.
    pub fn wrapped_name(&self) -> &str {
        &self.wrapped
    }

    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Mount the container with its initial props.
    ///
    /// A container that subscribes to stores needs a `context` to resolve them.
    pub fn mount(
        &self,
        props: PropMap,
        context: Option<&DispatcherContext>,
    ) -> Result<ContainerInstance, DispatchError> {
        let stores = match (self.stores.is_empty(), context) {
            (true, _) => Vec::new(),
            (false, Some(context)) => self
                .stores
                .iter()
                .map(|name| context.get_store(name))
                .collect::<Result<Vec<_>, _>>()?,
            (false, None) => {
                return Err(DispatchError::MissingContext {
                    component: self.display_name.clone(),
                })
            }
        };

        Ok(ContainerInstance::mount(self, props, stores))
    }
}

impl fmt::Debug for ImmutableContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableContainer")
            .field("display_name", &self.display_name)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_without_stores() {
        let container = wrap(&ComponentSpec::new("Dummy"), ContainerOptions::new());
        assert_eq!(container.display_name(), "Dummy:Immutable");
        assert!(container.stores().is_empty());
    }

    #[test]
    fn store_list_defaults_to_provider_keys() {
        let options = ContainerOptions::new().state_from_store("DummyStore", |_, _| PropMap::new());
        let container = wrap(&ComponentSpec::new("Dummy"), options);
        assert_eq!(container.display_name(), "Dummy:ImmutableStoreConnector");
        assert_eq!(container.stores(), ["DummyStore".to_string()]);
    }

    #[test]
    fn explicit_store_list_wins() {
        let options = ContainerOptions::new()
            .stores(["A"])
            .state_from_store("B", |_, _| PropMap::new());
        let container = wrap(&ComponentSpec::new("Dummy"), options);
        assert_eq!(container.stores(), ["A".to_string()]);
    }

    #[test]
    fn store_container_requires_context() {
        let options = ContainerOptions::new().stores(["DummyStore"]);
        let container = wrap(&ComponentSpec::new("Dummy"), options);
        let err = container.mount(PropMap::new(), None).unwrap_err();
        assert!(matches!(err, DispatchError::MissingContext { .. }));
    }
}
