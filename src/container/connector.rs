use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::diagnostics::{WarningContext, WarningStyle};
use crate::equality::{check_properties, shallow_equal};
use crate::exemption::{ignore_list, ExemptionMap};
use crate::store::{GuardedStore, SubscriptionId};
use crate::value::{Element, PropMap};

use super::{ImmutableContainer, StorePropsFn};

struct ContainerState {
    own: PropMap,
    derived: PropMap,
    renders: usize,
}

impl ContainerState {
    /// Props handed to the wrapped component: own props overlaid with store props.
    fn combined(&self) -> PropMap {
        overlay(&self.own, &self.derived)
    }
}

/// Everything a store change handler needs, shared with the instance.
struct Connection {
    display_name: String,
    state: Mutex<ContainerState>,
    stores: Vec<GuardedStore>,
    providers: BTreeMap<String, StorePropsFn>,
    exemptions: ExemptionMap,
    warnings: WarningContext,
}

impl Connection {
    fn derive(&self, own: &PropMap) -> PropMap {
        let mut derived = PropMap::new();
        for store in &self.stores {
            if let Some(provider) = self.providers.get(store.name()) {
                derived.extend(&provider(store, own));
            }
        }
        derived
    }

    fn check_all(&self, props: &PropMap) {
        check_properties(props, &self.exemptions, &self.warnings);
    }

    /// Re-derive store props after a store change.
    fn on_store_change(&self, store: &str) {
        let own = self.state.lock().own.clone();
        let derived = self.derive(&own);

        let mut state = self.state.lock();
        let current = state.combined();
        let next = overlay(&state.own, &derived);
        let silent = WarningContext::silent();
        if shallow_equal(Some(&current), Some(&next), &ExemptionMap::new(), &silent) {
            state.derived = derived;
            return;
        }

        self.check_all(&next);
        state.derived = derived;
        state.renders += 1;
        tracing::trace!(component = %self.display_name, store, "Store props changed");
    }
}

fn overlay(own: &PropMap, derived: &PropMap) -> PropMap {
    if derived.is_empty() {
        return own.clone();
    }
    let mut combined = own.clone();
    combined.extend(derived);
    combined
}

/// A mounted container.
///
/// Store subscriptions live as long as the instance; [`ContainerInstance::unmount`]
/// (or dropping the instance) releases them.
pub struct ContainerInstance {
    wrapped: String,
    connection: Arc<Connection>,
    subscriptions: Vec<(GuardedStore, SubscriptionId)>,
}

impl ContainerInstance {
    pub(super) fn mount(
        container: &ImmutableContainer,
        props: PropMap,
        stores: Vec<GuardedStore>,
    ) -> Self {
        let warnings = WarningContext::new(
            container.display_name.clone(),
            WarningStyle::Container,
            container.sink.clone(),
        )
        .with_enabled(!container.options.ignore_warnings);

        let connection = Arc::new(Connection {
            display_name: container.display_name.clone(),
            state: Mutex::new(ContainerState {
                own: props,
                derived: PropMap::new(),
                renders: 0,
            }),
            stores,
            providers: container.options.get_state_from_stores.clone(),
            exemptions: ignore_list(container.options.ignore.iter().cloned()),
            warnings,
        });

        let initial = {
            let own = connection.state.lock().own.clone();
            connection.derive(&own)
        };
        let combined = {
            let mut state = connection.state.lock();
            state.derived = initial;
            state.renders = 1;
            state.combined()
        };
        connection.check_all(&combined);

        let subscriptions = connection
            .stores
            .iter()
            .map(|store| {
                let weak = Arc::downgrade(&connection);
                let id = store.on_change(move |event| {
                    if let Some(connection) = weak.upgrade() {
                        connection.on_store_change(event.store);
                    }
                });
                (store.clone(), id)
            })
            .collect();

        tracing::debug!(
            component = %connection.display_name,
            stores = connection.stores.len(),
            "Container mounted"
        );

        Self {
            wrapped: container.wrapped.clone(),
            connection,
            subscriptions,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.connection.display_name
    }

    /// Own props as last received from the parent.
    pub fn props(&self) -> PropMap {
        self.connection.state.lock().own.clone()
    }

    /// Props currently derived from stores.
    pub fn store_props(&self) -> PropMap {
        self.connection.state.lock().derived.clone()
    }

    pub fn render_count(&self) -> usize {
        self.connection.state.lock().renders
    }

    /// Re-render decision for new own props: any top-level difference re-renders.
    /// No exemptions apply and nothing is reported.
    pub fn should_update(&self, next_props: &PropMap) -> bool {
        let state = self.connection.state.lock();
        let current = state.combined();
        let next = overlay(next_props, &state.derived);
        !shallow_equal(Some(&current), Some(&next), &ExemptionMap::new(), &WarningContext::silent())
    }

    /// Receive new own props. Returns whether the wrapped component re-rendered.
    pub fn receive_props(&mut self, next_props: PropMap) -> bool {
        let rerender = self.should_update(&next_props);
        let combined = {
            let mut state = self.connection.state.lock();
            state.own = next_props;
            if rerender {
                state.renders += 1;
            }
            state.combined()
        };
        if rerender {
            self.connection.check_all(&combined);
        }
        rerender
    }

    /// Scan every current prop, reporting each plain mutable value.
    pub fn check_all(&self) {
        let combined = self.connection.state.lock().combined();
        self.connection.check_all(&combined);
    }

    /// The wrapped component's element, carrying own props overlaid with store props.
    pub fn render(&self) -> Element {
        let combined = self.connection.state.lock().combined();
        Element::new(self.wrapped.clone(), combined)
    }

    /// Release every store subscription. Returns how many were released.
    pub fn unmount(&mut self) -> usize {
        let released = self
            .subscriptions
            .drain(..)
            .filter(|(store, id)| store.off(*id))
            .count();
        if released > 0 {
            tracing::debug!(component = %self.connection.display_name, released, "Container unmounted");
        }
        released
    }
}

impl Drop for ContainerInstance {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ContainerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerInstance")
            .field("display_name", &self.connection.display_name)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
