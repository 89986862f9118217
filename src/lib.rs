//! Immutable state plumbing for unidirectional data flow.
//!
//! The crate supplies two small algorithms and the integration points that reuse them:
//!
//! - **Shallow equality with exemptions** ([`equality`]): compares two property/state maps
//!   key by key, trusting persistent values to carry their own structural equality, and
//!   warns about plain mutable values along the way.
//! - **Guarded state replacement** ([`store`]): a store whose whole state is one
//!   [`PersistentValue`] and which only notifies subscribers when the value really changes.
//!
//! These are wired into a component change-gate ([`mixin`]) and a container wrapper
//! ([`container`]).
//!
//! ```text
//! action ──→ Dispatcher ──→ GuardedStore::set_state ──→ equality gate ──→ "change"
//!                                                                          │
//!   GatedComponent::should_update ←── ContainerInstance re-derives props ←─┘
//! ```

pub mod config;
pub mod container;
pub mod diagnostics;
pub mod equality;
pub mod exemption;
pub mod logging;
pub mod mixin;
pub mod store;
pub mod value;

pub use container::{wrap, ContainerInstance, ContainerOptions, ImmutableContainer};
pub use diagnostics::{RecordingSink, TracingSink, WarningContext, WarningSink, WarningStyle};
pub use equality::{check_properties, shallow_equal};
pub use exemption::{Exemption, ExemptionMap, ExemptionSet};
pub use mixin::{resolve_config, ChangeGate, ComponentSpec, GatedComponent, ResolvedConfig};
pub use store::{
    create_immutable_store, DispatchError, Dispatcher, DispatcherContext, EqualityMode,
    GuardedStore, StoreError, StoreFactory, StoreSpec,
};
pub use value::{Element, PersistentValue, Primitive, PropMap, PropValue};
