//! Change-gate behavior for components.
//!
//! A [`ChangeGate`] mounts a [`ComponentSpec`] into a [`GatedComponent`] that:
//!
//! - derives its initial state from the component's `derive_state` hook;
//! - re-derives state on [`GatedComponent::on_change`] unless the component handles it;
//! - skips renders whose props and state are shallow-equal, unless the component
//!   supplies its own decision;
//! - warns about plain mutable values in props and state.

mod component;
mod gate;
mod resolve;

pub use component::{
    ComponentHooks, ComponentSpec, DeriveStateFn, OnChangeFn, RenderFn, ShouldUpdateFn,
};
pub use gate::{ChangeGate, GatedComponent};
pub use resolve::{resolve_config, ResolvedConfig};
