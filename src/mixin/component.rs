//! Component definitions with explicit optional hook slots.

use std::fmt;
use std::sync::Arc;

use crate::config::MixinConfig;
use crate::value::{Element, PropMap, PropValue};

use super::gate::GatedComponent;

/// Derive local state from the current props and the change arguments.
pub type DeriveStateFn = Arc<dyn Fn(&PropMap, &[PropValue]) -> PropMap + Send + Sync>;

/// Custom change handler, replacing the default derive-and-set behavior.
pub type OnChangeFn = Arc<dyn Fn(&mut GatedComponent, &[PropValue]) + Send + Sync>;

/// Custom re-render decision: `(component, next_props, next_state) -> should render`.
pub type ShouldUpdateFn = Arc<dyn Fn(&GatedComponent, &PropMap, &PropMap) -> bool + Send + Sync>;

pub type RenderFn = Arc<dyn Fn(&PropMap, &PropMap) -> Element + Send + Sync>;

/// Hooks a component may define. Every slot is optional; a defined slot always wins over
/// the change-gate default.
#[derive(Clone, Default)]
pub struct ComponentHooks {
    pub derive_state: Option<DeriveStateFn>,
    pub on_change: Option<OnChangeFn>,
    pub should_update: Option<ShouldUpdateFn>,
    pub render: Option<RenderFn>,
}

/// A component class: display name, hooks and component-level ("static") configuration.
#[derive(Clone)]
pub struct ComponentSpec {
    display_name: String,
    hooks: ComponentHooks,
    statics: Option<MixinConfig>,
}

impl ComponentSpec {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            hooks: ComponentHooks::default(),
            statics: None,
        }
    }

    pub fn derive_state<F>(mut self, derive: F) -> Self
    where
        F: Fn(&PropMap, &[PropValue]) -> PropMap + Send + Sync + 'static,
    {
        self.hooks.derive_state = Some(Arc::new(derive));
        self
    }

    pub fn on_change<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut GatedComponent, &[PropValue]) + Send + Sync + 'static,
    {
        self.hooks.on_change = Some(Arc::new(handler));
        self
    }

    pub fn should_update<F>(mut self, decide: F) -> Self
    where
        F: Fn(&GatedComponent, &PropMap, &PropMap) -> bool + Send + Sync + 'static,
    {
        self.hooks.should_update = Some(Arc::new(decide));
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&PropMap, &PropMap) -> Element + Send + Sync + 'static,
    {
        self.hooks.render = Some(Arc::new(render));
        self
    }

    /// Component-level change-gate configuration.
    pub fn statics(mut self, config: MixinConfig) -> Self {
        self.statics = Some(config);
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn hooks(&self) -> &ComponentHooks {
        &self.hooks
    }

    pub fn static_config(&self) -> Option<&MixinConfig> {
        self.statics.as_ref()
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("display_name", &self.display_name)
            .field("derive_state", &self.hooks.derive_state.is_some())
            .field("on_change", &self.hooks.on_change.is_some())
            .field("should_update", &self.hooks.should_update.is_some())
            .field("render", &self.hooks.render.is_some())
            .field("statics", &self.statics)
            .finish()
    }
}
