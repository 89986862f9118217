//! The change-gate: attaches fast re-render decisions to a component.

use std::fmt;
use std::sync::Arc;

use crate::config::{MixinConfig, Settings};
use crate::diagnostics::{default_sink, WarningContext, WarningSink, WarningStyle};
use crate::equality::{check_properties, shallow_equal};
use crate::value::{Element, PropMap, PropValue};

use super::component::{ComponentSpec, DeriveStateFn, OnChangeFn, RenderFn, ShouldUpdateFn};
use super::resolve::{resolve_config, ResolvedConfig};

/// Factory for gated components, carrying the factory-level configuration.
#[derive(Clone)]
pub struct ChangeGate {
    config: MixinConfig,
    sink: Arc<dyn WarningSink>,
}

/// Re-render decision selected at mount time.
#[derive(Clone)]
enum UpdateDecision {
    Custom(ShouldUpdateFn),
    ShallowCompare,
}

/// Change handler selected at mount time.
#[derive(Clone)]
enum ChangeHandler {
    Custom(OnChangeFn),
    DeriveState(DeriveStateFn),
    Noop,
}

impl ChangeGate {
    pub fn new(config: MixinConfig) -> Self {
        Self {
            config,
            sink: default_sink(),
        }
    }

    /// A gate configured from the `[mixin]` section of loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.mixin.clone())
    }

    /// Route warnings to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &MixinConfig {
        &self.config
    }

    pub fn mount(&self, spec: &ComponentSpec, props: PropMap) -> GatedComponent {
        self.mount_with(spec, props, None)
    }

    /// Mount `spec` with optional instance-level configuration.
    ///
    /// Computes the initial state, resolves the configuration, selects the hooks
    /// (component overrides first) and scans props and state. The render counter
    /// starts at 1 for the initial render; the render hook itself runs only through
    /// [`GatedComponent::render`].
    pub fn mount_with(
        &self,
        spec: &ComponentSpec,
        props: PropMap,
        instance: Option<&MixinConfig>,
    ) -> GatedComponent {
        let hooks = spec.hooks();
        let config = resolve_config(instance, spec.static_config(), Some(&self.config));

        let state = match &hooks.derive_state {
            Some(derive) => derive(&props, &[]),
            None => PropMap::new(),
        };

        let decision = match &hooks.should_update {
            Some(custom) => UpdateDecision::Custom(custom.clone()),
            None => UpdateDecision::ShallowCompare,
        };

        let change_handler = match (&hooks.on_change, &hooks.derive_state) {
            (Some(custom), _) => ChangeHandler::Custom(custom.clone()),
            (None, Some(derive)) => ChangeHandler::DeriveState(derive.clone()),
            (None, None) => ChangeHandler::Noop,
        };

        let warnings = WarningContext::new(spec.display_name(), WarningStyle::Mixin, self.sink.clone())
            .with_enabled(!config.ignore_all_warnings);

        let mut component = GatedComponent {
            display_name: spec.display_name().to_string(),
            props,
            state,
            config,
            decision,
            change_handler,
            render_hook: hooks.render.clone(),
            warnings,
            renders: 0,
        };

        check_properties(&component.props, &component.config.exemptions.props, &component.warnings);
        check_properties(&component.state, &component.config.exemptions.state, &component.warnings);
        component.renders = 1;

        tracing::trace!(component = %component.display_name, "Component mounted");
        component
    }
}

impl Default for ChangeGate {
    fn default() -> Self {
        Self::new(MixinConfig::default())
    }
}

impl fmt::Debug for ChangeGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeGate").field("config", &self.config).finish()
    }
}

/// A mounted component guarded by the change-gate.
pub struct GatedComponent {
    display_name: String,
    props: PropMap,
    state: PropMap,
    config: ResolvedConfig,
    decision: UpdateDecision,
    change_handler: ChangeHandler,
    render_hook: Option<RenderFn>,
    warnings: WarningContext,
    renders: usize,
}

impl GatedComponent {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn props(&self) -> &PropMap {
        &self.props
    }

    pub fn state(&self) -> &PropMap {
        &self.state
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// How many renders were decided, counting the initial one at mount.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Whether the update proposal should re-render. A component-defined decision wins.
    pub fn should_update(&self, next_props: &PropMap, next_state: &PropMap) -> bool {
        match &self.decision {
            UpdateDecision::Custom(decide) => decide(self, next_props, next_state),
            UpdateDecision::ShallowCompare => self.shallow_should_update(next_props, next_state),
        }
    }

    /// The built-in decision: re-render unless both props and state are shallow-equal.
    pub fn shallow_should_update(&self, next_props: &PropMap, next_state: &PropMap) -> bool {
        let exemptions = &self.config.exemptions;
        let props_equal =
            shallow_equal(Some(&self.props), Some(next_props), &exemptions.props, &self.warnings);
        let state_equal =
            shallow_equal(Some(&self.state), Some(next_state), &exemptions.state, &self.warnings);
        !(props_equal && state_equal)
    }

    /// Handle a change notification, typically from a store subscription.
    ///
    /// Without a custom handler, the state is re-derived from `args`; without a
    /// `derive_state` hook this does nothing.
    pub fn on_change(&mut self, args: &[PropValue]) {
        match self.change_handler.clone() {
            ChangeHandler::Custom(handler) => handler(self, args),
            ChangeHandler::DeriveState(derive) => {
                let next_state = derive(&self.props, args);
                self.set_state(next_state);
            }
            ChangeHandler::Noop => {}
        }
    }

    /// Replace local state. Returns whether the component re-rendered.
    pub fn set_state(&mut self, next_state: PropMap) -> bool {
        let next_props = self.props.clone();
        self.update(next_props, next_state)
    }

    /// Receive new props from the parent. Returns whether the component re-rendered.
    pub fn receive_props(&mut self, next_props: PropMap) -> bool {
        let next_state = self.state.clone();
        self.update(next_props, next_state)
    }

    /// Render through the component's render hook, if it has one.
    pub fn render(&self) -> Option<Element> {
        self.render_hook
            .as_ref()
            .map(|render| render(&self.props, &self.state))
    }

    fn update(&mut self, next_props: PropMap, next_state: PropMap) -> bool {
        let rerender = self.should_update(&next_props, &next_state);
        self.props = next_props;
        self.state = next_state;
        if rerender {
            self.renders += 1;
        } else {
            tracing::trace!(component = %self.display_name, "Render skipped");
        }
        rerender
    }
}

impl fmt::Debug for GatedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedComponent")
            .field("display_name", &self.display_name)
            .field("props", &self.props)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("renders", &self.renders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use crate::value::PersistentValue;
    use serde_json::json;

    #[test]
    fn mount_without_hooks_has_empty_state() {
        let component = ChangeGate::default().mount(&ComponentSpec::new("Plain"), PropMap::new());
        assert!(component.state().is_empty());
        assert_eq!(component.render_count(), 1);
        assert!(component.render().is_none());
    }

    #[test]
    fn unchanged_props_skip_render() {
        let spec = ComponentSpec::new("C");
        let mut component = ChangeGate::default().mount(&spec, PropMap::new().with("a", 1i64));
        assert!(!component.receive_props(PropMap::new().with("a", 1i64)));
        assert!(component.receive_props(PropMap::new().with("a", 2i64)));
        assert_eq!(component.render_count(), 2);
    }

    #[test]
    fn custom_decision_wins() {
        let spec = ComponentSpec::new("Always").should_update(|_, _, _| true);
        let component = ChangeGate::default().mount(&spec, PropMap::new());
        let same_props = component.props().clone();
        let same_state = component.state().clone();
        assert!(component.should_update(&same_props, &same_state));
        assert!(!component.shallow_should_update(&same_props, &same_state));
    }

    #[test]
    fn ignore_all_warnings_silences_mount_scan() {
        let sink = RecordingSink::new();
        let gate = ChangeGate::new(MixinConfig::default().with_ignore_all_warnings(true))
            .with_sink(sink.clone());
        gate.mount(&ComponentSpec::new("C"), PropMap::new().with("bad", json!({})));
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn mount_counts_initial_render_without_calling_hook() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let spec = ComponentSpec::new("Lazy").render(move |props, _| {
            c.fetch_add(1, Ordering::SeqCst);
            Element::new("div", props.clone())
        });
        let component = ChangeGate::default().mount(&spec, PropMap::new());
        assert_eq!(component.render_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(component.render().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(component.render_count(), 1);
    }

    #[test]
    fn render_hook_receives_props_and_state() {
        let spec = ComponentSpec::new("Label")
            .derive_state(|_, _| PropMap::new().with("count", PersistentValue::from(2i64)))
            .render(|props, state| {
                let mut merged = props.clone();
                merged.extend(state);
                Element::new("span", merged)
            });
        let component = ChangeGate::default().mount(&spec, PropMap::new().with("text", "hi"));
        let element = component.render().unwrap();
        assert_eq!(element.kind(), "span");
        assert_eq!(element.props().len(), 2);
    }
}
