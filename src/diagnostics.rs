//! Developer warnings for non-immutable values.
//!
//! Warnings never affect control flow. They go to a [`WarningSink`]; the default sink
//! logs through `tracing` at `warn` level.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Receives formatted non-immutable warnings.
pub trait WarningSink: Send + Sync {
    fn warn(&self, component: &str, key: &str, message: &str);
}

/// Logs warnings through `tracing::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, component: &str, key: &str, message: &str) {
        tracing::warn!(component = %component, key = %key, "{}", message);
    }
}

/// Keeps every warning in memory. Used by tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.lock().iter().any(|m| m == message)
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl WarningSink for RecordingSink {
    fn warn(&self, _component: &str, _key: &str, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub fn default_sink() -> Arc<dyn WarningSink> {
    Arc::new(TracingSink)
}

/// Wording of the warning, which differs between the change-gate and the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningStyle {
    /// `WARN: component: <name> received non-immutable object: <key>`
    Mixin,
    /// `Component "<name>" received non-immutable object for "<key>"`
    Container,
}

impl WarningStyle {
    pub fn format(self, component: &str, key: &str) -> String {
        match self {
            WarningStyle::Mixin => format!(
                "WARN: component: {component} received non-immutable object: {key}"
            ),
            WarningStyle::Container => format!(
                "Component \"{component}\" received non-immutable object for \"{key}\""
            ),
        }
    }
}

/// Who is warning, in which wording, and where to.
#[derive(Clone)]
pub struct WarningContext {
    component: String,
    style: WarningStyle,
    sink: Arc<dyn WarningSink>,
    enabled: bool,
}

impl WarningContext {
    pub fn new(component: impl Into<String>, style: WarningStyle, sink: Arc<dyn WarningSink>) -> Self {
        Self {
            component: component.into(),
            style,
            sink,
            enabled: true,
        }
    }

    /// A context that never reports anything.
    pub fn silent() -> Self {
        Self {
            component: String::new(),
            style: WarningStyle::Mixin,
            sink: default_sink(),
            enabled: false,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Report one non-immutable value under `key`.
    pub fn warn_non_immutable(&self, key: &str) {
        if !self.enabled {
            return;
        }
        let message = self.style.format(&self.component, key);
        self.sink.warn(&self.component, key, &message);
    }
}

impl fmt::Debug for WarningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningContext")
            .field("component", &self.component)
            .field("style", &self.style)
            .field("enabled", &self.enabled)
            .finish()
    }
}
