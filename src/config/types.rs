use serde::{Deserialize, Serialize};

use crate::exemption::ExemptionMap;
use crate::store::EqualityMode;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Factory-level change-gate configuration.
    #[serde(default)]
    pub mixin: MixinConfig,
    #[serde(default)]
    pub store: StoreSettings,
}

/// Change-gate configuration as declared at one level (instance, component or factory).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixinConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_immutable_check: Option<ExemptionConfig>,
    /// Suppress every non-immutable warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_all_warnings: Option<bool>,
}

impl MixinConfig {
    pub fn with_exemptions(mut self, exemptions: ExemptionConfig) -> Self {
        self.ignore_immutable_check = Some(exemptions);
        self
    }

    pub fn with_ignore_all_warnings(mut self, ignore: bool) -> Self {
        self.ignore_all_warnings = Some(ignore);
        self
    }
}

/// Exemption declaration with `props` and `state` partitions.
///
/// Any other top-level key applies to both partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExemptionConfig {
    #[serde(default)]
    pub props: ExemptionMap,
    #[serde(default)]
    pub state: ExemptionMap,
    #[serde(flatten)]
    pub shared: ExemptionMap,
}

/// Store defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// How `set_state` decides whether the new value is a change.
    #[serde(default)]
    pub equality: EqualityMode,
}
