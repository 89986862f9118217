//! Resolution of change-gate configuration across its declaration levels.

use crate::config::{ExemptionConfig, MixinConfig};
use crate::exemption::ExemptionSet;

/// Effective change-gate configuration for one mounted component.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub exemptions: ExemptionSet,
    pub ignore_all_warnings: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_config(None, None, None)
    }
}

/// Merge configuration from the instance, the component class and the factory.
///
/// Exemptions come from the first level that declares any (instance, then component,
/// then factory) and are merged over the built-in defaults, partition by partition.
/// Keys declared outside `props`/`state` apply to both partitions. Warnings are ignored
/// if any level asks for it.
pub fn resolve_config(
    instance: Option<&MixinConfig>,
    constructor: Option<&MixinConfig>,
    factory: Option<&MixinConfig>,
) -> ResolvedConfig {
    let levels = [instance, constructor, factory];

    let declared = levels
        .iter()
        .flatten()
        .find_map(|config| config.ignore_immutable_check.as_ref());

    let ignore_all_warnings = levels
        .iter()
        .flatten()
        .any(|config| config.ignore_all_warnings == Some(true));

    ResolvedConfig {
        exemptions: merge_exemptions(ExemptionSet::defaults(), declared),
        ignore_all_warnings,
    }
}

fn merge_exemptions(mut base: ExemptionSet, declared: Option<&ExemptionConfig>) -> ExemptionSet {
    let Some(declared) = declared else {
        return base;
    };

    base.props
        .extend(declared.props.iter().map(|(k, v)| (k.clone(), *v)));
    base.state
        .extend(declared.state.iter().map(|(k, v)| (k.clone(), *v)));

    for (key, exemption) in &declared.shared {
        base.props.insert(key.clone(), *exemption);
        base.state.insert(key.clone(), *exemption);
    }
    base
}
