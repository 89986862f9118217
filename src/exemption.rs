//! Per-key exemptions from the mutability warning and the equality check.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved prop key for nested children. Always fully exempt by default.
pub const CHILDREN_KEY: &str = "children";

/// Config marker for [`Exemption::SkipEquality`].
pub const SKIP_EQUALITY_MARKER: &str = "SKIP_SHOULD_UPDATE";

/// How a single key takes part in change detection.
///
/// In configuration files the marker is written as `true` ([`Exemption::Full`]),
/// `false` ([`Exemption::Checked`]) or `"SKIP_SHOULD_UPDATE"` ([`Exemption::SkipEquality`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ExemptionRepr", into = "ExemptionRepr")]
pub enum Exemption {
    /// Not exempt: warned about and compared.
    #[default]
    Checked,
    /// Neither warned about nor compared.
    Full,
    /// Still warned about, but never a change trigger.
    SkipEquality,
}

impl Exemption {
    pub fn skips_warning(self) -> bool {
        self == Exemption::Full
    }

    pub fn skips_equality(self) -> bool {
        self != Exemption::Checked
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ExemptionRepr {
    Flag(bool),
    Marker(String),
}

impl TryFrom<ExemptionRepr> for Exemption {
    type Error = String;

    fn try_from(repr: ExemptionRepr) -> Result<Self, Self::Error> {
        match repr {
            ExemptionRepr::Flag(true) => Ok(Exemption::Full),
            ExemptionRepr::Flag(false) => Ok(Exemption::Checked),
            ExemptionRepr::Marker(marker) if marker == SKIP_EQUALITY_MARKER => {
                Ok(Exemption::SkipEquality)
            }
            ExemptionRepr::Marker(marker) => Err(format!(
                "unknown exemption marker '{marker}', expected true, false or \"{SKIP_EQUALITY_MARKER}\""
            )),
        }
    }
}

impl From<Exemption> for ExemptionRepr {
    fn from(exemption: Exemption) -> Self {
        match exemption {
            Exemption::Checked => ExemptionRepr::Flag(false),
            Exemption::Full => ExemptionRepr::Flag(true),
            Exemption::SkipEquality => ExemptionRepr::Marker(SKIP_EQUALITY_MARKER.to_string()),
        }
    }
}

/// Key → exemption for one partition (props or state).
pub type ExemptionMap = BTreeMap<String, Exemption>;

/// Look up a key, defaulting to [`Exemption::Checked`].
pub fn exemption_for(map: &ExemptionMap, key: &str) -> Exemption {
    map.get(key).copied().unwrap_or_default()
}

/// Build a partition that fully exempts every listed key.
pub fn ignore_list<I, S>(keys: I) -> ExemptionMap
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    keys.into_iter()
        .map(|key| (key.into(), Exemption::Full))
        .collect()
}

/// Exemptions for both partitions of a component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExemptionSet {
    pub props: ExemptionMap,
    pub state: ExemptionMap,
}

impl ExemptionSet {
    /// Built-in defaults: `children` is fully exempt in props.
    pub fn defaults() -> Self {
        Self {
            props: ignore_list([CHILDREN_KEY]),
            state: ExemptionMap::new(),
        }
    }
}
