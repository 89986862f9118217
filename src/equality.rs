//! Shallow equality over props/state maps.
//!
//! Only top-level entries are compared. Persistent values carry their own structural
//! equality, so anything that should be deep-compared must be stored as a
//! [`PersistentValue`](crate::value::PersistentValue); plain objects only ever compare
//! by identity.

use crate::diagnostics::WarningContext;
use crate::exemption::{exemption_for, ExemptionMap};
use crate::value::PropMap;

/// Compare `current` against `next`, reporting plain mutable values found in `next`.
///
/// Every key of `next` is scanned, even once the answer is known to be `false`, so that
/// all offending keys are reported in one pass.
pub fn shallow_equal(
    current: Option<&PropMap>,
    next: Option<&PropMap>,
    exemptions: &ExemptionMap,
    warnings: &WarningContext,
) -> bool {
    let (current, next) = match (current, next) {
        (None, None) => return true,
        (Some(current), Some(next)) if current.same(next) => return true,
        (Some(current), Some(next)) => (current, next),
        _ => return false,
    };

    let mut equal = current.len() == next.len();

    for (key, next_value) in next.iter() {
        let exemption = exemption_for(exemptions, key);

        if !exemption.skips_warning() && next_value.is_non_immutable() {
            warnings.warn_non_immutable(key);
        }

        if exemption.skips_equality() || !equal {
            continue;
        }

        equal = match current.get(key) {
            Some(current_value) => current_value.same_value(next_value),
            None => false,
        };
    }

    equal
}

/// Report every non-exempt plain mutable value in `map`.
pub fn check_properties(map: &PropMap, exemptions: &ExemptionMap, warnings: &WarningContext) {
    if !warnings.is_enabled() {
        return;
    }
    for (key, value) in map.iter() {
        if !exemption_for(exemptions, key).skips_warning() && value.is_non_immutable() {
            warnings.warn_non_immutable(key);
        }
    }
}
