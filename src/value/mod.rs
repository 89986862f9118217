//! Persistent values and the property values components receive.
//!
//! [`PersistentValue`] is the immutable, structurally comparable value the stores hold.
//! [`PropValue`] classifies whatever a component receives as a prop or state entry.

mod persistent;
mod props;

pub use persistent::PersistentValue;
pub use props::{Element, Primitive, PropMap, PropValue};
