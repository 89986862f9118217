use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

use super::persistent::numbers_equal;
use super::PersistentValue;

/// Scalar prop values. These are never flagged as mutable objects.
#[derive(Debug, Clone)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Null, Primitive::Null) => true,
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            (Primitive::Number(a), Primitive::Number(b)) => numbers_equal(a, b),
            (Primitive::String(a), Primitive::String(b)) => a == b,
            _ => false,
        }
    }
}

/// A framework-native element.
///
/// Elements are opaque to the equality checker: they are never reported as mutable
/// objects and they compare by identity.
#[derive(Clone)]
pub struct Element(Arc<ElementData>);

struct ElementData {
    kind: String,
    props: PropMap,
}

impl Element {
    pub fn new(kind: impl Into<String>, props: PropMap) -> Self {
        Element(Arc::new(ElementData {
            kind: kind.into(),
            props,
        }))
    }

    /// The component or tag name this element renders.
    pub fn kind(&self) -> &str {
        &self.0.kind
    }

    pub fn props(&self) -> &PropMap {
        &self.0.props
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.0.kind)
            .field("props", &self.0.props)
            .finish()
    }
}

/// A single prop or state entry, classified once when it enters the map.
#[derive(Debug, Clone)]
pub enum PropValue {
    Primitive(Primitive),
    Element(Element),
    Persistent(PersistentValue),
    /// A plain mutable object or array. Compared by identity only.
    Plain(Arc<Value>),
}

impl PropValue {
    /// Classify a plain JSON-like value: scalars are primitives, objects and arrays
    /// stay plain.
    pub fn plain(value: Value) -> Self {
        match value {
            Value::Null => PropValue::Primitive(Primitive::Null),
            Value::Bool(b) => PropValue::Primitive(Primitive::Bool(b)),
            Value::Number(n) => PropValue::Primitive(Primitive::Number(n)),
            Value::String(s) => PropValue::Primitive(Primitive::String(s)),
            other => PropValue::Plain(Arc::new(other)),
        }
    }

    /// True for values that should have been immutable but are not.
    pub fn is_non_immutable(&self) -> bool {
        matches!(self, PropValue::Plain(_))
    }

    /// Shallow value comparison: primitives by value, persistent values by contents,
    /// elements and plain objects by identity.
    pub fn same_value(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Primitive(a), PropValue::Primitive(b)) => a == b,
            (PropValue::Persistent(a), PropValue::Persistent(b)) => a == b,
            (PropValue::Element(a), PropValue::Element(b)) => a.ptr_eq(b),
            (PropValue::Plain(a), PropValue::Plain(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::plain(value)
    }
}

impl From<PersistentValue> for PropValue {
    fn from(value: PersistentValue) -> Self {
        PropValue::Persistent(value)
    }
}

impl From<Element> for PropValue {
    fn from(value: Element) -> Self {
        PropValue::Element(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Primitive(Primitive::Bool(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Primitive(Primitive::Number(Number::from(value)))
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Primitive(Primitive::String(value.to_string()))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Primitive(Primitive::String(value))
    }
}

/// Props or state of a component.
///
/// Cloning shares the underlying map, so two clones are the "same reference" as far
/// as [`PropMap::same`] is concerned. Writing through a shared handle copies first.
#[derive(Clone, Default)]
pub struct PropMap(Arc<BTreeMap<String, PropValue>>);

impl PropMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into());
    }

    /// Copy every entry of `other` over this map.
    pub fn extend(&mut self, other: &PropMap) {
        if other.is_empty() {
            return;
        }
        let entries = Arc::make_mut(&mut self.0);
        for (key, value) in other.iter() {
            entries.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    /// Reference equality of the two maps.
    pub fn same(&self, other: &PropMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Expose the top-level entries of a persistent map as persistent prop values.
    /// Non-map values yield an empty map.
    pub fn from_persistent(value: &PersistentValue) -> Self {
        value
            .as_map()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), PropValue::Persistent(v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for PropMap
where
    K: Into<String>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PropMap(Arc::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}

impl fmt::Debug for PropMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}
