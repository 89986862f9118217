use std::fmt;

use im::{OrdMap, Vector};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// An immutable, structurally comparable value.
///
/// Maps and lists are `im` persistent collections: cloning is cheap, every
/// "modification" returns a new value sharing unchanged structure with the old one,
/// and equality is defined by contents rather than identity.
#[derive(Clone)]
pub enum PersistentValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vector<PersistentValue>),
    Map(OrdMap<String, PersistentValue>),
}

impl PersistentValue {
    /// An empty persistent map.
    pub fn empty_map() -> Self {
        PersistentValue::Map(OrdMap::new())
    }

    /// Build a persistent list from an iterator of values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PersistentValue>,
    {
        PersistentValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Deep conversion from a plain JSON-like value.
    ///
    /// Objects become maps and arrays become lists, recursively.
    pub fn from_plain(value: &Value) -> Self {
        match value {
            Value::Null => PersistentValue::Null,
            Value::Bool(b) => PersistentValue::Bool(*b),
            Value::Number(n) => PersistentValue::Number(n.clone()),
            Value::String(s) => PersistentValue::String(s.clone()),
            Value::Array(items) => {
                PersistentValue::List(items.iter().map(PersistentValue::from_plain).collect())
            }
            Value::Object(entries) => PersistentValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), PersistentValue::from_plain(v)))
                    .collect(),
            ),
        }
    }

    /// Deep conversion back into a plain JSON-like value.
    pub fn to_plain(&self) -> Value {
        match self {
            PersistentValue::Null => Value::Null,
            PersistentValue::Bool(b) => Value::Bool(*b),
            PersistentValue::Number(n) => Value::Number(n.clone()),
            PersistentValue::String(s) => Value::String(s.clone()),
            PersistentValue::List(items) => {
                Value::Array(items.iter().map(PersistentValue::to_plain).collect())
            }
            PersistentValue::Map(entries) => {
                let mut out = Map::new();
                for (k, v) in entries.iter() {
                    out.insert(k.clone(), v.to_plain());
                }
                Value::Object(out)
            }
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, PersistentValue::Map(_))
    }

    pub fn as_map(&self) -> Option<&OrdMap<String, PersistentValue>> {
        match self {
            PersistentValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a top-level key. Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&PersistentValue> {
        self.as_map().and_then(|entries| entries.get(key))
    }

    /// Return a new map with `key` set to `value`.
    ///
    /// A non-map value is treated as an empty map.
    pub fn set(&self, key: impl Into<String>, value: impl Into<PersistentValue>) -> Self {
        let entries = self.as_map().cloned().unwrap_or_default();
        PersistentValue::Map(entries.update(key.into(), value.into()))
    }

    /// Return a new map without `key`. Non-map values are returned unchanged.
    pub fn remove(&self, key: &str) -> Self {
        match self {
            PersistentValue::Map(entries) => PersistentValue::Map(entries.without(key)),
            other => other.clone(),
        }
    }

    /// Number of entries in a map or list; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            PersistentValue::List(items) => items.len(),
            PersistentValue::Map(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shallow key-level merge.
    ///
    /// Top-level keys of `fragment` replace the same keys of `self` wholesale; nested
    /// values are not merged. When either side is not a map the fragment wins.
    pub fn merge(&self, fragment: &PersistentValue) -> Self {
        match (self, fragment) {
            (PersistentValue::Map(current), PersistentValue::Map(incoming)) => {
                let mut out = current.clone();
                for (key, value) in incoming.iter() {
                    out.insert(key.clone(), value.clone());
                }
                PersistentValue::Map(out)
            }
            _ => fragment.clone(),
        }
    }

    /// Recursive merge: maps merge by key, lists merge by index, anything else is
    /// replaced by the incoming value.
    pub fn merge_deep(&self, fragment: &PersistentValue) -> Self {
        match (self, fragment) {
            (PersistentValue::Map(current), PersistentValue::Map(incoming)) => {
                let mut out = current.clone();
                for (key, value) in incoming.iter() {
                    let merged = match current.get(key) {
                        Some(existing) => existing.merge_deep(value),
                        None => value.clone(),
                    };
                    out.insert(key.clone(), merged);
                }
                PersistentValue::Map(out)
            }
            (PersistentValue::List(current), PersistentValue::List(incoming)) => {
                let mut out = current.clone();
                for (index, value) in incoming.iter().enumerate() {
                    if index < out.len() {
                        let merged = out[index].merge_deep(value);
                        out.set(index, merged);
                    } else {
                        out.push_back(value.clone());
                    }
                }
                PersistentValue::List(out)
            }
            _ => fragment.clone(),
        }
    }

    /// Identity comparison: collections must share the same underlying node,
    /// scalars compare by value.
    pub fn ptr_eq(&self, other: &PersistentValue) -> bool {
        match (self, other) {
            (PersistentValue::List(a), PersistentValue::List(b)) => a.ptr_eq(b),
            (PersistentValue::Map(a), PersistentValue::Map(b)) => a.ptr_eq(b),
            (PersistentValue::List(_), _) | (PersistentValue::Map(_), _) => false,
            (a, b) => a == b,
        }
    }
}

/// Numbers compare by value: `1` and `1.0` are the same number.
pub(crate) fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for PersistentValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PersistentValue::Null, PersistentValue::Null) => true,
            (PersistentValue::Bool(a), PersistentValue::Bool(b)) => a == b,
            (PersistentValue::Number(a), PersistentValue::Number(b)) => numbers_equal(a, b),
            (PersistentValue::String(a), PersistentValue::String(b)) => a == b,
            (PersistentValue::List(a), PersistentValue::List(b)) => a == b,
            (PersistentValue::Map(a), PersistentValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for PersistentValue {
    fn default() -> Self {
        PersistentValue::empty_map()
    }
}

impl fmt::Debug for PersistentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistentValue::Null => f.write_str("Null"),
            PersistentValue::Bool(b) => write!(f, "{b}"),
            PersistentValue::Number(n) => write!(f, "{n}"),
            PersistentValue::String(s) => write!(f, "{s:?}"),
            PersistentValue::List(items) => f.debug_list().entries(items.iter()).finish(),
            PersistentValue::Map(entries) => f.debug_map().entries(entries.iter()).finish(),
        }
    }
}

impl From<Value> for PersistentValue {
    fn from(value: Value) -> Self {
        PersistentValue::from_plain(&value)
    }
}

impl From<&Value> for PersistentValue {
    fn from(value: &Value) -> Self {
        PersistentValue::from_plain(value)
    }
}

impl From<bool> for PersistentValue {
    fn from(value: bool) -> Self {
        PersistentValue::Bool(value)
    }
}

impl From<i64> for PersistentValue {
    fn from(value: i64) -> Self {
        PersistentValue::Number(Number::from(value))
    }
}

impl From<&str> for PersistentValue {
    fn from(value: &str) -> Self {
        PersistentValue::String(value.to_string())
    }
}

impl From<String> for PersistentValue {
    fn from(value: String) -> Self {
        PersistentValue::String(value)
    }
}

impl Serialize for PersistentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_plain().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PersistentValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| PersistentValue::from_plain(&value))
    }
}
