//! Raw search parameters as they arrive from the caller.
//!
//! Keys follow `OPERATOR_fieldPath`; values are loosely typed. Nothing here
//! knows about operators or fields, see [`crate::filter`] for that.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;

/// Loosely typed search value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    /// Multi-valued parameter, e.g. `?search_IN_status=A&search_IN_status=B`.
    List(Vec<String>),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl RawValue {
    /// True-empty only: `""` or `[]`. Whitespace is a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Text(s) => s.is_empty(),
            RawValue::List(items) => items.is_empty(),
            RawValue::Int(_) | RawValue::Float(_) | RawValue::Bool(_) => false,
        }
    }

    /// Convert a JSON value. `null` maps to `None`.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(RawValue::Bool(*b)),
            JsonValue::Number(n) => Some(
                n.as_i64()
                    .map(RawValue::Int)
                    .or_else(|| n.as_u64().map(|u| RawValue::Text(u.to_string())))
                    .or_else(|| n.as_f64().map(RawValue::Float))
                    .unwrap_or_else(|| RawValue::Text(n.to_string())),
            ),
            JsonValue::String(s) => Some(RawValue::Text(s.clone())),
            JsonValue::Array(items) => Some(RawValue::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        JsonValue::Null => None,
                        JsonValue::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )),
            JsonValue::Object(_) => Some(RawValue::Text(value.to_string())),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::List(items) => write!(f, "[{}]", items.join(", ")),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        RawValue::List(items)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Float(x)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

/// Ordered mapping of raw parameter key to optional value.
///
/// ```
/// use crudkit_search::{RawValue, SearchParams};
///
/// let params = SearchParams::with_prefix(
///     [
///         ("search_EQ_name", "alice"),
///         ("search_IN_status", "Active"),
///         ("search_IN_status", "Locked"),
///         ("page", "2"),
///     ],
///     "search_",
/// );
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("EQ_name"), Some(&RawValue::Text("alice".to_owned())));
/// assert!(matches!(params.get("IN_status"), Some(RawValue::List(v)) if v.len() == 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams(BTreeMap<String, Option<RawValue>>);

impl SearchParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    /// Builder-style insert of an explicit null.
    #[must_use]
    pub fn with_null(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<RawValue>) {
        self.0.insert(key.into(), value);
    }

    /// Collapse repeated query/form parameters.
    ///
    /// Blank values are dropped; one remaining value becomes `Text`, several
    /// become `List`, and a key left with none is omitted.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_prefix(pairs, "")
    }

    /// Like [`SearchParams::from_pairs`], keeping only keys that start with
    /// `prefix` and stripping it. An empty prefix keeps every key.
    pub fn with_prefix<I, K, V>(pairs: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            let Some(unprefixed) = key.strip_prefix(prefix) else {
                continue;
            };
            let values = grouped.entry(unprefixed.to_owned()).or_default();
            let value = value.into();
            if !value.trim().is_empty() {
                values.push(value);
            }
        }

        grouped
            .into_iter()
            .filter_map(|(key, mut values)| match values.len() {
                0 => None,
                1 => Some((key, values.pop().map(RawValue::Text))),
                _ => Some((key, Some(RawValue::List(values)))),
            })
            .collect()
    }

    /// Every member of a JSON object is a parameter; `null` stays an explicit null.
    #[must_use]
    pub fn from_json(map: &serde_json::Map<String, JsonValue>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), RawValue::from_json(v)))
            .collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&RawValue>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl FromIterator<(String, Option<RawValue>)> for SearchParams {
    fn from_iter<T: IntoIterator<Item = (String, Option<RawValue>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
