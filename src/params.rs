//! Request parameter mapping and the absent-value filter.
//!
//! Callers build a [`Params`] mapping where some entries may be unset
//! ([`ParamValue::Absent`]) or explicitly null ([`ParamValue::Null`]). Before a
//! mapping becomes a query string or a form body it is passed through
//! [`filter`], which drops exactly those entries.

use std::collections::BTreeMap;

use serde_json::Value;

/// Separator the remote API expects between list items.
pub const LIST_SEPARATOR: &str = "|";

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text value.
    Text(String),
    /// Integer value, sent in decimal.
    Int(i64),
    /// Multi-value parameter, sent joined by [`LIST_SEPARATOR`].
    List(Vec<String>),
    /// Explicit null; removed by [`filter`].
    Null,
    /// Unset; removed by [`filter`].
    Absent,
}

impl ParamValue {
    /// Returns true for values that [`filter`] removes.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Null | Self::Absent)
    }

    /// Renders the value as it travels on the wire.
    ///
    /// Returns `None` for unset values.
    #[must_use]
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Int(number) => Some(number.to_string()),
            Self::List(items) => Some(items.join(LIST_SEPARATOR)),
            Self::Null | Self::Absent => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|item| (*item).to_string()).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// JSON values map onto the remote API's conventions: `true` is sent as `1`,
/// `false` is left out entirely.
impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(true) => Self::Text("1".to_string()),
            Value::Bool(false) => Self::Absent,
            Value::Number(number) => number
                .as_i64()
                .map_or_else(|| Self::Text(number.to_string()), Self::Int),
            Value::String(text) => Self::Text(text),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Object(map) => Self::Text(Value::Object(map).to_string()),
        }
    }
}

/// Ordered parameter mapping.
///
/// Keys iterate in sorted order so serialized query strings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Sets a presence flag: `1` when `on`, otherwise unset.
    #[must_use]
    pub fn flag(self, key: impl Into<String>, on: bool) -> Self {
        let value = if on {
            ParamValue::Text("1".to_string())
        } else {
            ParamValue::Absent
        };
        self.with(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Returns true when `key` holds a value that survives [`filter`].
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|value| !value.is_unset())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Lays `self` over `defaults`; on a key collision `self` wins.
    #[must_use]
    pub fn merged_over(&self, defaults: &Params) -> Params {
        let mut merged = defaults.clone();
        merged
            .entries
            .extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Key/value pairs ready for URL or form encoding; unset values are skipped.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.to_wire().map(|wire| (key.clone(), wire)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Returns a copy of `params` without absent or null entries.
///
/// Idempotent: filtering an already-filtered mapping returns it unchanged.
#[must_use]
pub fn filter(params: &Params) -> Params {
    Params {
        entries: params
            .entries
            .iter()
            .filter(|(_, value)| !value.is_unset())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}
