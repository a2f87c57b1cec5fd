//! Query parameters and their canonical query-string encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use cms_core::error::{CmsError, CmsResult};

/// Characters escaped in keys and values: everything except RFC 3986 unreserved.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Joined with `,` before encoding.
    List(Vec<String>),
}

impl QueryValue {
    fn raw(&self) -> Option<String> {
        match self {
            QueryValue::Str(s) => Some(s.clone()),
            QueryValue::Int(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::List(items) if items.is_empty() => None,
            QueryValue::List(items) => Some(items.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Int(i64::from(v))
    }
}

impl From<u8> for QueryValue {
    fn from(v: u8) -> Self {
        QueryValue::Int(i64::from(v))
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(v: Vec<String>) -> Self {
        QueryValue::List(v)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(v: Vec<&str>) -> Self {
        QueryValue::List(v.into_iter().map(String::from).collect())
    }
}

/// Insertion-ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryMap::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a parameter, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Set a parameter only when a value is present.
    pub fn insert_opt<V: Into<QueryValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(v) = value {
            self.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Encode parameters as `key=value&...`, in insertion order.
///
/// Lists become comma-separated values; empty lists are dropped.
pub fn parse_query(queries: &QueryMap) -> String {
    queries
        .iter()
        .filter_map(|(key, value)| {
            value.raw().map(|raw| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(&raw, COMPONENT)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Typed read parameters understood by the content API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Full-text search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Reference expansion depth, 1 to 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    /// `html` or `object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_editor_format: Option<String>,
}

impl Queries {
    /// Reject values the service is known to refuse.
    pub fn validate(&self) -> CmsResult<()> {
        if let Some(depth) = self.depth {
            if !(1..=3).contains(&depth) {
                return Err(CmsError::Validation(format!(
                    "depth must be between 1 and 3 (got {depth})"
                )));
            }
        }
        Ok(())
    }

    /// Convert to wire parameters, in a fixed order.
    pub fn to_query_map(&self) -> QueryMap {
        let mut map = QueryMap::new();
        map.insert_opt("draftKey", self.draft_key.clone());
        map.insert_opt("limit", self.limit);
        map.insert_opt("offset", self.offset);
        map.insert_opt("orders", self.orders.clone());
        map.insert_opt("fields", self.fields.clone());
        map.insert_opt("q", self.q.clone());
        map.insert_opt("depth", self.depth);
        map.insert_opt("ids", self.ids.clone());
        map.insert_opt("filters", self.filters.clone());
        map.insert_opt("richEditorFormat", self.rich_editor_format.clone());
        map
    }
}
