//! Response-shape normalization.
//!
//! The upstream API is not consistent about how it wraps collections or encodes tag lists. These
//! helpers accept every shape observed in the wild and reduce them to one canonical form.

use std::marker::PhantomData;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CategoryDto;

/// A collection response whose envelope has not been inspected yet.
///
/// Accepted shapes, in order of precedence:
/// - a bare array: `[...]`
/// - a `data` array: `{"data": [...]}`
/// - a keyed array: `{"<key>": [...]}`
/// - a keyed array nested under `data`: `{"data": {"<key>": [...]}}`
///
/// Any other shape yields an empty list. Individual items must still decode as `T`.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    raw: Value,
    _items: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Listing<T> {
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            _items: PhantomData,
        }
    }

    pub fn into_items(self, key: &str) -> Result<Vec<T>, serde_json::Error> {
        let items = match self.raw {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                Some(Value::Object(mut nested)) => match nested.remove(key) {
                    Some(Value::Array(items)) => items,
                    _ => match map.remove(key) {
                        Some(Value::Array(items)) => items,
                        _ => Vec::new(),
                    },
                },
                _ => match map.remove(key) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
            },
            _ => Vec::new(),
        };

        items.into_iter().map(serde_json::from_value).collect()
    }
}

/// Tag names attached to a post.
///
/// Decodes from a comma-separated string, an array of strings, an array of objects carrying `name`,
/// or `null`. Names are trimmed and blanks dropped; order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagNames(Vec<String>);

impl TagNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(clean(names))
    }

    pub fn from_joined(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::to_string).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined form accepted by the write endpoints.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

fn clean(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    Joined(String),
    Items(Vec<RawTag>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTag {
    Name(String),
    Object {
        #[serde(default)]
        name: String,
    },
    Other(Value),
}

impl<'de> Deserialize<'de> for TagNames {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTags>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self::default(),
            Some(RawTags::Joined(joined)) => Self::from_joined(&joined),
            Some(RawTags::Items(items)) => Self::new(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        RawTag::Name(name) | RawTag::Object { name } => Some(name),
                        RawTag::Other(_) => None,
                    })
                    .collect(),
            ),
        })
    }
}

/// Legacy `category` field: either a bare category name or a category object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryField {
    Name(String),
    Object(CategoryDto),
}

impl CategoryField {
    pub fn into_category(self) -> CategoryDto {
        match self {
            CategoryField::Name(name) => CategoryDto {
                name: name.trim().to_string(),
                ..CategoryDto::default()
            },
            CategoryField::Object(category) => category,
        }
    }
}
