//! Column codecs.
//!
//! Anki flattens structured values into plain SQLite columns:
//!
//! - note tags are a single space-separated string
//! - note fields are joined with the ASCII unit separator (`0x1f`)
//! - the `col` table keeps its configuration, note types, decks and deck
//!   options as JSON objects keyed by id
//!
//! Every JSON collection is checked for duplicate `name`s each time it is
//! encoded, so a collection with two decks called "Default" never reaches disk.

use std::collections::{BTreeMap, HashSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Field separator character (ASCII unit separator).
pub const FIELD_SEPARATOR: char = '\x1f';

/// Tag separator.
pub const TAG_SEPARATOR: char = ' ';

// ============================================================================
// Tags
// ============================================================================

/// Encode note tags into the `notes.tags` column.
pub fn encode_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<&str>>()
        .join(&TAG_SEPARATOR.to_string())
}

/// Decode the `notes.tags` column.
///
/// An empty column decodes to `[""]`, not to an empty list.
pub fn decode_tags(value: &str) -> Vec<String> {
    value
        .trim()
        .split(TAG_SEPARATOR)
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Fields
// ============================================================================

/// Encode note fields into the `notes.flds` column.
///
/// Returns `None` for an empty list so that no empty joined string is stored.
pub fn encode_fields<S: AsRef<str>>(fields: &[S]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .iter()
            .map(AsRef::<str>::as_ref)
            .collect::<Vec<&str>>()
            .join(&FIELD_SEPARATOR.to_string()),
    )
}

/// Decode the `notes.flds` column.
pub fn decode_fields(value: &str) -> Vec<String> {
    value.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

// ============================================================================
// JSON collections
// ============================================================================

/// A value stored inside a JSON collection column that may carry a `name`.
pub trait Named {
    /// The name as text, if the value has a string name.
    fn name(&self) -> Option<&str>;

    /// Canonical JSON text of the `name` attribute, whatever its type.
    ///
    /// Two values clash when their keys are equal, so `1` and `"1"` differ.
    fn name_key(&self) -> Option<String> {
        self.name().map(|name| serde_json::Value::from(name).to_string())
    }
}

impl Named for serde_json::Value {
    fn name(&self) -> Option<&str> {
        self.as_object()?.get("name")?.as_str()
    }

    fn name_key(&self) -> Option<String> {
        self.as_object()?.get("name").map(serde_json::Value::to_string)
    }
}

/// A JSON object column keyed by string (usually a stringified id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonCollection<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for JsonCollection<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> JsonCollection<V> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Get a mutable value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter()
    }

    /// Iterate values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }
}

impl<V: Named> JsonCollection<V> {
    /// Find the first value carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&V> {
        self.values().find(|v| v.name() == Some(name))
    }

    /// Fail with [`Error::DuplicateName`] if two values share a name.
    pub fn check_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for value in self.values() {
            let Some(key) = value.name_key() else {
                continue;
            };
            if seen.contains(&key) {
                let shown = value.name().map_or(key, str::to_string);
                return Err(Error::DuplicateName(shown));
            }
            seen.insert(key);
        }
        Ok(())
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for JsonCollection<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Encode a JSON collection column, rejecting duplicate names.
pub fn encode_collection<V: Named + Serialize>(collection: &JsonCollection<V>) -> Result<String> {
    collection.check_unique_names()?;
    Ok(serde_json::to_string(collection)?)
}

/// Decode a JSON collection column.
pub fn decode_collection<V: DeserializeOwned>(
    column: &'static str,
    value: &str,
) -> Result<JsonCollection<V>> {
    serde_json::from_str(value).map_err(|e| Error::decode(column, e.to_string()))
}

// ============================================================================
// Tag cache
// ============================================================================

/// Encode the collection-level tag cache (`col.tags`).
pub fn encode_tag_cache(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

/// Decode the collection-level tag cache.
///
/// Accepts a JSON array, or an object keyed by tag as written by Anki itself.
pub fn decode_tag_cache(value: &str) -> Result<Vec<String>> {
    let parsed: serde_json::Value =
        serde_json::from_str(value).map_err(|e| Error::decode("tags", e.to_string()))?;
    match parsed {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Err(Error::decode("tags", format!("expected string, got {other}"))),
            })
            .collect(),
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(k, _)| k).collect()),
        other => Err(Error::decode(
            "tags",
            format!("expected array or object, got {other}"),
        )),
    }
}
