//! Notes: the raw field content that cards are generated from.

use serde::{Deserialize, Serialize};

use crate::clock;
use crate::guid::guid64;

/// A row of the `notes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Creation time in epoch milliseconds, made unique on insert.
    pub id: i64,
    /// Globally unique id used for syncing and import matching.
    pub guid: String,
    /// Note type id.
    pub mid: i64,
    /// Modification time, epoch milliseconds. Set on save.
    #[serde(rename = "mod")]
    pub mtime: i64,
    /// Update sequence number; -1 means not yet pushed.
    pub usn: i64,
    /// Tags.
    pub tags: Vec<String>,
    /// Field values in note type order.
    pub flds: Vec<String>,
    /// Sort field. Derived from `flds[0]` on save.
    pub sfld: String,
    /// Duplicate-check checksum. Derived from `flds[0]` on save.
    pub csum: i64,
    /// Unused.
    pub flags: i64,
    /// Unused.
    pub data: String,
}

impl Note {
    /// A new note of type `mid` with the given field values.
    ///
    /// The id defaults to the current time in milliseconds and the GUID to a
    /// fresh random one; both are made unique when the note is inserted.
    pub fn new<I, S>(mid: i64, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: clock::now_millis(),
            guid: guid64(),
            mid,
            mtime: 0,
            usn: -1,
            tags: Vec::new(),
            flds: fields.into_iter().map(Into::into).collect(),
            sfld: String::new(),
            csum: 0,
            flags: 0,
            data: String::new(),
        }
    }

    /// Use `id` as the insert candidate.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Use `guid` as the insert candidate.
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The first field, which drives `sfld` and `csum`.
    pub fn first_field(&self) -> Option<&str> {
        self.flds.first().map(String::as_str)
    }

    /// Whether the note carries `tag` (case-insensitive, like Anki).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_defaults() {
        let note = Note::new(42, ["front", "back"]);
        assert_eq!(note.mid, 42);
        assert_eq!(note.usn, -1);
        assert_eq!(note.flds, vec!["front", "back"]);
        assert_eq!(note.first_field(), Some("front"));
        assert!(note.id > 0);
        assert!(!note.guid.is_empty());
    }

    #[test]
    fn test_builders() {
        let note = Note::new(1, ["q"])
            .with_id(5)
            .with_guid("abc")
            .with_tags(["Verb", "n5"]);
        assert_eq!(note.id, 5);
        assert_eq!(note.guid, "abc");
        assert!(note.has_tag("verb"));
        assert!(!note.has_tag("noun"));
    }

    #[test]
    fn test_note_without_fields() {
        let note = Note::new(1, Vec::<String>::new());
        assert_eq!(note.first_field(), None);
    }
}
