//! The `col` singleton and the typed values of its JSON columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::codec::{JsonCollection, Named};
use crate::defaults;

/// The `col` table holds exactly one row, always with this id.
pub const COLLECTION_ID: i64 = 1;

/// Schema version written to new collections.
pub const SCHEMA_VERSION: i64 = 11;

/// Collection metadata, configuration, note types and decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Always [`COLLECTION_ID`].
    pub id: i64,
    /// Creation time, epoch seconds.
    pub crt: i64,
    /// Last modification, epoch seconds. Reset on every save.
    #[serde(rename = "mod")]
    pub mtime: i64,
    /// Schema modification time, epoch milliseconds.
    ///
    /// A differing `scm` between client and server forces a full sync.
    pub scm: i64,
    /// Schema version.
    pub ver: i64,
    /// Dirty flag. Unused, always 0.
    pub dty: i64,
    /// Update sequence number.
    pub usn: i64,
    /// Last sync time.
    pub ls: i64,
    /// Synced configuration options.
    pub conf: JsonCollection<Value>,
    /// Note types keyed by id.
    pub models: JsonCollection<NoteType>,
    /// Decks keyed by id.
    pub decks: JsonCollection<Deck>,
    /// Deck option groups keyed by id.
    pub dconf: JsonCollection<DeckConfig>,
    /// Tag cache shown in the browser.
    pub tags: Vec<String>,
}

impl Collection {
    /// A new collection with default configuration, the "Default" deck and
    /// its option group. No note types are defined.
    pub fn new<C: Clock + ?Sized>(clock: &C) -> Self {
        let now = clock.now_secs();
        Self {
            id: COLLECTION_ID,
            crt: now,
            mtime: now,
            scm: clock.now_millis(),
            ver: SCHEMA_VERSION,
            dty: 0,
            usn: 0,
            ls: 0,
            conf: defaults::default_config(),
            models: JsonCollection::new(),
            decks: defaults::default_decks(now),
            dconf: defaults::default_deck_configs(),
            tags: defaults::default_tags(),
        }
    }

    /// Add or replace a note type, keyed by its id.
    pub fn add_note_type(&mut self, note_type: NoteType) {
        self.models.insert(note_type.id.to_string(), note_type);
    }

    /// Look up a note type by id.
    pub fn note_type(&self, id: i64) -> Option<&NoteType> {
        self.models.get(&id.to_string())
    }

    /// Add or replace a deck, keyed by its id.
    pub fn add_deck(&mut self, deck: Deck) {
        self.decks.insert(deck.id.to_string(), deck);
    }

    /// Look up a deck by id.
    pub fn deck(&self, id: i64) -> Option<&Deck> {
        self.decks.get(&id.to_string())
    }

    /// Add `tag` to the tag cache if it is not already there.
    pub fn register_tag(&mut self, tag: &str) {
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// A note type (model) entry of `col.models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteType {
    /// Note type id.
    #[serde(default)]
    pub id: i64,
    /// Display name, unique across note types.
    pub name: String,
    /// Fields in order.
    #[serde(default)]
    pub flds: Vec<NoteTypeField>,
    /// Card templates in order; a note gets one card per template.
    #[serde(default)]
    pub tmpls: Vec<CardTemplate>,
    /// Remaining keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NoteType {
    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.flds.iter().map(|f| f.name.as_str())
    }

    /// Number of card templates; valid card ordinals are `0..template_count()`.
    pub fn template_count(&self) -> usize {
        self.tmpls.len()
    }
}

impl Named for NoteType {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// A field definition inside a [`NoteType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTypeField {
    /// Field name.
    pub name: String,
    /// Position.
    #[serde(default)]
    pub ord: i64,
    /// Remaining keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A card template inside a [`NoteType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Template name.
    pub name: String,
    /// Position; becomes `cards.ord`.
    #[serde(default)]
    pub ord: i64,
    /// Question format.
    #[serde(default)]
    pub qfmt: String,
    /// Answer format.
    #[serde(default)]
    pub afmt: String,
    /// Remaining keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A deck entry of `col.decks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck id.
    #[serde(default)]
    pub id: i64,
    /// Full deck name, `::` separated.
    pub name: String,
    /// Remaining keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Named for Deck {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// A deck option group entry of `col.dconf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Option group id.
    #[serde(default)]
    pub id: i64,
    /// Option group name.
    pub name: String,
    /// Remaining keys, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Named for DeckConfig {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::codec::{decode_collection, encode_collection};
    use crate::error::Error;

    #[test]
    fn test_new_collection_defaults() {
        let col = Collection::new(&FixedClock::from_secs(1_700_000_000));
        assert_eq!(col.id, COLLECTION_ID);
        assert_eq!(col.crt, 1_700_000_000);
        assert_eq!(col.scm, 1_700_000_000_000);
        assert_eq!(col.ver, 11);
        assert_eq!(col.dty, 0);
        assert!(col.deck(1).is_some());
        assert!(col.models.is_empty());
        assert!(col.tags.is_empty());
    }

    #[test]
    fn test_note_type_keeps_unknown_keys() {
        let json = r#"{"1": {"id": 1, "name": "Basic", "sortf": 0,
            "flds": [{"name": "Front", "ord": 0, "font": "Arial"}],
            "tmpls": [{"name": "Card 1", "ord": 0, "qfmt": "{{Front}}", "afmt": "{{Back}}"}]}}"#;
        let models: JsonCollection<NoteType> = decode_collection("models", json).unwrap();
        let basic = models.get("1").unwrap();
        assert_eq!(basic.field_names().collect::<Vec<_>>(), vec!["Front"]);
        assert_eq!(basic.template_count(), 1);
        assert_eq!(basic.extra["sortf"], 0);
        assert_eq!(basic.flds[0].extra["font"], "Arial");

        let reencoded = encode_collection(&models).unwrap();
        let again: JsonCollection<NoteType> = decode_collection("models", &reencoded).unwrap();
        assert_eq!(&again, &models);
    }

    #[test]
    fn test_duplicate_deck_names_rejected() {
        let mut col = Collection::new(&FixedClock(0));
        col.add_deck(Deck {
            id: 2,
            name: "Default".to_string(),
            extra: Map::new(),
        });
        assert!(matches!(
            encode_collection(&col.decks),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn test_register_tag_deduplicates() {
        let mut col = Collection::new(&FixedClock(0));
        col.register_tag("verb");
        col.register_tag("verb");
        col.register_tag("");
        assert_eq!(col.tags, vec!["verb"]);
    }
}
