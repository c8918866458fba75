//! Pre-save transformations.
//!
//! Each `prepare_*` function takes a record about to be written and returns
//! the record that must actually be stored: unique ids, fresh modification
//! times and derived fields filled in. They only touch the record they are
//! given. The store calls them inside the write transaction, but they work
//! just as well against in-memory lookups:
//!
//! ```
//! use std::collections::{BTreeSet, HashMap};
//!
//! use ankit_collection::clock::FixedClock;
//! use ankit_collection::guid::RandomGuid;
//! use ankit_collection::hooks::{SaveContext, WriteMode, prepare_note};
//! use ankit_collection::Note;
//!
//! let note_ids: BTreeSet<i64> = [5, 6, 7].into();
//! let guids: HashMap<String, i64> = HashMap::new();
//! let clock = FixedClock::from_secs(1_700_000_000);
//! let mut source = RandomGuid;
//! let mut ctx = SaveContext::new(&clock, &mut source);
//!
//! let note = Note::new(1, ["Hello<b>World</b>", "answer"]).with_id(5);
//! let note = prepare_note(note, WriteMode::Insert, &note_ids, &guids, &mut ctx).unwrap();
//! assert_eq!(note.id, 8);
//! assert_eq!(note.sfld, "HelloWorld");
//! ```

use tracing::debug;

use crate::allocator::{GuidLookup, IdLookup, allocate_guid, allocate_id};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::guid::GuidSource;
use crate::records::{COLLECTION_ID, Card, Collection, Note, ReviewLogEntry};

/// Whether a record is being created or overwritten in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// New row; the id is allocated.
    Insert,
    /// Existing row; the id is kept.
    Update,
}

/// Time and GUID sources used while preparing records.
pub struct SaveContext<'a> {
    /// Clock for modification times.
    pub clock: &'a dyn Clock,
    /// Source of replacement GUIDs.
    pub guids: &'a mut dyn GuidSource,
}

impl<'a> SaveContext<'a> {
    /// Bundle a clock and a GUID source.
    pub fn new(clock: &'a dyn Clock, guids: &'a mut dyn GuidSource) -> Self {
        Self { clock, guids }
    }
}

/// Stamp the collection's modification time (seconds).
pub fn prepare_collection(mut col: Collection, clock: &dyn Clock) -> Collection {
    col.id = COLLECTION_ID;
    col.mtime = clock.now_secs();
    col
}

/// Make the note's id and GUID unique, stamp `mod` (milliseconds) and
/// recompute `sfld`/`csum` from the first field.
///
/// Fails with [`Error::Validation`] if the note has no fields.
pub fn prepare_note<I, G>(
    mut note: Note,
    mode: WriteMode,
    ids: &I,
    guids: &G,
    ctx: &mut SaveContext<'_>,
) -> Result<Note>
where
    I: IdLookup + ?Sized,
    G: GuidLookup + ?Sized,
{
    let first = note
        .first_field()
        .ok_or_else(|| Error::Validation("note has no fields".to_string()))?;
    let (sfld, csum) = fingerprint(first);

    let except = match mode {
        WriteMode::Insert => {
            note.id = allocate_id(note.id, ids)?;
            None
        }
        WriteMode::Update => Some(note.id),
    };
    note.guid = allocate_guid(note.guid, except, guids, &mut *ctx.guids)?;
    note.mtime = ctx.clock.now_millis();
    note.sfld = sfld;
    note.csum = csum;

    debug!(id = note.id, guid = %note.guid, csum = note.csum, "prepared note");
    Ok(note)
}

/// Make the card's id unique, stamp `mod` (seconds) and default `due` to the
/// note id.
pub fn prepare_card<I>(mut card: Card, mode: WriteMode, ids: &I, clock: &dyn Clock) -> Result<Card>
where
    I: IdLookup + ?Sized,
{
    if mode == WriteMode::Insert {
        card.id = allocate_id(card.id, ids)?;
    }
    card.mtime = clock.now_secs();
    if card.due.is_none() {
        card.due = Some(card.nid);
    }
    Ok(card)
}

/// Make the review's id unique.
pub fn prepare_review<I>(mut entry: ReviewLogEntry, ids: &I) -> Result<ReviewLogEntry>
where
    I: IdLookup + ?Sized,
{
    entry.id = allocate_id(entry.id, ids)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use super::*;
    use crate::clock::FixedClock;
    use crate::fingerprint::{content_hash, field_checksum};
    use crate::guid::RandomGuid;
    use crate::records::ReviewKind;

    struct Repeating(&'static [&'static str], usize);

    impl GuidSource for Repeating {
        fn next_guid(&mut self) -> String {
            let guid = self.0[self.1 % self.0.len()];
            self.1 += 1;
            guid.to_string()
        }
    }

    const NOW: FixedClock = FixedClock(1_700_000_000_123);

    #[test]
    fn test_collection_mod_in_seconds() {
        let col = Collection::new(&FixedClock(0));
        let col = prepare_collection(col, &NOW);
        assert_eq!(col.mtime, 1_700_000_000);
        assert_eq!(col.id, COLLECTION_ID);
    }

    #[test]
    fn test_note_insert_derives_fields() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let guids: HashMap<String, i64> = HashMap::new();
        let mut source = RandomGuid;
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let note = Note::new(1, ["Hello<b>World</b>", "answer"])
            .with_id(10)
            .with_guid("g");
        let note = prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx).unwrap();

        assert_eq!(note.id, 10);
        assert_eq!(note.guid, "g");
        assert_eq!(note.mtime, 1_700_000_000_123);
        assert_eq!(note.sfld, "HelloWorld");
        let expected = i64::from_str_radix(&content_hash("HelloWorld")[..8], 16).unwrap();
        assert_eq!(note.csum, expected);
    }

    #[test]
    fn test_caller_supplied_derived_fields_are_overwritten() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let guids: HashMap<String, i64> = HashMap::new();
        let mut source = RandomGuid;
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let mut note = Note::new(1, ["cat"]);
        note.sfld = "dog".to_string();
        note.csum = 7;
        let note = prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx).unwrap();
        assert_eq!(note.sfld, "cat");
        assert_eq!(note.csum, field_checksum("cat"));
    }

    #[test]
    fn test_note_id_collision_jumps() {
        let ids: BTreeSet<i64> = [5, 6, 7].into();
        let guids: HashMap<String, i64> = HashMap::new();
        let mut source = RandomGuid;
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let note = Note::new(1, ["q"]).with_id(5);
        let note = prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx).unwrap();
        assert_eq!(note.id, 8);
    }

    #[test]
    fn test_note_update_keeps_id_and_own_guid() {
        let ids: BTreeSet<i64> = [5].into();
        let guids: HashMap<String, i64> = HashMap::from([("g".to_string(), 5)]);
        let mut source = Repeating(&["other"], 0);
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let note = Note::new(1, ["q"]).with_id(5).with_guid("g");
        let note = prepare_note(note, WriteMode::Update, &ids, &guids, &mut ctx).unwrap();
        assert_eq!(note.id, 5);
        assert_eq!(note.guid, "g");
    }

    #[test]
    fn test_note_guid_regenerated_past_repeats() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let guids: HashMap<String, i64> =
            HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        let mut source = Repeating(&["a", "b", "a", "c"], 0);
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let note = Note::new(1, ["q"]).with_id(3).with_guid("b");
        let note = prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx).unwrap();
        assert_eq!(note.guid, "c");
    }

    #[test]
    fn test_note_without_fields_rejected() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let guids: HashMap<String, i64> = HashMap::new();
        let mut source = RandomGuid;
        let mut ctx = SaveContext::new(&NOW, &mut source);

        let note = Note::new(1, Vec::<String>::new());
        let result = prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_card_due_defaults_to_note_id() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let card = prepare_card(Card::new(12345, 1, 0), WriteMode::Insert, &ids, &NOW).unwrap();
        assert_eq!(card.due, Some(12345));
        assert_eq!(card.mtime, 1_700_000_000);
    }

    #[test]
    fn test_card_explicit_due_kept() {
        let ids: BTreeSet<i64> = BTreeSet::new();
        let card = Card::new(12345, 1, 0).with_due(-7);
        let card = prepare_card(card, WriteMode::Insert, &ids, &NOW).unwrap();
        assert_eq!(card.due, Some(-7));
    }

    #[test]
    fn test_card_update_keeps_id() {
        let ids: BTreeSet<i64> = [1, 2].into();
        let card = Card::new(9, 1, 0).with_id(1);
        assert_eq!(prepare_card(card.clone(), WriteMode::Update, &ids, &NOW).unwrap().id, 1);
        assert_eq!(prepare_card(card, WriteMode::Insert, &ids, &NOW).unwrap().id, 3);
    }

    #[test]
    fn test_review_id_allocated() {
        let ids: BTreeSet<i64> = [100].into();
        let entry = ReviewLogEntry::new(1, 3, ReviewKind::Review, 500).with_id(100);
        assert_eq!(prepare_review(entry, &ids).unwrap().id, 101);
    }
}
