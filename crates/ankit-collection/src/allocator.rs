//! Identifier allocation.
//!
//! Note, card and review ids are millisecond timestamps. Two records created
//! in the same millisecond would collide, so before an insert the candidate id
//! is checked against the target table; on a hit it jumps to `max(id) + 1`.
//! This is a jump, not a linear probe: with ids `{5, 6, 7}` a candidate of 5
//! becomes 8.
//!
//! The check is not atomic with the write. Callers must hold the only writer
//! for the table (see [`CollectionStore`](crate::CollectionStore)).

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::{Error, Result};
use crate::guid::GuidSource;

/// Read access to the ids of one table.
pub trait IdLookup {
    /// Whether a record with `id` exists.
    fn contains_id(&self, id: i64) -> Result<bool>;

    /// The largest id in the table, if it has any rows.
    fn max_id(&self) -> Result<Option<i64>>;
}

impl IdLookup for BTreeSet<i64> {
    fn contains_id(&self, id: i64) -> Result<bool> {
        Ok(self.contains(&id))
    }

    fn max_id(&self) -> Result<Option<i64>> {
        Ok(self.last().copied())
    }
}

/// Read access to note GUIDs.
pub trait GuidLookup {
    /// Whether a note other than `except_id` already uses `guid`.
    fn guid_taken(&self, guid: &str, except_id: Option<i64>) -> Result<bool>;
}

/// GUIDs mapped to the id of the note that owns them.
impl GuidLookup for HashMap<String, i64> {
    fn guid_taken(&self, guid: &str, except_id: Option<i64>) -> Result<bool> {
        Ok(self.get(guid).is_some_and(|owner| Some(*owner) != except_id))
    }
}

/// Return an id absent from `ids`, starting from `candidate`.
///
/// Fails with [`Error::Validation`] if the jump would pass `i64::MAX`.
pub fn allocate(candidate: i64, ids: &BTreeSet<i64>) -> Result<i64> {
    let mut id = candidate;
    while ids.contains(&id) {
        // Non-empty because it contains `id`.
        id = match ids.last() {
            Some(max) => next_after(*max)?,
            None => break,
        };
    }
    Ok(id)
}

/// Return an id absent from the table behind `lookup`, starting from `candidate`.
pub fn allocate_id<L: IdLookup + ?Sized>(candidate: i64, lookup: &L) -> Result<i64> {
    let mut id = candidate;
    while lookup.contains_id(id)? {
        let next = match lookup.max_id()? {
            Some(max) => next_after(max)?,
            None => break,
        };
        debug!(candidate = id, allocated = next, "id collision, jumping past max");
        id = next;
    }
    Ok(id)
}

fn next_after(max: i64) -> Result<i64> {
    max.checked_add(1)
        .ok_or_else(|| Error::Validation(format!("no id left after {max}")))
}

/// Return a GUID no other note uses, drawing fresh ones from `source` as needed.
pub fn allocate_guid<L, G>(
    candidate: String,
    except_id: Option<i64>,
    lookup: &L,
    source: &mut G,
) -> Result<String>
where
    L: GuidLookup + ?Sized,
    G: GuidSource + ?Sized,
{
    let mut guid = candidate;
    while lookup.guid_taken(&guid, except_id)? {
        debug!(guid = %guid, "guid collision, regenerating");
        guid = source.next_guid();
    }
    Ok(guid)
}
