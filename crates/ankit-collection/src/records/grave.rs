//! Tombstones for deleted cards, notes and decks.

use serde::{Deserialize, Serialize};

use super::int_enum;

/// Kind of deleted entity (`graves.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum GraveKind {
    /// A card.
    Card,
    /// A note.
    Note,
    /// A deck.
    Deck,
}

int_enum!(GraveKind, "type", {
    Card = 0,
    Note = 1,
    Deck = 2,
});

/// A row of the `graves` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grave {
    /// Update sequence number; -1 until the deletion is pushed.
    pub usn: i64,
    /// Id of the deleted entity.
    pub oid: i64,
    /// Kind of the deleted entity.
    #[serde(rename = "type")]
    pub kind: GraveKind,
}

impl Grave {
    /// A pending tombstone for `oid`.
    pub fn new(oid: i64, kind: GraveKind) -> Self {
        Self { usn: -1, oid, kind }
    }
}
