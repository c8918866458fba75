//! Cards: what gets reviewed.

use serde::{Deserialize, Serialize};

use super::int_enum;
use crate::clock;

/// Card type (`cards.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum CardType {
    /// Never studied.
    #[default]
    New,
    /// In the learning steps.
    Learning,
    /// Graduated review card.
    Due,
    /// In a filtered deck.
    Filtered,
}

int_enum!(CardType, "type", {
    New = 0,
    Learning = 1,
    Due = 2,
    Filtered = 3,
});

/// Card queue (`cards.queue`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum CardQueue {
    /// Buried by the scheduler.
    SchedulerBuried,
    /// Buried by the user.
    UserBuried,
    /// Suspended.
    Suspended,
    /// New.
    #[default]
    New,
    /// Learning, due within the day.
    Learning,
    /// Review.
    Due,
    /// Learning, next step at least a day after the previous review.
    DayLearning,
}

int_enum!(CardQueue, "queue", {
    SchedulerBuried = -3,
    UserBuried = -2,
    Suspended = -1,
    New = 0,
    Learning = 1,
    Due = 2,
    DayLearning = 3,
});

/// A row of the `cards` table.
///
/// `due` depends on the card type: for new cards it is the note id or a
/// random integer, for review cards a day offset from the collection's
/// creation, and for learning cards an epoch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Creation time in epoch milliseconds, made unique on insert.
    pub id: i64,
    /// Note id.
    pub nid: i64,
    /// Deck id.
    pub did: i64,
    /// Template ordinal within the note type.
    pub ord: i64,
    /// Modification time, epoch seconds. Set on save.
    #[serde(rename = "mod")]
    pub mtime: i64,
    /// Update sequence number; -1 means not yet pushed.
    pub usn: i64,
    /// Card type.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Scheduling queue.
    pub queue: CardQueue,
    /// Due position, day or timestamp. Defaults to `nid` on save when unset.
    pub due: Option<i64>,
    /// Interval; negative is seconds, positive is days.
    pub ivl: i64,
    /// Ease factor in permille.
    pub factor: i64,
    /// Number of reviews.
    pub reps: i64,
    /// Number of lapses.
    pub lapses: i64,
    /// Learning steps left, `a * 1000 + b`.
    pub left: i64,
    /// Original due while in a filtered deck.
    pub odue: i64,
    /// Original deck id while in a filtered deck.
    pub odid: i64,
    /// Unused.
    pub flags: i64,
    /// Unused.
    pub data: String,
}

impl Card {
    /// A new card for template `ord` of note `nid` in deck `did`.
    pub fn new(nid: i64, did: i64, ord: i64) -> Self {
        Self {
            id: clock::now_millis(),
            nid,
            did,
            ord,
            mtime: 0,
            usn: -1,
            card_type: CardType::New,
            queue: CardQueue::New,
            due: None,
            ivl: 0,
            factor: 0,
            reps: 0,
            lapses: 0,
            left: 0,
            odue: 0,
            odid: 0,
            flags: 0,
            data: String::new(),
        }
    }

    /// Use `id` as the insert candidate.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set an explicit due value.
    pub fn with_due(mut self, due: i64) -> Self {
        self.due = Some(due);
        self
    }

    /// Whether the card sits in a filtered deck.
    pub fn in_filtered_deck(&self) -> bool {
        self.odid != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_queue_values() {
        assert_eq!(CardQueue::SchedulerBuried.as_i64(), -3);
        assert_eq!(CardQueue::try_from(-1).unwrap(), CardQueue::Suspended);
        assert_eq!(CardQueue::try_from(3).unwrap(), CardQueue::DayLearning);
        assert!(matches!(
            CardQueue::try_from(4),
            Err(Error::Decode { column: "queue", .. })
        ));
    }

    #[test]
    fn test_type_values() {
        assert_eq!(i64::from(CardType::Filtered), 3);
        assert_eq!(CardType::try_from(1).unwrap(), CardType::Learning);
        assert!(CardType::try_from(-1).is_err());
    }

    #[test]
    fn test_new_card() {
        let card = Card::new(12345, 1, 0);
        assert_eq!(card.due, None);
        assert_eq!(card.card_type, CardType::New);
        assert_eq!(card.queue, CardQueue::New);
        assert_eq!(card.usn, -1);
        assert!(!card.in_filtered_deck());
    }

    #[test]
    fn test_enums_serialize_as_integers() {
        let card = Card::new(1, 1, 0).with_id(10).with_due(3);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], 0);
        assert_eq!(json["queue"], 0);
        assert_eq!(json["due"], 3);
    }
}
