//! Review history.

use serde::{Deserialize, Serialize};

use super::int_enum;
use crate::clock;

/// Longest review time recorded, in milliseconds.
pub const MAX_REVIEW_TIME_MS: i64 = 60_000;

/// Kind of review (`revlog.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ReviewKind {
    /// Learning step.
    Learn,
    /// Regular review.
    Review,
    /// Relearning after a lapse.
    Relearn,
    /// Review in a filtered deck ahead of schedule.
    Cram,
}

int_enum!(ReviewKind, "type", {
    Learn = 0,
    Review = 1,
    Relearn = 2,
    Cram = 3,
});

/// A row of the `revlog` table. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    /// Review time in epoch milliseconds, made unique on insert.
    pub id: i64,
    /// Card id.
    pub cid: i64,
    /// Update sequence number.
    pub usn: i64,
    /// Answer button: 1 (wrong) to 4 (easy) for reviews, 1 to 3 when learning.
    pub ease: i64,
    /// Interval after the review.
    pub ivl: i64,
    /// Interval before the review.
    #[serde(rename = "lastIvl")]
    pub last_ivl: i64,
    /// Ease factor after the review.
    pub factor: i64,
    /// Milliseconds spent, at most [`MAX_REVIEW_TIME_MS`].
    pub time: i64,
    /// Kind of review.
    #[serde(rename = "type")]
    pub kind: ReviewKind,
}

impl ReviewLogEntry {
    /// A review of card `cid` answered with `ease`, taking `time_ms`.
    ///
    /// The time is clamped to `0..=MAX_REVIEW_TIME_MS`.
    pub fn new(cid: i64, ease: i64, kind: ReviewKind, time_ms: i64) -> Self {
        Self {
            id: clock::now_millis(),
            cid,
            usn: -1,
            ease,
            ivl: 0,
            last_ivl: 0,
            factor: 0,
            time: time_ms.clamp(0, MAX_REVIEW_TIME_MS),
            kind,
        }
    }

    /// Use `id` as the insert candidate.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Record the interval change and resulting factor.
    pub fn with_intervals(mut self, last_ivl: i64, ivl: i64, factor: i64) -> Self {
        self.last_ivl = last_ivl;
        self.ivl = ivl;
        self.factor = factor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_kind_values() {
        assert_eq!(ReviewKind::Cram.as_i64(), 3);
        assert_eq!(ReviewKind::try_from(2).unwrap(), ReviewKind::Relearn);
        assert!(ReviewKind::try_from(9).is_err());
    }

    #[test]
    fn test_time_is_clamped() {
        let entry = ReviewLogEntry::new(1, 3, ReviewKind::Review, 120_000);
        assert_eq!(entry.time, MAX_REVIEW_TIME_MS);
        let entry = ReviewLogEntry::new(1, 3, ReviewKind::Review, 4_200);
        assert_eq!(entry.time, 4_200);
    }

    #[test]
    fn test_with_intervals() {
        let entry = ReviewLogEntry::new(7, 3, ReviewKind::Review, 1000)
            .with_intervals(3, 8, 2500);
        assert_eq!((entry.last_ivl, entry.ivl, entry.factor), (3, 8, 2500));
        assert_eq!(serde_json::to_value(&entry).unwrap()["lastIvl"], 3);
    }
}
