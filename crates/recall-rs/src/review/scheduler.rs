//! Fixed-interval review scheduling by level.
//!
//! | level | delay until next review |
//! |-------|-------------------------|
//! | 0     | 10 minutes              |
//! | 1     | 1 hour                  |
//! | 2     | 1 day                   |
//! | 3     | 3 days                  |
//! | 4     | 7 days                  |
//! | ≥ 5   | 14 days ("mastered")    |
//!
//! A correct answer moves a card up one level, an incorrect one drops it back
//! to 0. Either way the next due time is measured from the moment of the
//! review, using the delay of the *new* level.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Delay in seconds for levels 0 through 4. Non-decreasing.
pub const LEVEL_DELAYS: [i64; 5] = [10 * MINUTE, HOUR, DAY, 3 * DAY, 7 * DAY];

/// Delay in seconds for any level past the end of [`LEVEL_DELAYS`].
pub const MASTERED_DELAY: i64 = 14 * DAY;

/// Delay before a card at `level` is due again.
pub fn delay_for_level(level: u32) -> Duration {
    let secs = LEVEL_DELAYS
        .get(level as usize)
        .copied()
        .unwrap_or(MASTERED_DELAY);
    Duration::seconds(secs)
}

/// A question/answer pair under review.
///
/// `level` and `next_due` are read-only outside this module: a card is
/// created by [`create_card`] and advanced only by [`record_outcome`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReviewCard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    level: u32,
    #[serde(with = "crate::timestamp")]
    next_due: DateTime<Utc>,
}

impl ReviewCard {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// Whether the card should be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due <= now
    }
}

/// Create a level-0 card due one level-0 delay after `now`.
pub fn create_card(
    question: impl Into<String>,
    answer: impl Into<String>,
    now: DateTime<Utc>,
) -> ReviewCard {
    ReviewCard {
        question: question.into(),
        answer: answer.into(),
        level: 0,
        next_due: now + delay_for_level(0),
    }
}

/// Every card with `next_due <= now`, in storage order. Does not touch the cards.
pub fn due_cards(cards: &[ReviewCard], now: DateTime<Utc>) -> Vec<&ReviewCard> {
    cards.iter().filter(|c| c.is_due(now)).collect()
}

/// Index of the first due card in storage order.
pub fn first_due_index(cards: &[ReviewCard], now: DateTime<Utc>) -> Option<usize> {
    cards.iter().position(|c| c.is_due(now))
}

/// Apply a review outcome, returning the updated card.
pub fn record_outcome(card: &ReviewCard, correct: bool, now: DateTime<Utc>) -> ReviewCard {
    let level = if correct { card.level.saturating_add(1) } else { 0 };
    let next_due = now + delay_for_level(level);
    debug!(
        "Review outcome: correct={correct}, level {} -> {level}, next due {next_due}",
        card.level
    );
    ReviewCard {
        question: card.question.clone(),
        answer: card.answer.clone(),
        level,
        next_due,
    }
}
