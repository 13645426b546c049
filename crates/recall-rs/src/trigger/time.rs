//! Elapsed-time quiz trigger.
//!
//! Every user query is appended to the persisted interaction log before the
//! trigger is evaluated. Evaluation scans the whole log in storage order for
//! the first record at least ten minutes old and fires on its query, at most
//! once per session.
//!
//! The scan does not consume records: a new session (fresh latch) over the
//! same log can fire on the same old query again. Enable
//! [`with_consumption`](TimeTrigger::with_consumption) to mark matched records
//! and skip them in later scans.

use super::TriggerResult;
use crate::state::InteractionRecord;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// Minimum age of a logged query before it can be quizzed on.
pub const DEFAULT_QUIZ_DELAY_MINUTES: i64 = 10;

/// Time-based trigger with a session-scoped fire latch.
///
/// The latch is plain memory: it is not persisted, so every new
/// `TimeTrigger` (a new process or session) starts unlatched.
#[derive(Debug, Clone)]
pub struct TimeTrigger {
    delay: Duration,
    consume_records: bool,
    already_fired: bool,
}

impl Default for TimeTrigger {
    fn default() -> Self {
        Self {
            delay: Duration::minutes(DEFAULT_QUIZ_DELAY_MINUTES),
            consume_records: false,
            already_fired: false,
        }
    }
}

impl TimeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the minimum record age.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Mark matched records as consumed so they never fire again.
    pub fn with_consumption(mut self, consume: bool) -> Self {
        self.consume_records = consume;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn already_fired(&self) -> bool {
        self.already_fired
    }

    /// Append a query to the interaction log. Callers persist the log
    /// before evaluating.
    pub fn record(
        &self,
        interactions: &mut Vec<InteractionRecord>,
        query: &str,
        now: DateTime<Utc>,
    ) {
        interactions.push(InteractionRecord::new(query, now));
    }

    /// Scan the log and decide whether to quiz.
    pub fn evaluate(
        &mut self,
        interactions: &mut [InteractionRecord],
        now: DateTime<Utc>,
    ) -> TriggerResult {
        if self.already_fired {
            return TriggerResult::Idle;
        }

        let consume = self.consume_records;
        let delay = self.delay;
        let found = interactions
            .iter_mut()
            .find(|r| !(consume && r.consumed) && now - r.time >= delay);

        match found {
            Some(record) => {
                if consume {
                    record.consumed = true;
                }
                self.already_fired = true;
                info!(
                    "Time trigger fired on query logged at {} ({} min ago)",
                    record.time,
                    (now - record.time).num_minutes()
                );
                TriggerResult::Fire {
                    topic: record.query.clone(),
                }
            }
            None => {
                debug!(
                    "Time trigger: no interaction older than {} min among {}",
                    delay.num_minutes(),
                    interactions.len()
                );
                TriggerResult::Idle
            }
        }
    }

    /// [`record`](Self::record) then [`evaluate`](Self::evaluate), for callers
    /// that persist afterwards.
    pub fn on_user_turn(
        &mut self,
        interactions: &mut Vec<InteractionRecord>,
        query: &str,
        now: DateTime<Utc>,
    ) -> TriggerResult {
        self.record(interactions, query, now);
        self.evaluate(interactions, now)
    }
}
