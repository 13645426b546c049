//! Turn-count quiz trigger.
//!
//! Counts user turns and remembers the last few queries. On the fifth turn it
//! fires with a topic drawn uniformly from those queries (not always the
//! latest one), then starts over with an empty topic list.

use super::TriggerResult;
use crate::state::{RECENT_TOPICS_CAPACITY, TurnCounters};
use rand::Rng;
use tracing::{debug, info};

/// Number of user turns between quizzes.
pub const DEFAULT_TURN_THRESHOLD: u32 = 5;

/// Count-based trigger. Its state lives in [`TurnCounters`] so it persists
/// with the rest of the engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountTrigger {
    threshold: u32,
    capacity: usize,
}

impl Default for CountTrigger {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TURN_THRESHOLD,
            capacity: RECENT_TOPICS_CAPACITY,
        }
    }
}

impl CountTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every `threshold` turns instead of every 5.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold.max(1);
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record a user turn and decide whether to quiz.
    ///
    /// `rng` picks the topic; pass a seeded generator for reproducible picks.
    pub fn on_user_turn<R: Rng + ?Sized>(
        &self,
        counters: &mut TurnCounters,
        query: &str,
        rng: &mut R,
    ) -> TriggerResult {
        counters.turns_since_trigger = counters.turns_since_trigger.saturating_add(1);
        counters.push_topic(query, self.capacity);

        if counters.turns_since_trigger < self.threshold {
            debug!(
                "Count trigger: {}/{} turns",
                counters.turns_since_trigger, self.threshold
            );
            return TriggerResult::Idle;
        }

        let pick = rng.gen_range(0..counters.recent_topics.len());
        let topic = counters
            .recent_topics
            .get(pick)
            .cloned()
            .unwrap_or_else(|| query.to_string());
        info!(
            "Count trigger fired after {} turns, topic #{pick} of {}",
            counters.turns_since_trigger,
            counters.recent_topics.len()
        );
        counters.clear();
        TriggerResult::Fire { topic }
    }
}
