//! Quiz trigger policies.
//!
//! After each user turn the session asks its policy whether a quiz should be
//! interjected now, and on which topic.
//!
//! | Policy | Fires when | Topic |
//! |--------|------------|-------|
//! | [`CountTrigger`] | every 5th user turn | uniform pick among the last 5 queries |
//! | [`TimeTrigger`] | first logged query at least 10 minutes old, once per session | that query |

pub mod count;
pub mod time;

pub use count::CountTrigger;
pub use time::TimeTrigger;

/// Outcome of evaluating a trigger policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResult {
    /// No quiz this turn.
    Idle,
    /// Quiz now, on `topic`.
    Fire { topic: String },
}

impl TriggerResult {
    pub fn fired(&self) -> bool {
        matches!(self, TriggerResult::Fire { .. })
    }

    pub fn topic(&self) -> Option<&str> {
        match self {
            TriggerResult::Fire { topic } => Some(topic),
            TriggerResult::Idle => None,
        }
    }

    pub fn into_topic(self) -> Option<String> {
        match self {
            TriggerResult::Fire { topic } => Some(topic),
            TriggerResult::Idle => None,
        }
    }
}

/// Which trigger policy a tutor profile runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Never quiz.
    None,
    /// [`CountTrigger`].
    Count,
    /// [`TimeTrigger`].
    Time,
}
