//! The persisted engine state.
//!
//! [`EngineState`] is the single unit written to the
//! [`PersistentStore`](crate::store::PersistentStore). Every key is optional on
//! read so state files written by any tutor profile load into the same type:
//!
//! ```json
//! {
//!   "chat": [{"role": "user", "content": "What is a closure?"}],
//!   "interactions": [{"query": "What is a closure?", "time": "2024-03-01T12:30:00.25Z"}],
//!   "cards": [{"question": "...", "answer": "...", "level": 0, "next_due": "2024-03-01T12:40:00Z"}],
//!   "counters": {"turns_since_trigger": 1, "recent_topics": ["What is a closure?"]}
//! }
//! ```

use crate::Message;
use crate::review::ReviewCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of recent user queries kept as quiz topic candidates.
pub const RECENT_TOPICS_CAPACITY: usize = 5;

/// Everything a tutor session persists.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EngineState {
    /// Conversation in chronological (and display) order.
    #[serde(default, alias = "messages")]
    pub chat: Vec<Message>,
    /// Append-only log of user queries for the time-based trigger.
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    /// Review cards in storage order.
    #[serde(default)]
    pub cards: Vec<ReviewCard>,
    /// Count-based trigger counters.
    #[serde(default)]
    pub counters: TurnCounters,
}

impl EngineState {
    /// Number of user-role messages in the conversation.
    pub fn user_turns(&self) -> usize {
        self.chat.iter().filter(|m| m.is_user()).count()
    }

    /// Full history reset: conversation, counters and interaction log.
    /// Review cards are kept.
    pub fn reset_history(&mut self) {
        self.chat.clear();
        self.interactions.clear();
        self.counters = TurnCounters::default();
    }

    pub fn is_empty(&self) -> bool {
        self.chat.is_empty()
            && self.interactions.is_empty()
            && self.cards.is_empty()
            && self.counters == TurnCounters::default()
    }
}

/// Counters owned by the count-based trigger.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnCounters {
    /// User turns since the last quiz fired.
    #[serde(default)]
    pub turns_since_trigger: u32,
    /// The last few user queries, oldest first.
    #[serde(default)]
    pub recent_topics: VecDeque<String>,
}

impl TurnCounters {
    /// Append a topic, dropping the oldest entries beyond `capacity`.
    pub fn push_topic(&mut self, topic: impl Into<String>, capacity: usize) {
        self.recent_topics.push_back(topic.into());
        while self.recent_topics.len() > capacity {
            self.recent_topics.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.turns_since_trigger = 0;
        self.recent_topics.clear();
    }
}

/// One user submission, as logged for the time-based trigger.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InteractionRecord {
    pub query: String,
    #[serde(with = "crate::timestamp")]
    pub time: DateTime<Utc>,
    /// Set only when the time trigger runs with record consumption enabled.
    #[serde(default, skip_serializing_if = "is_false")]
    pub consumed: bool,
}

impl InteractionRecord {
    pub fn new(query: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            time,
            consumed: false,
        }
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}
