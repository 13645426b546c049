//! Configuration for the [`Tutor`](super::tutor::Tutor).
//!
//! A [`TutorConfig`] bundles the policies one tutor runs: how much history the
//! model sees, whether an instruction is pinned in front of it, which quiz
//! trigger fires, and whether chat turns also become review cards. The five
//! [`Profile`]s are presets over it.
//!
//! ```ignore
//! let config = TutorConfig::counter().with_turn_threshold(3);
//!
//! let config = TutorConfig::default()
//!     .with_window_size(8)
//!     .with_prefix(SOCRATIC_PROMPT)
//!     .with_auto_cards(true);
//! ```

use crate::context::ConversationWindow;
use crate::trigger::count::DEFAULT_TURN_THRESHOLD;
use crate::trigger::time::DEFAULT_QUIZ_DELAY_MINUTES;
use crate::trigger::{CountTrigger, TimeTrigger, TriggerKind};
use chrono::Duration;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ── Prompts and labels ─────────────────────────────────────────────

/// Pinned instruction for the Socratic profile.
pub const STRICT_SOCRATIC_PROMPT: &str = "You are a strict Socratic tutor.\n\
    Do NOT directly explain unless the user explicitly asks for an explanation or solution.\n\
    Primarily respond using guiding questions.\n\
    Keep responses short and clear.";

/// Pinned instruction for the fusion profile when Socratic mode is on.
pub const SOCRATIC_PROMPT: &str = "You are a Socratic tutor.\n\
    Prefer asking guiding questions instead of direct explanations.";

/// Heading of a count-triggered quiz message.
pub const COUNT_QUIZ_LABEL: &str = "🧠 **Quiz Time!**";

/// Heading of a time-triggered quiz message.
pub const TIME_QUIZ_LABEL: &str = "⏰ **Time-Based Quiz!**";

/// Prefix of a reply whose generation failed.
pub const REPLY_ERROR_PREFIX: &str = "Error";

// ── Profile ────────────────────────────────────────────────────────

/// Named tutor presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Quiz every fifth turn on a recent question.
    #[default]
    Counter,
    /// Quiz once per session on a question asked ten or more minutes ago.
    Time,
    /// Leveled review cards only; chat without quizzes.
    Spaced,
    /// Guiding questions instead of explanations, with a longer memory.
    Socratic,
    /// Chat with optional Socratic mode; every answer becomes a review card.
    Fusion,
}

impl Profile {
    pub const ALL: [Profile; 5] = [
        Profile::Counter,
        Profile::Time,
        Profile::Spaced,
        Profile::Socratic,
        Profile::Fusion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Counter => "counter",
            Profile::Time => "time",
            Profile::Spaced => "spaced",
            Profile::Socratic => "socratic",
            Profile::Fusion => "fusion",
        }
    }

    /// State file used when none is given.
    pub fn default_state_file(self) -> PathBuf {
        PathBuf::from(match self {
            Profile::Counter => "counter_state.json",
            Profile::Time => "timebot_history.json",
            Profile::Spaced => "spaced_cards.json",
            Profile::Socratic => "socratic_history.json",
            Profile::Fusion => "fusion_state.json",
        })
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Profile::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown profile '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

// ── TutorConfig ────────────────────────────────────────────────────

/// Policies for one tutor session.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// Preset this config was derived from.
    pub profile: Profile,
    /// Number of recent raw messages sent to the model.
    pub window_size: usize,
    /// Instruction pinned ahead of the window.
    pub prefix: Option<String>,
    /// Quiz trigger policy.
    pub trigger: TriggerKind,
    /// Turns between count-triggered quizzes.
    pub turn_threshold: u32,
    /// Minimum age of a query before the time trigger quizzes on it.
    pub quiz_delay: Duration,
    /// Mark time-triggered records so later sessions skip them.
    pub consume_records: bool,
    /// Turn every chat exchange into a level-0 review card.
    pub auto_cards: bool,
    /// Heading placed above quiz questions.
    pub quiz_label: String,
    /// Prefix for replies whose generation failed.
    pub reply_error_prefix: String,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Spaced,
            window_size: 1,
            prefix: None,
            trigger: TriggerKind::None,
            turn_threshold: DEFAULT_TURN_THRESHOLD,
            quiz_delay: Duration::minutes(DEFAULT_QUIZ_DELAY_MINUTES),
            consume_records: false,
            auto_cards: false,
            quiz_label: String::new(),
            reply_error_prefix: REPLY_ERROR_PREFIX.to_string(),
        }
    }
}

impl TutorConfig {
    /// Count-triggered quizzes; the model sees only the current query.
    pub fn counter() -> Self {
        Self {
            profile: Profile::Counter,
            trigger: TriggerKind::Count,
            quiz_label: COUNT_QUIZ_LABEL.to_string(),
            ..Self::default()
        }
    }

    /// Time-triggered quizzes; the model sees only the current query.
    pub fn time() -> Self {
        Self {
            profile: Profile::Time,
            trigger: TriggerKind::Time,
            quiz_label: TIME_QUIZ_LABEL.to_string(),
            ..Self::default()
        }
    }

    /// Review cards with plain single-query chat.
    pub fn spaced() -> Self {
        Self::default()
    }

    /// Strict Socratic tutor over the last ten messages.
    pub fn socratic() -> Self {
        Self {
            profile: Profile::Socratic,
            window_size: 10,
            prefix: Some(STRICT_SOCRATIC_PROMPT.to_string()),
            ..Self::default()
        }
    }

    /// Six-message window, auto-created cards, optional Socratic prefix.
    pub fn fusion(socratic: bool) -> Self {
        Self {
            profile: Profile::Fusion,
            window_size: 6,
            prefix: socratic.then(|| SOCRATIC_PROMPT.to_string()),
            auto_cards: true,
            ..Self::default()
        }
    }

    /// Preset for `profile`. `socratic` only affects [`Profile::Fusion`].
    pub fn for_profile(profile: Profile, socratic: bool) -> Self {
        match profile {
            Profile::Counter => Self::counter(),
            Profile::Time => Self::time(),
            Profile::Spaced => Self::spaced(),
            Profile::Socratic => Self::socratic(),
            Profile::Fusion => Self::fusion(socratic),
        }
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn without_prefix(mut self) -> Self {
        self.prefix = None;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerKind) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_turn_threshold(mut self, threshold: u32) -> Self {
        self.turn_threshold = threshold.max(1);
        self
    }

    pub fn with_quiz_delay(mut self, delay: Duration) -> Self {
        self.quiz_delay = delay;
        self
    }

    pub fn with_record_consumption(mut self, consume: bool) -> Self {
        self.consume_records = consume;
        self
    }

    pub fn with_auto_cards(mut self, enabled: bool) -> Self {
        self.auto_cards = enabled;
        self
    }

    pub fn with_quiz_label(mut self, label: impl Into<String>) -> Self {
        self.quiz_label = label.into();
        self
    }

    /// Window over the conversation history for this config.
    pub fn window(&self) -> ConversationWindow {
        let window = ConversationWindow::new(self.window_size);
        match &self.prefix {
            Some(prefix) => window.with_prefix(prefix.clone()),
            None => window,
        }
    }

    pub fn count_trigger(&self) -> CountTrigger {
        CountTrigger::new().with_threshold(self.turn_threshold)
    }

    /// A fresh (unlatched) time trigger.
    pub fn time_trigger(&self) -> TimeTrigger {
        TimeTrigger::new()
            .with_delay(self.quiz_delay)
            .with_consumption(self.consume_records)
    }

    /// Whether any quiz can fire under this config.
    pub fn quizzes_enabled(&self) -> bool {
        self.trigger != TriggerKind::None
    }

    /// Reject configs that would send the model no messages at all.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window size must be at least 1".into());
        }
        Ok(())
    }
}
