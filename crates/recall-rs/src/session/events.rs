//! Events emitted by the [`Tutor`](super::tutor::Tutor).
//!
//! Embedders implement [`EventHandler`] to observe a session (render a UI,
//! count quizzes, audit grading) without touching the engine.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or silent sessions |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |

use crate::GenerationError;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Which tutor operation a generation call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Reply,
    Quiz,
    CardAnswer,
    Judgment,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GenerationStage::Reply => "reply",
            GenerationStage::Quiz => "quiz",
            GenerationStage::CardAnswer => "card answer",
            GenerationStage::Judgment => "judgment",
        })
    }
}

#[derive(Debug)]
pub enum TutorEvent<'a> {
    /// The model answered a user turn.
    Reply { content: &'a str },
    /// A provider call failed. The session carries on.
    GenerationFailed {
        stage: GenerationStage,
        error: &'a GenerationError,
    },
    /// The quiz trigger fired on `topic`.
    QuizFired { topic: &'a str },
    /// A review card was appended to the deck.
    CardCreated {
        question: &'a str,
        next_due: DateTime<Utc>,
    },
    /// A card was graded and rescheduled.
    CardReviewed {
        question: &'a str,
        correct: bool,
        level: u32,
        next_due: DateTime<Utc>,
    },
    /// Conversation, counters and interaction log were cleared.
    HistoryReset,
    /// The state was written to the store.
    StateSaved,
}

/// Handler for tutor events. The default ignores everything.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &TutorEvent<'_>) {
        let _ = event;
    }
}

pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Wraps a closure as an [`EventHandler`].
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let TutorEvent::QuizFired { topic } = event {
///         println!("quizzing on {topic}");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&TutorEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&TutorEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&TutorEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &TutorEvent<'_>) {
        (self.0)(event)
    }
}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &TutorEvent<'_>) {
        match event {
            TutorEvent::Reply { content } => {
                let preview: String = content.chars().take(200).collect();
                debug!(
                    "Reply: {preview}{}",
                    if content.chars().count() > 200 { "..." } else { "" }
                );
            }
            TutorEvent::GenerationFailed { stage, error } => {
                warn!("Generation failed ({stage}): {error}");
            }
            TutorEvent::QuizFired { topic } => {
                info!("Quiz fired on: {topic}");
            }
            TutorEvent::CardCreated { question, next_due } => {
                info!("Card created, due {next_due}: {question}");
            }
            TutorEvent::CardReviewed {
                question,
                correct,
                level,
                next_due,
            } => {
                info!(
                    "Card reviewed ({}), level {level}, next due {next_due}: {question}",
                    if *correct { "correct" } else { "incorrect" }
                );
            }
            TutorEvent::HistoryReset => info!("History reset"),
            TutorEvent::StateSaved => debug!("State saved"),
        }
    }
}
