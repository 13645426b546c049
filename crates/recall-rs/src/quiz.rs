//! Quiz question composition.
//!
//! Given a topic (usually a past user query), asks the completion provider
//! for one short conceptual question without its answer. A failed generation
//! still yields text (`"Quiz error: ..."`) so the quiz can be appended to the
//! conversation like any other assistant message.

use crate::GenerationError;
use crate::provider::{CompletionProvider, generate_once};
use tracing::info;

/// Prefix used when quiz generation fails.
pub const QUIZ_ERROR_PREFIX: &str = "Quiz error";

/// Build the quiz-generation prompt for a topic.
pub fn quiz_prompt(topic: &str) -> String {
    format!(
        "Create ONE short conceptual quiz question based on the following topic.\n\
         Do NOT give the answer.\n\nTopic:\n{topic}"
    )
}

/// Composes quiz questions through a completion provider.
pub struct QuizComposer<'a> {
    provider: &'a dyn CompletionProvider,
}

impl<'a> QuizComposer<'a> {
    pub fn new(provider: &'a dyn CompletionProvider) -> Self {
        Self { provider }
    }

    /// Generate one quiz question for `topic`, surfacing provider errors.
    pub async fn try_compose_quiz(&self, topic: &str) -> Result<String, GenerationError> {
        let question = generate_once(self.provider, quiz_prompt(topic)).await?;
        info!("Composed quiz ({} chars)", question.len());
        Ok(question)
    }

    /// Generate one quiz question for `topic`. Never fails.
    pub async fn compose_quiz(&self, topic: &str) -> String {
        self.try_compose_quiz(topic)
            .await
            .unwrap_or_else(|e| quiz_error_text(&e))
    }
}

/// Text shown in place of a quiz question whose generation failed.
pub fn quiz_error_text(error: &GenerationError) -> String {
    format!("{QUIZ_ERROR_PREFIX}: {error}")
}
