//! The tutor session: one user, one turn at a time.
//!
//! A [`Tutor`] owns the loaded [`EngineState`] and writes it back through its
//! [`PersistentStore`] after every state-changing operation. Generation
//! failures never abort an operation; they are rendered into the
//! conversation or reported in the outcome. Only store write failures are
//! returned as errors.

use super::config::TutorConfig;
use super::events::{EventHandler, GenerationStage, NoopHandler, TutorEvent};
use crate::context::ConversationWindow;
use crate::provider::{CompletionProvider, generate_once, render_reply};
use crate::quiz::{QuizComposer, quiz_error_text};
use crate::review::{
    ReviewCard, classify_judgment, create_card, due_cards, first_due_index, judge_prompt,
    record_outcome,
};
use crate::state::EngineState;
use crate::store::PersistentStore;
use crate::trigger::{CountTrigger, TimeTrigger, TriggerKind, TriggerResult};
use crate::{Message, StoreError};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

/// What a user turn added to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The assistant reply (or rendered error).
    pub reply: Message,
    /// The labelled quiz message, when the trigger fired.
    pub quiz: Option<Message>,
    pub trigger: TriggerResult,
    /// Card created from this exchange when auto-cards are on.
    pub card: Option<ReviewCard>,
    /// Description of the reply generation failure, if any.
    pub error: Option<String>,
}

/// Result of [`Tutor::add_card`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddCardOutcome {
    Created(ReviewCard),
    /// No card was stored.
    Failed(String),
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub correct: bool,
    pub previous_level: u32,
    /// The card after rescheduling.
    pub card: ReviewCard,
    /// The grader's raw reply. Empty when grading failed.
    pub verdict: String,
    /// Grading failure; the answer was counted as incorrect.
    pub error: Option<String>,
}

pub struct Tutor<'a> {
    provider: &'a dyn CompletionProvider,
    store: &'a dyn PersistentStore,
    config: TutorConfig,
    state: EngineState,
    was_fallback: bool,
    window: ConversationWindow,
    count_trigger: CountTrigger,
    time_trigger: TimeTrigger,
    rng: Box<dyn RngCore + Send>,
    event_handler: &'a dyn EventHandler,
}

impl<'a> Tutor<'a> {
    /// Load state from `store` and start a session. Never fails: unusable
    /// stored data starts an empty session.
    pub fn open(
        provider: &'a dyn CompletionProvider,
        store: &'a dyn PersistentStore,
        config: TutorConfig,
    ) -> Self {
        let loaded = store.load();
        if loaded.was_fallback {
            info!("Starting {} tutor with empty state", config.profile);
        } else {
            info!(
                "Resuming {} tutor: {} messages, {} cards",
                config.profile,
                loaded.state.chat.len(),
                loaded.state.cards.len()
            );
        }

        Self {
            provider,
            store,
            window: config.window(),
            count_trigger: config.count_trigger(),
            time_trigger: config.time_trigger(),
            config,
            state: loaded.state,
            was_fallback: loaded.was_fallback,
            rng: Box::new(StdRng::from_entropy()),
            event_handler: &NoopHandler,
        }
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    /// Replace the random source used to pick quiz topics.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Seed the quiz topic picker for reproducible sessions.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    // ── Accessors ──

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Whether the session started from an empty fallback state.
    pub fn was_fallback(&self) -> bool {
        self.was_fallback
    }

    /// Whether the time trigger has already fired in this session.
    pub fn time_quiz_done(&self) -> bool {
        self.time_trigger.already_fired()
    }

    pub fn due_cards(&self, now: DateTime<Utc>) -> Vec<&ReviewCard> {
        due_cards(&self.state.cards, now)
    }

    /// The first due card in storage order, with its index.
    pub fn next_due_card(&self, now: DateTime<Utc>) -> Option<(usize, &ReviewCard)> {
        first_due_index(&self.state.cards, now).map(|i| (i, &self.state.cards[i]))
    }

    // ── Operations ──

    /// Process one user query: reply, maybe quiz, maybe auto-card, persist.
    ///
    /// A write failure rolls the whole turn back in memory, so the
    /// conversation never holds a user message without its reply.
    pub async fn user_turn(
        &mut self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<TurnOutcome, StoreError> {
        let state = self.state.clone();
        let time_trigger = self.time_trigger.clone();
        let result = self.run_turn(query, now).await;
        if result.is_err() {
            self.state = state;
            self.time_trigger = time_trigger;
        }
        result
    }

    async fn run_turn(
        &mut self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<TurnOutcome, StoreError> {
        self.state.chat.push(Message::user(query));

        // The interaction log is durable before the model is called.
        if self.config.trigger == TriggerKind::Time {
            self.time_trigger
                .record(&mut self.state.interactions, query, now);
            self.persist()?;
        }

        let context = self.window.build(&self.state.chat);
        debug!("User turn: {} context messages", context.len());
        let result = self.provider.generate(&context).await;
        let error = match &result {
            Ok(_) => None,
            Err(e) => {
                self.emit(TutorEvent::GenerationFailed {
                    stage: GenerationStage::Reply,
                    error: e,
                });
                Some(e.to_string())
            }
        };
        let reply = render_reply(result, &self.config.reply_error_prefix);
        self.state.chat.push(reply.clone());
        if error.is_none() {
            self.emit(TutorEvent::Reply {
                content: &reply.content,
            });
        }

        let trigger = match self.config.trigger {
            TriggerKind::None => TriggerResult::Idle,
            TriggerKind::Count => {
                self.count_trigger
                    .on_user_turn(&mut self.state.counters, query, &mut *self.rng)
            }
            TriggerKind::Time => self.time_trigger.evaluate(&mut self.state.interactions, now),
        };

        let quiz = match trigger.topic() {
            Some(topic) => Some(self.compose_quiz(topic).await),
            None => None,
        };

        let card = if self.config.auto_cards && error.is_none() {
            let card = create_card(query, reply.content.clone(), now);
            self.push_card(card.clone());
            Some(card)
        } else {
            None
        };

        self.persist()?;
        Ok(TurnOutcome {
            reply,
            quiz,
            trigger,
            card,
            error,
        })
    }

    /// Ask the model for a canonical answer to `question` and store a
    /// level-0 card.
    pub async fn add_card(
        &mut self,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<AddCardOutcome, StoreError> {
        if question.trim().is_empty() {
            return Ok(AddCardOutcome::Failed("question is empty".into()));
        }

        match generate_once(self.provider, question).await {
            Ok(answer) => {
                let card = create_card(question, answer, now);
                self.push_card(card.clone());
                self.persist()?;
                Ok(AddCardOutcome::Created(card))
            }
            Err(e) => {
                self.emit(TutorEvent::GenerationFailed {
                    stage: GenerationStage::CardAnswer,
                    error: &e,
                });
                Ok(AddCardOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Grade `student_answer` against the card at `card_index` and
    /// reschedule it. Returns `None` when there is no such card.
    ///
    /// A grading failure counts as incorrect.
    pub async fn check_answer(
        &mut self,
        card_index: usize,
        student_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewOutcome>, StoreError> {
        let Some(card) = self.state.cards.get(card_index) else {
            warn!(
                "No card at index {card_index} ({} cards)",
                self.state.cards.len()
            );
            return Ok(None);
        };
        let prompt = judge_prompt(card, student_answer);

        let (correct, verdict, error) = match generate_once(self.provider, prompt).await {
            Ok(reply) => (classify_judgment(&reply), reply, None),
            Err(e) => {
                self.emit(TutorEvent::GenerationFailed {
                    stage: GenerationStage::Judgment,
                    error: &e,
                });
                (false, String::new(), Some(e.to_string()))
            }
        };

        let previous_level = self.state.cards[card_index].level();
        let updated = record_outcome(&self.state.cards[card_index], correct, now);
        self.state.cards[card_index] = updated.clone();
        self.emit(TutorEvent::CardReviewed {
            question: &updated.question,
            correct,
            level: updated.level(),
            next_due: updated.next_due(),
        });

        self.persist()?;
        Ok(Some(ReviewOutcome {
            correct,
            previous_level,
            card: updated,
            verdict,
            error,
        }))
    }

    /// Grade an answer to the first due card, if any card is due.
    pub async fn review_next(
        &mut self,
        student_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewOutcome>, StoreError> {
        match first_due_index(&self.state.cards, now) {
            Some(index) => self.check_answer(index, student_answer, now).await,
            None => Ok(None),
        }
    }

    /// Clear the conversation, counters and interaction log. Cards stay.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.state.reset_history();
        self.emit(TutorEvent::HistoryReset);
        self.persist()
    }

    // ── Internals ──

    async fn compose_quiz(&mut self, topic: &str) -> Message {
        self.emit(TutorEvent::QuizFired { topic });
        let question = match QuizComposer::new(self.provider).try_compose_quiz(topic).await {
            Ok(question) => question,
            Err(e) => {
                self.emit(TutorEvent::GenerationFailed {
                    stage: GenerationStage::Quiz,
                    error: &e,
                });
                quiz_error_text(&e)
            }
        };
        let quiz = Message::assistant(format!("{}\n\n{question}", self.config.quiz_label));
        self.state.chat.push(quiz.clone());
        quiz
    }

    fn push_card(&mut self, card: ReviewCard) {
        self.emit(TutorEvent::CardCreated {
            question: &card.question,
            next_due: card.next_due(),
        });
        self.state.cards.push(card);
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store
            .save(&self.state)
            .inspect_err(|e| warn!("Failed to save state: {e}"))?;
        self.emit(TutorEvent::StateSaved);
        Ok(())
    }

    fn emit(&self, event: TutorEvent<'_>) {
        self.event_handler.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GenerationError;
    use crate::provider::ScriptedProvider;
    use crate::session::config::{COUNT_QUIZ_LABEL, STRICT_SOCRATIC_PROMPT, TIME_QUIZ_LABEL};
    use crate::session::events::FnEventHandler;
    use crate::state::InteractionRecord;
    use crate::store::{LoadOutcome, MemoryStore};
    use chrono::{Duration, TimeZone};
    use crate::MessageRole;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scripted(replies: &[&str]) -> ScriptedProvider {
        replies
            .iter()
            .fold(ScriptedProvider::new(), |p, r| p.then_reply(*r))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    struct FailingStore;

    impl PersistentStore for FailingStore {
        fn load(&self) -> LoadOutcome {
            LoadOutcome {
                state: EngineState::default(),
                was_fallback: true,
            }
        }

        fn save(&self, _state: &EngineState) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: "state.json".into(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[tokio::test]
    async fn counter_profile_quizzes_on_fifth_turn() {
        let provider = scripted(&["r1", "r2", "r3", "r4", "r5", "Why?"]);
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::counter()).with_seed(5);

        for (i, q) in ["q1", "q2", "q3", "q4"].iter().enumerate() {
            let outcome = tutor.user_turn(q, t0()).await.unwrap();
            assert_eq!(outcome.reply.content, format!("r{}", i + 1));
            assert!(outcome.quiz.is_none());
        }

        let outcome = tutor.user_turn("q5", t0()).await.unwrap();
        let topic = outcome.trigger.topic().unwrap();
        assert!(["q1", "q2", "q3", "q4", "q5"].contains(&topic));
        let quiz = outcome.quiz.unwrap();
        assert_eq!(quiz.content, format!("{COUNT_QUIZ_LABEL}\n\nWhy?"));

        let chat = &tutor.state().chat;
        assert_eq!(chat.len(), 11);
        assert_eq!(chat.last(), Some(&quiz));
        assert_eq!(tutor.state().counters.turns_since_trigger, 0);

        // The quiz prompt names the picked topic.
        let requests = provider.requests();
        assert!(requests[5][0].content.ends_with(topic));

        tutor.user_turn("q6", t0()).await.unwrap();
        assert_eq!(tutor.state().counters.turns_since_trigger, 1);
    }

    #[tokio::test]
    async fn window_of_one_sends_only_the_current_query() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::spaced());

        tutor.user_turn("first", t0()).await.unwrap();
        tutor.user_turn("second", t0()).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests[1], vec![Message::user("second")]);
    }

    #[tokio::test]
    async fn socratic_prefix_leads_every_request() {
        let provider = ScriptedProvider::new().with_default_reply("What do you think?");
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::socratic());

        for i in 0..8 {
            tutor.user_turn(&format!("q{i}"), t0()).await.unwrap();
        }

        let last = provider.requests().pop().unwrap();
        assert_eq!(last.len(), 11);
        assert_eq!(last[0], Message::user(STRICT_SOCRATIC_PROMPT));
        assert_eq!(last[10], Message::user("q7"));
        assert_eq!(tutor.state().chat.len(), 16);
    }

    #[tokio::test]
    async fn failed_reply_is_rendered_into_the_chat() {
        let provider = ScriptedProvider::new()
            .then_fail(GenerationError::Transport("offline".into()));
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::fusion(false));

        let outcome = tutor.user_turn("What is a trait?", t0()).await.unwrap();
        assert_eq!(outcome.reply.content, "Error: request failed: offline");
        assert_eq!(outcome.error.as_deref(), Some("request failed: offline"));
        assert!(outcome.card.is_none());
        assert_eq!(tutor.state().chat.len(), 2);
        assert!(tutor.state().cards.is_empty());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn time_profile_fires_once_per_session() {
        let store = MemoryStore::new();
        store
            .save(&EngineState {
                interactions: vec![InteractionRecord::new("ownership", t0())],
                ..EngineState::default()
            })
            .unwrap();
        let provider = scripted(&["reply", "Who owns a moved value?"])
            .with_default_reply("later");
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::time());
        assert!(!tutor.was_fallback());

        let now = t0() + Duration::minutes(15);
        let outcome = tutor.user_turn("borrowing", now).await.unwrap();
        assert_eq!(outcome.trigger.topic(), Some("ownership"));
        assert_eq!(
            outcome.quiz.unwrap().content,
            format!("{TIME_QUIZ_LABEL}\n\nWho owns a moved value?")
        );
        assert!(tutor.time_quiz_done());
        // Once before generation, once at the end of the turn.
        assert_eq!(store.save_count(), 3);

        let again = tutor.user_turn("lifetimes", now + Duration::hours(1)).await.unwrap();
        assert!(again.quiz.is_none());
        assert_eq!(tutor.state().interactions.len(), 3);

        // A new session over the same log fires again.
        let mut next = Tutor::open(&provider, &store, TutorConfig::time());
        let outcome = next.user_turn("traits", now + Duration::hours(2)).await.unwrap();
        assert_eq!(outcome.trigger.topic(), Some("ownership"));
    }

    #[tokio::test]
    async fn spaced_card_lifecycle() {
        let provider = scripted(&[
            "A function that captures its environment.",
            "Correct",
            "Incorrect",
        ]);
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::spaced());

        let AddCardOutcome::Created(card) = tutor.add_card("What is a closure?", t0()).await.unwrap()
        else {
            panic!("card should be created");
        };
        assert_eq!(card.level(), 0);
        assert_eq!(card.next_due(), t0() + Duration::minutes(10));
        assert_eq!(provider.requests()[0], vec![Message::user("What is a closure?")]);

        assert!(tutor.next_due_card(t0() + Duration::minutes(5)).is_none());
        let due_at = t0() + Duration::minutes(10);
        let (index, due) = tutor.next_due_card(due_at).unwrap();
        assert_eq!((index, due.question.as_str()), (0, "What is a closure?"));

        let outcome = tutor
            .check_answer(0, "a function plus its environment", due_at)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.correct);
        assert_eq!((outcome.previous_level, outcome.card.level()), (0, 1));
        assert_eq!(outcome.card.next_due(), due_at + Duration::hours(1));

        let later = due_at + Duration::hours(1);
        let outcome = tutor.review_next("no idea", later).await.unwrap().unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.card.level(), 0);
        assert_eq!(outcome.verdict, "Incorrect");
        assert_eq!(tutor.state().cards[0], outcome.card);
    }

    #[tokio::test]
    async fn grading_failure_counts_as_incorrect() {
        let provider = ScriptedProvider::new()
            .then_reply("answer")
            .then_fail(GenerationError::Http {
                status: 503,
                body: "busy".into(),
            });
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::spaced());
        tutor.add_card("q", t0()).await.unwrap();

        let now = t0() + Duration::minutes(10);
        let outcome = tutor.check_answer(0, "a", now).await.unwrap().unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.error.as_deref(), Some("HTTP 503: busy"));
        assert_eq!(outcome.card.next_due(), now + Duration::minutes(10));

        assert_eq!(tutor.check_answer(7, "a", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn add_card_failure_stores_nothing() {
        let provider = ScriptedProvider::new()
            .then_fail(GenerationError::EmptyResponse);
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::spaced());

        let outcome = tutor.add_card("q", t0()).await.unwrap();
        assert_eq!(
            outcome,
            AddCardOutcome::Failed("empty response from model".into())
        );
        assert!(matches!(
            tutor.add_card("   ", t0()).await.unwrap(),
            AddCardOutcome::Failed(_)
        ));
        assert!(tutor.state().cards.is_empty());
        assert_eq!(store.save_count(), 0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn fusion_turns_become_cards() {
        let provider = ScriptedProvider::new().then_reply("Values have one owner.");
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::fusion(true));

        let outcome = tutor.user_turn("What is ownership?", t0()).await.unwrap();
        let card = outcome.card.unwrap();
        assert_eq!(card.question, "What is ownership?");
        assert_eq!(card.answer, "Values have one owner.");
        assert_eq!(card.next_due(), t0() + Duration::minutes(10));
        assert_eq!(tutor.due_cards(t0() + Duration::minutes(10)).len(), 1);

        let reloaded = store.load().state;
        assert_eq!(reloaded.cards, vec![card]);
    }

    #[tokio::test]
    async fn state_survives_a_new_session() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let store = MemoryStore::new();
        {
            let mut tutor = Tutor::open(&provider, &store, TutorConfig::counter()).with_seed(1);
            for q in ["a", "b", "c"] {
                tutor.user_turn(q, t0()).await.unwrap();
            }
        }

        let tutor = Tutor::open(&provider, &store, TutorConfig::counter());
        assert!(!tutor.was_fallback());
        assert_eq!(tutor.state().chat.len(), 6);
        assert_eq!(tutor.state().counters.turns_since_trigger, 3);
    }

    #[tokio::test]
    async fn reset_keeps_cards() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::fusion(false));
        tutor.user_turn("q", t0()).await.unwrap();

        tutor.reset().unwrap();
        assert!(tutor.state().chat.is_empty());
        assert_eq!(tutor.state().cards.len(), 1);
        assert!(store.load().state.chat.is_empty());
    }

    #[tokio::test]
    async fn write_failures_surface() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let mut tutor = Tutor::open(&provider, &FailingStore, TutorConfig::spaced());
        assert!(tutor.was_fallback());

        let err = tutor.user_turn("q", t0()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(tutor.state().chat.is_empty());
        assert!(tutor.reset().is_err());
    }

    /// A memory store whose `fail_on`-th save (1-based) fails.
    struct FlakyStore {
        inner: MemoryStore,
        saves: AtomicUsize,
        fail_on: usize,
    }

    impl FlakyStore {
        fn failing_save(fail_on: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                saves: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    impl PersistentStore for FlakyStore {
        fn load(&self) -> LoadOutcome {
            self.inner.load()
        }

        fn save(&self, state: &EngineState) -> Result<(), StoreError> {
            if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return FailingStore.save(state);
            }
            self.inner.save(state)
        }
    }

    #[tokio::test]
    async fn failed_interaction_write_leaves_no_dangling_turn() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let store = FlakyStore::failing_save(1);
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::time());

        assert!(tutor.user_turn("first", t0()).await.is_err());
        assert!(tutor.state().chat.is_empty());
        assert!(tutor.state().interactions.is_empty());
        assert_eq!(provider.call_count(), 0);

        tutor.user_turn("second", t0()).await.unwrap();
        let roles: Vec<MessageRole> = tutor.state().chat.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
        assert_eq!(tutor.state().interactions.len(), 1);
        assert_eq!(store.load().state.chat.len(), 2);
    }

    #[tokio::test]
    async fn failed_end_of_turn_write_rolls_back_quiz_and_latch() {
        let provider = ScriptedProvider::new().with_default_reply("ok");
        // Each time-profile turn saves twice: the interaction, then the turn.
        let store = FlakyStore::failing_save(4);
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::time());
        tutor.user_turn("old question", t0()).await.unwrap();
        let before = tutor.state().clone();

        let later = t0() + Duration::minutes(10);
        assert!(tutor.user_turn("new question", later).await.is_err());
        assert_eq!(tutor.state(), &before);
        assert!(!tutor.time_quiz_done());

        let outcome = tutor.user_turn("new question", later).await.unwrap();
        assert_eq!(outcome.trigger.topic(), Some("old question"));
        assert!(tutor.time_quiz_done());
    }

    #[tokio::test]
    async fn events_are_reported() {
        let seen = Mutex::new(Vec::new());
        let handler = FnEventHandler::new(|event| {
            let name = match event {
                TutorEvent::Reply { .. } => "reply",
                TutorEvent::GenerationFailed { .. } => "failed",
                TutorEvent::QuizFired { .. } => "quiz",
                TutorEvent::CardCreated { .. } => "card",
                TutorEvent::CardReviewed { .. } => "reviewed",
                TutorEvent::HistoryReset => "reset",
                TutorEvent::StateSaved => "saved",
            };
            seen.lock().unwrap().push(name);
        });
        let provider = ScriptedProvider::new().with_default_reply("ok");
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::fusion(false))
            .with_event_handler(&handler);

        tutor.user_turn("q", t0()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["reply", "card", "saved"]);
    }

    #[tokio::test]
    async fn failed_reply_is_reported_once() {
        let failures = Mutex::new(Vec::new());
        let handler = FnEventHandler::new(|event| {
            if let TutorEvent::GenerationFailed { stage, .. } = event {
                failures.lock().unwrap().push(*stage);
            }
        });
        let provider =
            ScriptedProvider::new().then_fail(GenerationError::Transport("reset".into()));
        let store = MemoryStore::new();
        let mut tutor = Tutor::open(&provider, &store, TutorConfig::spaced())
            .with_event_handler(&handler);

        let outcome = tutor.user_turn("q", t0()).await.unwrap();
        assert!(outcome.reply.content.starts_with("Error: "));
        assert_eq!(*failures.lock().unwrap(), vec![GenerationStage::Reply]);
    }
}
