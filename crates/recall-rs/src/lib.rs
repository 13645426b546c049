//! Tutoring session engine for LLM-backed study assistants.
//!
//! `recall-rs` wraps a chat completion call with a handful of pedagogical
//! policies: it bounds the conversation context sent to the model, decides
//! *when* to interject a quiz, and schedules knowledge-card review with a
//! leveled, fixed-interval delay table. The core abstraction is the
//! [`Tutor`](session::tutor::Tutor), a single-user session that processes one
//! turn at a time and persists its [`EngineState`](state::EngineState) after
//! every state-changing operation.
//!
//! # Getting started
//!
//! ```ignore
//! use recall_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = std::env::var("OPENROUTER_KEY")?;
//!     let client = OpenRouterClient::new(api_key)?.with_model("google/gemini-2.5-flash-lite");
//!     let store = JsonFileStore::new("counter_state.json");
//!
//!     let mut tutor = Tutor::open(&client, &store, TutorConfig::counter())
//!         .with_event_handler(&LoggingHandler);
//!
//!     let outcome = tutor.user_turn("What is a closure?", chrono::Utc::now()).await?;
//!     println!("{}", outcome.reply.content);
//!     if let Some(quiz) = outcome.quiz {
//!         println!("{}", quiz.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Plug in a model:** implement [`CompletionProvider`](provider::CompletionProvider),
//!   or use [`OpenRouterClient`]. Wrap any provider in
//!   [`RetryingProvider`](api::retry::RetryingProvider) for backoff on
//!   transient failures. [`ScriptedProvider`](provider::ScriptedProvider)
//!   replays canned replies for tests.
//!
//! - **Bound the context:** [`build_context`](context::window::build_context)
//!   selects the last N raw messages and optionally prepends an instruction.
//!
//! - **Decide when to quiz:** [`CountTrigger`](trigger::count::CountTrigger)
//!   fires every fifth user turn; [`TimeTrigger`](trigger::time::TimeTrigger)
//!   fires once per session on the first interaction older than ten minutes.
//!
//! - **Schedule review:** [`review::scheduler`] owns the delay table and the
//!   only transitions that change a card's level or due time.
//!
//! - **Persist:** [`PersistentStore`](store::PersistentStore) with the
//!   [`JsonFileStore`](store::JsonFileStore) and
//!   [`MemoryStore`](store::MemoryStore) implementations.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`session`] | [`Tutor`](session::tutor::Tutor) orchestration, profiles, events |
//! | [`trigger`] | Count- and time-based quiz trigger policies |
//! | [`review`] | Leveled review scheduler and answer judgment |
//! | [`context`] | Conversation window selection |
//! | [`quiz`] | Quiz question composition |
//! | [`store`] | Persistent state load/save |
//! | [`api`] | Retry with backoff around any completion provider |

pub mod api;
pub mod context;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod quiz;
pub mod review;
pub mod session;
pub mod state;
pub mod store;
pub mod timestamp;
pub mod trigger;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub use error::{GenerationError, StoreError};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for all completion calls.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-lite";

/// Default maximum tokens per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Per-request HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ── Conversation messages ──────────────────────────────────────────

/// Who said a message. Tutors only ever send `user` and `assistant` turns;
/// pinned instructions travel as `user` messages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        })
    }
}

/// A message in the conversation. Never mutated after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

// ── Wire format ────────────────────────────────────────────────────

/// Chat completion request body. Only the fields the tutor uses are sent.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_unset")]
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn is_unset(limit: &u32) -> bool {
    *limit == 0
}

#[derive(Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    error: Option<ApiErrorBody>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The first choice of a completion response.
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

impl From<CompletionBody> for ChatCompletion {
    fn from(body: CompletionBody) -> Self {
        let (content, finish_reason) = body
            .choices
            .into_iter()
            .next()
            .map_or((None, None), |c| (c.message.content, c.finish_reason));
        Self {
            content,
            usage: body.usage,
            finish_reason,
        }
    }
}

/// Token counts reported by the API.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── OpenRouter client ──────────────────────────────────────────────

/// OpenRouter chat completions over HTTPS.
///
/// Carries the model and sampling settings used when it acts as a
/// [`CompletionProvider`](provider::CompletionProvider).
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    referer: String,
    title: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl OpenRouterClient {
    /// Client identifying itself as recall-rs.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GenerationError> {
        Self::with_headers(api_key, "https://github.com/recall-rs", "recall-rs")
    }

    /// Client with the given `HTTP-Referer` and `X-Title` attribution headers.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("recall-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            referer: referer.into(),
            title: title.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Cap on tokens per reply. 0 leaves it to the provider.
    pub fn with_max_tokens(mut self, limit: u32) -> Self {
        self.max_tokens = limit;
        self
    }

    /// Sampling temperature. `None` leaves the provider default.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for `messages` under this client's settings.
    pub fn request_for(&self, messages: &[Message]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// POST one completion request and decode the first choice.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, GenerationError> {
        debug!(
            "Completion request: model={}, {} messages, max_tokens={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
        );
        trace!(
            "Request body: {} bytes",
            serde_json::to_vec(body).map_or(0, |b| b.len())
        );
        let started = Instant::now();

        let response = self
            .http
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("failed to read response: {e}")))?;
        debug!(
            "Completion response: HTTP {status} after {:.1}s, {} bytes",
            started.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionBody = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Parse(format!("failed to parse response: {e}")))?;
        if let Some(err) = parsed.error {
            return Err(GenerationError::Api(err.message));
        }
        if let Some(usage) = &parsed.usage {
            debug!(
                "Tokens used: {} prompt + {} completion",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
            );
        }

        Ok(parsed.into())
    }
}
