//! Convenience re-exports for common `recall-rs` types.
//!
//! ```ignore
//! use recall_rs::prelude::*;
//! ```
//!
//! Covers building a tutor end to end: client and provider seam, config and
//! profiles, stores, event handlers and outcome types. Trigger and scheduler
//! internals are left to their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{GenerationError, Message, MessageRole, OpenRouterClient, StoreError};

// ── Providers ───────────────────────────────────────────────────────
pub use crate::api::{RetryConfig, RetryingProvider};
pub use crate::provider::{CompletionProvider, ScriptedProvider};

// ── Sessions ────────────────────────────────────────────────────────
pub use crate::session::{
    AddCardOutcome, EventHandler, FnEventHandler, LoggingHandler, NoopHandler, Profile,
    ReviewOutcome, Tutor, TutorConfig, TutorEvent, TurnOutcome,
};

// ── State ───────────────────────────────────────────────────────────
pub use crate::review::ReviewCard;
pub use crate::state::EngineState;
pub use crate::store::{JsonFileStore, LoadOutcome, MemoryStore, PersistentStore};
