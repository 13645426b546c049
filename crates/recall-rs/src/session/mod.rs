//! Tutor sessions.
//!
//! - [`config`]: [`TutorConfig`] and the named [`Profile`] presets.
//! - [`events`]: [`TutorEvent`]s and the [`EventHandler`] seam.
//! - [`tutor`]: the [`Tutor`] itself.

pub mod config;
pub mod events;
pub mod tutor;

pub use config::{Profile, TutorConfig};
pub use events::{
    EventHandler, FnEventHandler, GenerationStage, LoggingHandler, NoopHandler, TutorEvent,
};
pub use tutor::{AddCardOutcome, ReviewOutcome, Tutor, TurnOutcome};
