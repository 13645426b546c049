//! Conversation context selection.
//!
//! The completion provider never sees the whole history: [`window`] picks the
//! most recent raw messages and optionally pins a single instruction message
//! in front of them.

pub mod window;

pub use window::{ConversationWindow, build_context};
