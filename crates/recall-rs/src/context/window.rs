//! Recency window over the conversation history.
//!
//! Every request is assembled from two zones:
//! 1. **Pinned prefix**: at most one instruction message, sent as a `user`
//!    message ahead of everything else. Not counted against the window.
//! 2. **Raw recency window**: the last N messages, unmodified, in order.
//!
//! N counts raw messages, not user/assistant turns.

use crate::Message;

/// Build the message list for a completion request.
///
/// Takes the last `window_size` messages of `history` (all of them when the
/// history is shorter) and, when `prefix` is given, places it in front as a
/// synthetic `user` message.
pub fn build_context(history: &[Message], window_size: usize, prefix: Option<&str>) -> Vec<Message> {
    let start = history.len().saturating_sub(window_size);
    let recent = &history[start..];

    let mut msgs = Vec::with_capacity(recent.len() + usize::from(prefix.is_some()));
    if let Some(instruction) = prefix {
        msgs.push(Message::user(instruction));
    }
    msgs.extend(recent.iter().cloned());
    msgs
}

/// A reusable window configuration: size plus optional pinned instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow {
    /// Number of recent raw messages to keep.
    pub size: usize,
    /// Instruction placed ahead of the window.
    pub prefix: Option<String>,
}

impl ConversationWindow {
    pub fn new(size: usize) -> Self {
        Self { size, prefix: None }
    }

    /// Set the pinned instruction message.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Apply the window to a history.
    pub fn build(&self, history: &[Message]) -> Vec<Message> {
        build_context(history, self.size, self.prefix.as_deref())
    }
}
