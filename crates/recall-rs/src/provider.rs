//! The completion provider seam.
//!
//! A [`CompletionProvider`] takes an ordered list of role-tagged messages and
//! returns generated text or a [`GenerationError`]. The session never lets a
//! generation failure escape a turn: [`render_reply`] turns the result into an
//! assistant [`Message`] either way, so every user turn still gains exactly one
//! reply.

use crate::{GenerationError, Message, OpenRouterClient};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// Boxed future returned by [`CompletionProvider::generate`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;

/// Anything that can turn a conversation into a reply.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// impl CompletionProvider for Echo {
///     fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
///         Box::pin(async move {
///             messages
///                 .last()
///                 .map(|m| m.content.clone())
///                 .ok_or(GenerationError::EmptyResponse)
///         })
///     }
/// }
/// ```
pub trait CompletionProvider: Send + Sync {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a>;
}

impl CompletionProvider for OpenRouterClient {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(async move {
            let body = self.request_for(messages);
            let completion = self.chat(&body).await?;
            match completion.content {
                Some(text) if !text.trim().is_empty() => Ok(text),
                _ => Err(GenerationError::EmptyResponse),
            }
        })
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for &P {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        (**self).generate(messages)
    }
}

/// Send a single user prompt and return the raw result.
pub async fn generate_once(
    provider: &dyn CompletionProvider,
    prompt: impl Into<String>,
) -> Result<String, GenerationError> {
    let messages = [Message::user(prompt)];
    provider.generate(&messages).await
}

/// Render a provider result as an assistant message.
///
/// Failures become `"{error_prefix}: {description}"` so they can be shown
/// inline like any other reply.
pub fn render_reply(result: Result<String, GenerationError>, error_prefix: &str) -> Message {
    match result {
        Ok(text) => Message::assistant(text),
        Err(e) => Message::assistant(format!("{error_prefix}: {e}")),
    }
}

// ── ScriptedProvider ───────────────────────────────────────────────

/// A provider that replays queued results in order and records every request.
///
/// Useful for tests and offline demos. When the queue runs dry it answers
/// with the default reply if one is set, otherwise with
/// [`GenerationError::EmptyResponse`].
#[derive(Default)]
pub struct ScriptedProvider {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    default_reply: Option<String>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    /// Reply used once the queue is empty.
    pub fn with_default_reply(mut self, text: impl Into<String>) -> Self {
        self.default_reply = Some(text.into());
        self
    }

    /// Queue a result after construction.
    pub fn push(&self, result: Result<String, GenerationError>) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
    }

    /// Every message list this provider has been asked to complete, in order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of completed `generate` calls.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());
        let next = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let result = match next {
            Some(result) => result,
            None => self
                .default_reply
                .clone()
                .ok_or(GenerationError::EmptyResponse),
        };
        Box::pin(async move { result })
    }
}
