//! Backoff and retry for completion calls.
//!
//! A reply, quiz or grading call that hits a rate limit, a 5xx, a dropped
//! connection or an empty reply is tried again after a growing wait.
//! Rejected requests (400, 401, 403, 404, 422) and missing configuration
//! fail at once.

use crate::provider::{CompletionFuture, CompletionProvider};
use crate::{GenerationError, Message};
use rand::Rng;
use std::time::Duration;
use tracing::warn;

/// Backoff policy for a [`RetryingProvider`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt. 0 fails on the first error.
    pub max_retries: u32,
    /// Wait before retry number one.
    pub initial_delay: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
    /// Growth factor applied per retry.
    pub multiplier: f64,
    /// Randomize each wait into `[delay / 2, delay]`.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Wait before retrying after `attempt` failures (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let growth = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let secs = (self.initial_delay.as_secs_f64() * growth).min(self.max_delay.as_secs_f64());
        let scale = if self.jitter {
            rand::thread_rng().gen_range(0.5..=1.0)
        } else {
            1.0
        };
        Duration::from_secs_f64(secs * scale)
    }

    /// Whether `error` should be retried after `attempt` failed attempts.
    pub fn should_retry(&self, error: &GenerationError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient() && !error.is_permanent()
    }
}

/// Wraps a provider and retries transient failures according to a [`RetryConfig`].
///
/// Timeouts and retries are the provider's concern; the session itself
/// awaits one `generate` call per step and never retries on its own.
pub struct RetryingProvider<P> {
    inner: P,
    config: RetryConfig,
}

impl<P: CompletionProvider> RetryingProvider<P> {
    pub fn new(inner: P, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: CompletionProvider> CompletionProvider for RetryingProvider<P> {
    fn generate<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
        Box::pin(async move {
            let mut attempt = 0;
            loop {
                match self.inner.generate(messages).await {
                    Ok(text) => return Ok(text),
                    Err(e) if self.config.should_retry(&e, attempt) => {
                        let delay = self.config.delay_for_attempt(attempt);
                        attempt += 1;
                        warn!(
                            "Generation failed ({e}); retry {attempt} of {} in {:.1}s",
                            self.config.max_retries,
                            delay.as_secs_f64()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        })
    }
}
