//! Resilience around the completion boundary.
//!
//! - [`retry`]: transient error detection (429, 5xx, network failures) with
//!   configurable exponential backoff and jitter. Never retries 400/401
//!   errors. [`RetryingProvider`] applies the policy to any
//!   [`CompletionProvider`](crate::provider::CompletionProvider).

pub mod retry;

pub use retry::{RetryConfig, RetryingProvider};
