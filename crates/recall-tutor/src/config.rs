//! Command-line tutor configuration.
//!
//! [`TutorCliConfig`] collects what the `recall` binary needs and turns it
//! into recall-rs types via [`build_tutor_config`](TutorCliConfig::build_tutor_config),
//! [`build_client`](TutorCliConfig::build_client) and
//! [`state_path`](TutorCliConfig::state_path).

use std::path::PathBuf;

use recall_rs::api::{RetryConfig, RetryingProvider};
use recall_rs::session::config::SOCRATIC_PROMPT;
use recall_rs::session::{Profile, TutorConfig};
use recall_rs::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, GenerationError, OpenRouterClient};

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_VAR: &str = "OPENROUTER_KEY";

#[derive(Debug, Clone)]
pub struct TutorCliConfig {
    /// Tutor preset. Default: counter.
    pub profile: Profile,
    /// State file. Default: the profile's own file in the working directory.
    pub state_file: Option<PathBuf>,
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Maximum tokens per reply.
    pub max_tokens: u32,
    /// Override the profile's context window.
    pub window: Option<usize>,
    /// Pin the Socratic instruction when the profile has no instruction of
    /// its own.
    pub socratic: bool,
    /// Retries for transient API failures.
    pub retries: u32,
    /// Seed for quiz topic selection.
    pub seed: Option<u64>,
}

impl Default for TutorCliConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            state_file: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            window: None,
            socratic: false,
            retries: 2,
            seed: None,
        }
    }
}

impl TutorCliConfig {
    pub fn build_tutor_config(&self) -> TutorConfig {
        let mut config = TutorConfig::for_profile(self.profile, self.socratic);
        if let Some(size) = self.window {
            config = config.with_window_size(size);
        }
        if self.socratic && config.prefix.is_none() {
            config = config.with_prefix(SOCRATIC_PROMPT);
        }
        config
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.profile.default_state_file())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::with_retries(self.retries)
    }

    /// Build the API client, wrapped in the retry policy.
    pub fn build_client(
        &self,
        api_key: impl Into<String>,
    ) -> Result<RetryingProvider<OpenRouterClient>, GenerationError> {
        let client = OpenRouterClient::with_headers(
            api_key,
            "https://crates.io/crates/recall-tutor",
            "recall-tutor",
        )?
        .with_model(self.model.clone())
        .with_max_tokens(self.max_tokens);
        Ok(RetryingProvider::new(client, self.retry_config()))
    }
}

/// Read the API key from the environment.
pub fn api_key_from_env() -> Result<String, GenerationError> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(GenerationError::Config(format!(
            "{API_KEY_VAR} environment variable is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_rs::session::config::STRICT_SOCRATIC_PROMPT;
    use recall_rs::trigger::TriggerKind;

    #[test]
    fn defaults_follow_counter_profile() {
        let cli = TutorCliConfig::default();
        let config = cli.build_tutor_config();
        assert_eq!(config.trigger, TriggerKind::Count);
        assert_eq!(config.window_size, 1);
        assert_eq!(cli.state_path(), PathBuf::from("counter_state.json"));
        assert_eq!(cli.retry_config().max_retries, 2);
    }

    #[test]
    fn overrides_apply_on_top_of_profile() {
        let cli = TutorCliConfig {
            profile: Profile::Fusion,
            window: Some(12),
            socratic: true,
            state_file: Some(PathBuf::from("/tmp/mine.json")),
            ..Default::default()
        };
        let config = cli.build_tutor_config();
        assert_eq!(config.window_size, 12);
        assert_eq!(config.prefix.as_deref(), Some(SOCRATIC_PROMPT));
        assert!(config.auto_cards);
        assert_eq!(cli.state_path(), PathBuf::from("/tmp/mine.json"));
    }

    #[test]
    fn socratic_flag_keeps_existing_instruction() {
        let cli = TutorCliConfig {
            profile: Profile::Socratic,
            socratic: true,
            ..Default::default()
        };
        assert_eq!(
            cli.build_tutor_config().prefix.as_deref(),
            Some(STRICT_SOCRATIC_PROMPT)
        );

        let counter = TutorCliConfig {
            socratic: true,
            ..Default::default()
        };
        assert_eq!(
            counter.build_tutor_config().prefix.as_deref(),
            Some(SOCRATIC_PROMPT)
        );
    }

    #[test]
    fn client_carries_model_and_retries() {
        let cli = TutorCliConfig {
            model: "some/model".into(),
            retries: 4,
            ..Default::default()
        };
        let provider = cli.build_client("key").unwrap();
        assert_eq!(provider.inner().model(), "some/model");
        assert_eq!(provider.config().max_retries, 4);
    }
}
