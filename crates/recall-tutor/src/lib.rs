//! Command-line study tutor powered by recall-rs.
//!
//! `recall-tutor` wires a [`Tutor`](recall_rs::session::Tutor) to the
//! OpenRouter API, a JSON state file and the terminal.
//!
//! # Library usage
//!
//! ```ignore
//! use recall_tutor::{TutorCliConfig, api_key_from_env};
//! use recall_rs::prelude::*;
//!
//! let cli = TutorCliConfig { profile: Profile::Fusion, ..Default::default() };
//! let provider = cli.build_client(api_key_from_env()?)?;
//! let store = JsonFileStore::new(cli.state_path());
//! let tutor = Tutor::open(&provider, &store, cli.build_tutor_config());
//! ```
//!
//! # Binary
//!
//! ```sh
//! # Chat with the count-triggered quiz tutor, one turn per line
//! recall chat
//!
//! # Add a review card and review it later
//! recall --profile spaced add "What is a closure?"
//! recall --profile spaced review --answer "A function plus its environment"
//! ```

pub mod config;
pub mod render;

pub use config::{API_KEY_VAR, TutorCliConfig, api_key_from_env};
