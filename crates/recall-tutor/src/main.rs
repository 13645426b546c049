//! Command-line study tutor powered by recall-rs.
//!
//! Chats with a model under one of the tutor profiles, quizzes on earlier
//! questions, and keeps a deck of leveled review cards in a JSON state file.
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Chat, one turn per line of stdin
//! recall --profile socratic chat
//!
//! # Review the first due card
//! recall --profile spaced review
//!
//! # List due cards as JSON
//! recall --profile fusion due --json
//! ```

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use recall_rs::prelude::*;
use recall_rs::review::due_cards;
use recall_rs::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use recall_tutor::TutorCliConfig;
use recall_tutor::config::api_key_from_env;
use recall_tutor::render::{render_card_line, render_due_list, render_review, render_turn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Command-line study tutor powered by recall-rs.
#[derive(Parser)]
#[command(name = "recall", version)]
struct Cli {
    /// Tutor profile: counter, time, spaced, socratic or fusion.
    #[arg(long, global = true, default_value = "counter")]
    profile: Profile,

    /// State file. Defaults to the profile's file in the current directory.
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// Model to use for completions.
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per model reply.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Number of recent messages sent to the model.
    #[arg(long, global = true)]
    window: Option<usize>,

    /// Prefer guiding questions over direct explanations.
    #[arg(long, global = true)]
    socratic: bool,

    /// Retries for transient API failures.
    #[arg(long, global = true, default_value_t = 2)]
    retries: u32,

    /// Seed for quiz topic selection.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the tutor, one turn per line of stdin.
    Chat,
    /// Add a review card; the model writes its answer.
    Add {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// List cards due for review.
    Due {
        /// Print the due cards as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Answer a due card and have the answer graded.
    Review {
        /// The answer. Read from stdin when omitted.
        #[arg(long)]
        answer: Option<String>,
        /// Card index (as listed by `due`). Defaults to the first due card.
        #[arg(long)]
        card: Option<usize>,
    },
    /// Clear the conversation, quiz counters and interaction log. Cards are kept.
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = TutorCliConfig {
        profile: cli.profile,
        state_file: cli.state_file,
        model: cli.model,
        max_tokens: cli.max_tokens,
        window: cli.window,
        socratic: cli.socratic,
        retries: cli.retries,
        seed: cli.seed,
    };
    if let Err(e) = config.build_tutor_config().validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let state_path = config.state_path();
    debug!(
        "Profile {}, state file {}, model {}",
        config.profile,
        state_path.display(),
        config.model
    );
    let store = JsonFileStore::new(state_path);

    let result = match cli.command {
        Command::Chat => chat(&config, &store).await,
        Command::Add { question } => add(&config, &store, &question.join(" ")).await,
        Command::Due { json } => show_due(&store, json),
        Command::Review { answer, card } => review(&config, &store, answer, card).await,
        Command::Reset => reset(&store),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn connect(config: &TutorCliConfig) -> Result<RetryingProvider<OpenRouterClient>, String> {
    let api_key = api_key_from_env().map_err(|e| e.to_string())?;
    config
        .build_client(api_key)
        .map_err(|e| format!("failed to create API client: {e}"))
}

fn open_tutor<'a>(
    provider: &'a dyn CompletionProvider,
    store: &'a JsonFileStore,
    config: &TutorCliConfig,
) -> Tutor<'a> {
    let tutor = Tutor::open(provider, store, config.build_tutor_config())
        .with_event_handler(&LoggingHandler);
    match config.seed {
        Some(seed) => tutor.with_seed(seed),
        None => tutor,
    }
}

// ── Commands ──

async fn chat(config: &TutorCliConfig, store: &JsonFileStore) -> Result<(), String> {
    let provider = connect(config)?;
    let mut tutor = open_tutor(&provider, store, config);
    if tutor.was_fallback() {
        debug!("Starting from an empty state");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read stdin: {e}"))?
    {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let outcome = tutor
            .user_turn(query, Utc::now())
            .await
            .map_err(|e| e.to_string())?;
        println!("{}\n", render_turn(&outcome));
    }
    Ok(())
}

async fn add(config: &TutorCliConfig, store: &JsonFileStore, question: &str) -> Result<(), String> {
    let provider = connect(config)?;
    let mut tutor = open_tutor(&provider, store, config);

    match tutor
        .add_card(question, Utc::now())
        .await
        .map_err(|e| e.to_string())?
    {
        AddCardOutcome::Created(card) => {
            let index = tutor.state().cards.len().saturating_sub(1);
            println!("Saved for review.\n{}", render_card_line(index, &card));
            Ok(())
        }
        AddCardOutcome::Failed(reason) => Err(format!("card not saved: {reason}")),
    }
}

fn show_due(store: &JsonFileStore, json: bool) -> Result<(), String> {
    let state = store.load().state;
    let now = Utc::now();
    if json {
        let due = due_cards(&state.cards, now);
        let text = serde_json::to_string_pretty(&due).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        println!("{}", render_due_list(&state.cards, now));
    }
    Ok(())
}

async fn review(
    config: &TutorCliConfig,
    store: &JsonFileStore,
    answer: Option<String>,
    card: Option<usize>,
) -> Result<(), String> {
    let provider = connect(config)?;
    let mut tutor = open_tutor(&provider, store, config);
    let now = Utc::now();

    let index = match card.or_else(|| tutor.next_due_card(now).map(|(i, _)| i)) {
        Some(index) => index,
        None => {
            println!("{}", render_due_list(&tutor.state().cards, now));
            return Ok(());
        }
    };
    let question = tutor
        .state()
        .cards
        .get(index)
        .map(|c| c.question.clone())
        .ok_or_else(|| format!("no card at index {index}"))?;
    println!("Question: {question}");

    let answer = match answer {
        Some(answer) => answer,
        None => read_answer().await?,
    };
    let outcome = tutor
        .check_answer(index, &answer, Utc::now())
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no card at index {index}"))?;
    println!("{}", render_review(&outcome));
    Ok(())
}

fn reset(store: &JsonFileStore) -> Result<(), String> {
    let mut state = store.load().state;
    state.reset_history();
    store.save(&state).map_err(|e| e.to_string())?;
    println!("History cleared ({} cards kept).", state.cards.len());
    Ok(())
}

async fn read_answer() -> Result<String, String> {
    eprint!("Your answer: ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read stdin: {e}"))?
    {
        Some(line) if !line.trim().is_empty() => Ok(line),
        _ => Err("no answer given".into()),
    }
}
