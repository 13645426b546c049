//! Leveled review scheduling.
//!
//! - [`scheduler`]: the delay table, card creation, due selection and the
//!   outcome transition that is the only way a card's level or due time
//!   changes.
//! - [`judge`]: builds the grading prompt and classifies the model's verdict.

pub mod judge;
pub mod scheduler;

pub use judge::{classify_judgment, judge_prompt};
pub use scheduler::{
    LEVEL_DELAYS, MASTERED_DELAY, ReviewCard, create_card, delay_for_level, due_cards,
    first_due_index, record_outcome,
};
