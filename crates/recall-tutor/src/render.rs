//! Plain-text rendering of tutor output for the terminal.

use chrono::{DateTime, Utc};
use recall_rs::review::ReviewCard;
use recall_rs::session::{ReviewOutcome, TurnOutcome};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Reply, then the quiz (if any) after a blank line.
pub fn render_turn(outcome: &TurnOutcome) -> String {
    match &outcome.quiz {
        Some(quiz) => format!("{}\n\n{}", outcome.reply.content, quiz.content),
        None => outcome.reply.content.clone(),
    }
}

/// One line per card: index, level, due time and question.
pub fn render_card_line(index: usize, card: &ReviewCard) -> String {
    format!(
        "[{index}] level {} | due {} | {}",
        card.level(),
        card.next_due().format(TIME_FORMAT),
        card.question
    )
}

/// Due cards with their storage indices, or when the next one comes due.
pub fn render_due_list(cards: &[ReviewCard], now: DateTime<Utc>) -> String {
    let due: Vec<String> = cards
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_due(now))
        .map(|(i, c)| render_card_line(i, c))
        .collect();
    if !due.is_empty() {
        return due.join("\n");
    }

    match cards.iter().map(ReviewCard::next_due).min() {
        Some(next) => format!("No cards due. Next review at {}.", next.format(TIME_FORMAT)),
        None => "No cards due.".to_string(),
    }
}

pub fn render_review(outcome: &ReviewOutcome) -> String {
    let verdict = if outcome.correct { "Correct" } else { "Incorrect" };
    let mut text = format!(
        "{verdict}. Level {} -> {}, next review at {}.",
        outcome.previous_level,
        outcome.card.level(),
        outcome.card.next_due().format(TIME_FORMAT)
    );
    if let Some(error) = &outcome.error {
        text.push_str(&format!("\n(grading failed: {error})"));
    }
    text
}
