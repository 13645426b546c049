//! Answer grading through the completion provider.
//!
//! The model is shown the question, the stored answer and the student's
//! answer, and asked to reply with `Correct` or `Incorrect`. Its verdict is
//! taken as-is: only a reply whose very first characters are "correct" (any
//! case) counts. Leading whitespace is not skipped.

use super::scheduler::ReviewCard;

/// Build the grading prompt for a student's answer to `card`.
pub fn judge_prompt(card: &ReviewCard, student_answer: &str) -> String {
    format!(
        "Question: {}\nCorrect answer: {}\nStudent answer: {}\n\nReply with:\nCorrect OR Incorrect",
        card.question, card.answer, student_answer
    )
}

/// Classify the grader's reply. Anything but a leading "correct" is incorrect.
pub fn classify_judgment(reply: &str) -> bool {
    reply.to_lowercase().starts_with("correct")
}
