// src/scoring.rs

use serde::Serialize;
use serde_json::Value;

/// Shown when no percentage can be computed.
pub const NEUTRAL_MESSAGE: &str = "Thank you for completing the assessment!";

/// Shown below the lowest threshold.
pub const COMPLETION_MESSAGE: &str = "Thanks for completing the assessment!";

/// Thresholds are checked top-down; the first one reached wins.
const MESSAGE_THRESHOLDS: [(i64, &str); 4] = [
    (90, "Excellent work! Outstanding performance!"),
    (80, "Great job! Very well done!"),
    (70, "Good work! You've done well!"),
    (60, "Nice effort! Keep it up!"),
];

/// Reads a raw score as a number. Strings are parsed, anything else is not numeric.
pub fn numeric_score(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// `round(score / total * 100)`, or `None` when `total` is 0 or the score is not numeric.
/// Halves round towards positive infinity.
pub fn percentage(score: &Value, total: usize) -> Option<i64> {
    if total == 0 {
        return None;
    }
    let score = numeric_score(score)?;
    Some((score / total as f64 * 100.0 + 0.5).floor() as i64)
}

pub fn feedback_message(percentage: Option<i64>) -> &'static str {
    let Some(percentage) = percentage else {
        return NEUTRAL_MESSAGE;
    };

    MESSAGE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, message)| *message)
        .unwrap_or(COMPLETION_MESSAGE)
}

/// What the score page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub score: Value,
    pub total_questions: usize,
    pub percentage: Option<i64>,
    pub message: &'static str,
}

impl ScoreCard {
    pub fn new(score: Value, total_questions: usize) -> Self {
        let percentage = percentage(&score, total_questions);
        Self {
            score,
            total_questions,
            percentage,
            message: feedback_message(percentage),
        }
    }
}

/// Completion figures for the submission review page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub answered_questions: usize,
    pub total_questions: usize,
    pub completion_percentage: f64,
}

impl ReviewSummary {
    pub fn new(answered_questions: usize, total_questions: usize) -> Self {
        let completion_percentage = if total_questions > 0 {
            answered_questions as f64 / total_questions as f64 * 100.0
        } else {
            0.0
        };

        Self {
            answered_questions,
            total_questions,
            completion_percentage,
        }
    }

    /// Warning for the confirm dialog; unanswered questions never block submission.
    pub fn warning(&self) -> Option<String> {
        (self.answered_questions < self.total_questions).then(|| {
            format!(
                "You have only answered {} out of {} questions. Unanswered questions will be marked as incorrect.",
                self.answered_questions, self.total_questions
            )
        })
    }
}
