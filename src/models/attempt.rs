// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `score / total * 100`, or 0 for an empty quiz.
pub fn percentage(score: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    score as f64 / total as f64 * 100.0
}

/// A recorded submission. Never mutated after insert.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub id: i64,
    pub quiz_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub total: i64,
    pub answers: Vec<AnswerSubmission>,
}

impl Attempt {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.total)
    }

    pub fn selected_option(&self, question_id: i64) -> Option<i64> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.selected_option_id)
    }
}

/// One row of `attempts LEFT JOIN attempt_answers`.
#[derive(Debug, FromRow)]
pub struct AttemptAnswerRow {
    pub id: i64,
    pub quiz_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub total: i64,
    pub question_id: Option<i64>,
    pub option_id: Option<i64>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitAttemptRequest {
    pub quiz_id: i64,
    pub answers: Vec<AnswerSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerSubmission {
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// Returned to the student right after submitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub score: i64,
    pub total: i64,
    pub percentage: f64,
}

impl AttemptResult {
    pub fn new(score: i64, total: i64) -> Self {
        Self {
            score,
            total,
            percentage: percentage(score, total),
        }
    }
}

/// Attempt history entry for the teacher dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub total: i64,
    pub percentage: f64,
}

impl From<&Attempt> for AttemptSummary {
    fn from(attempt: &Attempt) -> Self {
        Self {
            id: attempt.id,
            submitted_at: attempt.submitted_at,
            score: attempt.score,
            total: attempt.total,
            percentage: attempt.percentage(),
        }
    }
}
