// src/services/attempt_service.rs

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::AppError,
    models::attempt::{
        AnswerSubmission, Attempt, AttemptAnswerRow, AttemptResult, AttemptSummary,
        SubmitAttemptRequest,
    },
    services::quiz_service,
    state::QuizLocks,
};

/// What grading needs to know about a quiz.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    /// question id -> correct option id, one entry per question.
    pub correct: HashMap<i64, i64>,
    /// option id -> owning question id.
    pub owners: HashMap<i64, i64>,
}

impl AnswerKey {
    pub async fn load(conn: &mut SqliteConnection, quiz_id: i64) -> Result<Self, AppError> {
        quiz_service::ensure_exists(conn, quiz_id).await?;
        Ok(Self {
            correct: quiz_service::get_correct_options(conn, quiz_id).await?,
            owners: quiz_service::option_owners(conn, quiz_id).await?,
        })
    }

    pub fn total(&self) -> i64 {
        self.correct.len() as i64
    }
}

/// Checks a submission against the key and returns the number of correct answers.
///
/// Exactly one answer per question is required. Answers for foreign or repeated
/// questions are rejected, as are options that belong to another question.
pub fn grade(key: &AnswerKey, answers: &[AnswerSubmission]) -> Result<i64, AppError> {
    let mut answered = HashSet::with_capacity(answers.len());
    let mut score = 0;

    for answer in answers {
        let Some(&correct) = key.correct.get(&answer.question_id) else {
            return Err(AppError::Validation(format!(
                "Question {} does not belong to this quiz",
                answer.question_id
            )));
        };

        if !answered.insert(answer.question_id) {
            return Err(AppError::Validation(format!(
                "Question {} was answered more than once",
                answer.question_id
            )));
        }

        if key.owners.get(&answer.selected_option_id) != Some(&answer.question_id) {
            return Err(AppError::UnknownOption(format!(
                "Option {} does not belong to question {}",
                answer.selected_option_id, answer.question_id
            )));
        }

        if answer.selected_option_id == correct {
            score += 1;
        }
    }

    let mut missing: Vec<i64> = key
        .correct
        .keys()
        .filter(|q| !answered.contains(*q))
        .copied()
        .collect();

    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(AppError::IncompleteSubmission(format!(
            "Unanswered questions: {:?}",
            missing
        )));
    }

    Ok(score)
}

/// Grades and records one attempt.
///
/// The attempt row and its answers are written in a single transaction, so
/// statistics see either the whole attempt or nothing.
pub async fn submit_attempt(
    pool: &SqlitePool,
    locks: &QuizLocks,
    req: &SubmitAttemptRequest,
) -> Result<AttemptResult, AppError> {
    let quiz_id = req.quiz_id;
    let _guard = locks.lock(quiz_id).await;

    // Quiz content only changes under the same guard, so the key stays valid
    // until the transaction below commits.
    let key = {
        let mut conn = pool.acquire().await?;
        AnswerKey::load(&mut conn, quiz_id).await?
    };

    let score = grade(&key, &req.answers)?;
    let total = key.total();

    let mut tx = pool.begin().await?;

    let attempt_id = sqlx::query(
        "INSERT INTO attempts (quiz_id, submitted_at, score, total) VALUES (?, ?, ?, ?)",
    )
    .bind(quiz_id)
    .bind(Utc::now())
    .bind(score)
    .bind(total)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for answer in &req.answers {
        sqlx::query(
            "INSERT INTO attempt_answers (attempt_id, question_id, option_id) VALUES (?, ?, ?)",
        )
        .bind(attempt_id)
        .bind(answer.question_id)
        .bind(answer.selected_option_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let result = AttemptResult::new(score, total);
    tracing::info!(
        "Recorded attempt {} for quiz {}: {}/{} ({:.1}%)",
        attempt_id,
        quiz_id,
        score,
        total,
        result.percentage
    );
    Ok(result)
}

/// Every attempt of a quiz with its answers, in submission order.
pub async fn load_attempts(
    conn: &mut SqliteConnection,
    quiz_id: i64,
) -> Result<Vec<Attempt>, AppError> {
    let rows = sqlx::query_as::<_, AttemptAnswerRow>(
        r#"
        SELECT a.id, a.quiz_id, a.submitted_at, a.score, a.total, aa.question_id, aa.option_id
        FROM attempts a
        LEFT JOIN attempt_answers aa ON aa.attempt_id = a.id
        WHERE a.quiz_id = ?
        ORDER BY a.id, aa.question_id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut attempts: Vec<Attempt> = Vec::new();
    for row in rows {
        let answer = match (row.question_id, row.option_id) {
            (Some(question_id), Some(selected_option_id)) => Some(AnswerSubmission {
                question_id,
                selected_option_id,
            }),
            _ => None,
        };

        match attempts.last_mut() {
            Some(last) if last.id == row.id => last.answers.extend(answer),
            _ => attempts.push(Attempt {
                id: row.id,
                quiz_id: row.quiz_id,
                submitted_at: row.submitted_at,
                score: row.score,
                total: row.total,
                answers: answer.into_iter().collect(),
            }),
        }
    }

    Ok(attempts)
}

/// Attempt history of a quiz, newest first.
pub async fn list_attempts(pool: &SqlitePool, quiz_id: i64) -> Result<Vec<AttemptSummary>, AppError> {
    let mut conn = pool.acquire().await?;
    quiz_service::ensure_exists(&mut conn, quiz_id).await?;
    let attempts = load_attempts(&mut conn, quiz_id).await?;

    Ok(attempts.iter().rev().map(AttemptSummary::from).collect())
}
