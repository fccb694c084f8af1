// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError, models::attempt::SubmitAttemptRequest, services::attempt_service,
    state::QuizLocks,
};

/// Submits a student's answers and returns the score.
///
/// * Every question of the quiz must be answered exactly once.
/// * Each selected option must belong to the question it answers.
/// * Retakes are allowed; every call records a new attempt.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    State(locks): State<QuizLocks>,
    payload: Result<Json<SubmitAttemptRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let result = attempt_service::submit_attempt(&pool, &locks, &req).await?;

    Ok(Json(result))
}

/// Attempt history of a quiz, newest first.
pub async fn list_attempts(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let attempts = attempt_service::list_attempts(&pool, id).await?;

    Ok(Json(attempts))
}
