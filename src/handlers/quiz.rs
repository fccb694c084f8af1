// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::quiz::{CreateQuizRequest, LanguageParams, QuizSummary, TranslationRequest},
    services::quiz_service,
    state::QuizLocks,
};

/// Lists all quizzes, oldest first, with titles in the requested language.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    query: Result<Query<LanguageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = query?;
    let language = params.lang.unwrap_or(config.default_language);

    let quizzes: Vec<QuizSummary> = quiz_service::list_quizzes(&pool)
        .await?
        .iter()
        .map(|h| h.to_summary(&language))
        .collect();

    Ok(Json(quizzes))
}

/// Retrieves a quiz for taking it. Correct answers are never included.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<LanguageParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let language = params.lang.unwrap_or(config.default_language);
    let quiz = quiz_service::get_quiz(&pool, id).await?;

    Ok(Json(quiz.to_public(&language)))
}

/// Creates a new quiz.
///
/// * Title must not be empty and at least one question is required.
/// * Every question needs two or more options, exactly one of them correct.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let quiz_id = quiz_service::create_quiz(&pool, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Quiz created successfully",
            "quiz_id": quiz_id
        })),
    ))
}

/// Replaces the content of a quiz. Rejected once the quiz has attempts.
pub async fn replace_quiz(
    State(pool): State<SqlitePool>,
    State(locks): State<QuizLocks>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    quiz_service::replace_quiz(&pool, &locks, id, &payload).await?;

    Ok(Json(serde_json::json!({
        "message": "Quiz updated successfully",
        "quiz_id": id
    })))
}

/// Deletes a quiz and its content. Rejected once the quiz has attempts.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    State(locks): State<QuizLocks>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    quiz_service::delete_quiz(&pool, &locks, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Adds or overwrites translations for one language and returns the quiz in it.
pub async fn upsert_translation(
    State(pool): State<SqlitePool>,
    State(locks): State<QuizLocks>,
    path: Result<Path<(i64, String)>, PathRejection>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((id, lang)) = path?;
    let Json(payload) = payload?;
    let quiz = quiz_service::upsert_translation(&pool, &locks, id, &lang, &payload).await?;

    Ok(Json(quiz.to_public(&lang)))
}
