// src/services/quiz_service.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    i18n::parse_language,
    models::{
        question::{OptionRow, Question, QuestionRow, QuizOption, TranslationRow},
        quiz::{CreateQuizRequest, Quiz, QuizHeader, QuizRow, TranslationRequest},
    },
    state::QuizLocks,
    utils::validation::MAX_TEXT_LEN,
};

/// Trims user text and rejects it when blank or longer than `MAX_TEXT_LEN` characters.
/// The text is otherwise stored as written.
fn clean_required(text: &str, field: &str) -> Result<String, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!("{} is too long", field)));
    }
    Ok(trimmed.to_string())
}

fn group_translations(rows: Vec<TranslationRow>) -> HashMap<i64, HashMap<String, String>> {
    let mut grouped: HashMap<i64, HashMap<String, String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.owner_id).or_default().insert(row.language, row.text);
    }
    grouped
}

/// Creates a quiz with all its questions, options and inline translations.
///
/// Runs in one transaction: a request that fails half-way persists nothing.
pub async fn create_quiz(pool: &SqlitePool, req: &CreateQuizRequest) -> Result<i64, AppError> {
    req.validate()?;
    let title = clean_required(&req.title, "title")?;

    let mut tx = pool.begin().await?;

    let quiz_id = sqlx::query("INSERT INTO quizzes (title, created_at) VALUES (?, ?)")
        .bind(&title)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    insert_content(&mut tx, quiz_id, req).await?;

    tx.commit().await?;

    tracing::info!(
        "Created quiz {} '{}' with {} questions",
        quiz_id,
        title,
        req.questions.len()
    );
    Ok(quiz_id)
}

/// Writes title translations, questions and options of `req` under `quiz_id`.
async fn insert_content(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    req: &CreateQuizRequest,
) -> Result<(), AppError> {
    for (language, text) in &req.translations {
        upsert_quiz_title(conn, quiz_id, language, text).await?;
    }

    for (q_pos, question) in req.questions.iter().enumerate() {
        let question_text = clean_required(&question.question, "question")?;
        let question_id = sqlx::query(
            "INSERT INTO questions (quiz_id, position, question_text) VALUES (?, ?, ?)",
        )
        .bind(quiz_id)
        .bind(q_pos as i64)
        .bind(&question_text)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        for (language, text) in &question.translations {
            upsert_question_text(conn, question_id, language, text).await?;
        }

        for (o_pos, option) in question.options.iter().enumerate() {
            let option_text = clean_required(&option.text, "option text")?;
            let option_id = sqlx::query(
                "INSERT INTO options (question_id, position, option_text, is_correct) VALUES (?, ?, ?, ?)",
            )
            .bind(question_id)
            .bind(o_pos as i64)
            .bind(&option_text)
            .bind(option.is_correct)
            .execute(&mut *conn)
            .await?
            .last_insert_rowid();

            for (language, text) in &option.translations {
                upsert_option_text(conn, option_id, language, text).await?;
            }
        }
    }

    Ok(())
}

fn language_key(language: &str) -> Result<String, AppError> {
    parse_language(language)
        .ok_or_else(|| AppError::Validation(format!("Invalid language code '{}'", language)))
}

async fn upsert_quiz_title(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    language: &str,
    text: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_translations (quiz_id, language, title)
        VALUES (?, ?, ?)
        ON CONFLICT(quiz_id, language) DO UPDATE SET title = excluded.title
        "#,
    )
    .bind(quiz_id)
    .bind(language_key(language)?)
    .bind(clean_required(text, "translated title")?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_question_text(
    conn: &mut SqliteConnection,
    question_id: i64,
    language: &str,
    text: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO question_translations (question_id, language, question_text)
        VALUES (?, ?, ?)
        ON CONFLICT(question_id, language) DO UPDATE SET question_text = excluded.question_text
        "#,
    )
    .bind(question_id)
    .bind(language_key(language)?)
    .bind(clean_required(text, "translated question")?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_option_text(
    conn: &mut SqliteConnection,
    option_id: i64,
    language: &str,
    text: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO option_translations (option_id, language, option_text)
        VALUES (?, ?, ?)
        ON CONFLICT(option_id, language) DO UPDATE SET option_text = excluded.option_text
        "#,
    )
    .bind(option_id)
    .bind(language_key(language)?)
    .bind(clean_required(text, "translated option")?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Loads a quiz with questions, options and every translation.
pub async fn load_quiz(conn: &mut SqliteConnection, quiz_id: i64) -> Result<Quiz, AppError> {
    let quiz = sqlx::query_as::<_, QuizRow>(
        "SELECT id, title, created_at FROM quizzes WHERE id = ?",
    )
    .bind(quiz_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::quiz_not_found(quiz_id))?;

    let question_rows = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, quiz_id, question_text FROM questions WHERE quiz_id = ? ORDER BY position, id",
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let option_rows = sqlx::query_as::<_, OptionRow>(
        r#"
        SELECT o.id, o.question_id, o.option_text, o.is_correct
        FROM options o
        JOIN questions q ON q.id = o.question_id
        WHERE q.quiz_id = ?
        ORDER BY q.position, o.position, o.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let title_translations = sqlx::query_as::<_, TranslationRow>(
        "SELECT quiz_id AS owner_id, language, title AS text FROM quiz_translations WHERE quiz_id = ?",
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let question_translations = sqlx::query_as::<_, TranslationRow>(
        r#"
        SELECT t.question_id AS owner_id, t.language, t.question_text AS text
        FROM question_translations t
        JOIN questions q ON q.id = t.question_id
        WHERE q.quiz_id = ?
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let option_translations = sqlx::query_as::<_, TranslationRow>(
        r#"
        SELECT t.option_id AS owner_id, t.language, t.option_text AS text
        FROM option_translations t
        JOIN options o ON o.id = t.option_id
        JOIN questions q ON q.id = o.question_id
        WHERE q.quiz_id = ?
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut question_translations = group_translations(question_translations);
    let mut option_translations = group_translations(option_translations);

    let mut options_by_question: HashMap<i64, Vec<QuizOption>> = HashMap::new();
    for row in option_rows {
        options_by_question
            .entry(row.question_id)
            .or_default()
            .push(QuizOption {
                id: row.id,
                question_id: row.question_id,
                text: row.option_text,
                is_correct: row.is_correct,
                translations: option_translations.remove(&row.id).unwrap_or_default(),
            });
    }

    let questions = question_rows
        .into_iter()
        .map(|row| Question {
            id: row.id,
            quiz_id: row.quiz_id,
            text: row.question_text,
            translations: question_translations.remove(&row.id).unwrap_or_default(),
            options: options_by_question.remove(&row.id).unwrap_or_default(),
        })
        .collect();

    Ok(Quiz {
        id: quiz.id,
        title: quiz.title,
        created_at: quiz.created_at,
        translations: title_translations
            .into_iter()
            .map(|t| (t.language, t.text))
            .collect(),
        questions,
    })
}

pub async fn get_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    let mut conn = pool.acquire().await?;
    load_quiz(&mut conn, quiz_id).await
}

/// All quizzes, oldest first.
pub async fn list_quizzes(pool: &SqlitePool) -> Result<Vec<QuizHeader>, AppError> {
    let rows = sqlx::query_as::<_, QuizRow>("SELECT id, title, created_at FROM quizzes")
        .fetch_all(pool)
        .await?;

    let translations = sqlx::query_as::<_, TranslationRow>(
        "SELECT quiz_id AS owner_id, language, title AS text FROM quiz_translations",
    )
    .fetch_all(pool)
    .await?;
    let mut translations = group_translations(translations);

    let mut headers: Vec<QuizHeader> = rows
        .into_iter()
        .map(|row| QuizHeader {
            translations: translations.remove(&row.id).unwrap_or_default(),
            id: row.id,
            title: row.title,
            created_at: row.created_at,
        })
        .collect();

    headers.sort_by_key(|h| (h.created_at, h.id));
    Ok(headers)
}

/// Maps each question of the quiz to its correct option.
pub async fn get_correct_options(
    conn: &mut SqliteConnection,
    quiz_id: i64,
) -> Result<HashMap<i64, i64>, AppError> {
    let pairs = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT q.id, o.id
        FROM questions q
        JOIN options o ON o.question_id = q.id
        WHERE q.quiz_id = ? AND o.is_correct = TRUE
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(pairs.into_iter().collect())
}

/// Maps every option of the quiz to the question it belongs to.
pub async fn option_owners(
    conn: &mut SqliteConnection,
    quiz_id: i64,
) -> Result<HashMap<i64, i64>, AppError> {
    let pairs = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT o.id, o.question_id
        FROM options o
        JOIN questions q ON q.id = o.question_id
        WHERE q.quiz_id = ?
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(pairs.into_iter().collect())
}

pub async fn ensure_exists(conn: &mut SqliteConnection, quiz_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::quiz_not_found(quiz_id))
}

async fn ensure_no_attempts(conn: &mut SqliteConnection, quiz_id: i64) -> Result<(), AppError> {
    let attempts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attempts WHERE quiz_id = ?")
        .bind(quiz_id)
        .fetch_one(&mut *conn)
        .await?;

    if attempts > 0 {
        return Err(AppError::Conflict(format!(
            "Quiz {} already has {} attempts and can no longer be changed",
            quiz_id, attempts
        )));
    }
    Ok(())
}

/// Replaces title, questions and options of a quiz that has no attempts yet.
pub async fn replace_quiz(
    pool: &SqlitePool,
    locks: &QuizLocks,
    quiz_id: i64,
    req: &CreateQuizRequest,
) -> Result<(), AppError> {
    req.validate()?;
    let title = clean_required(&req.title, "title")?;

    let _guard = locks.lock(quiz_id).await;

    // Attempts for this quiz are only written under the same guard.
    {
        let mut conn = pool.acquire().await?;
        ensure_exists(&mut conn, quiz_id).await?;
        ensure_no_attempts(&mut conn, quiz_id).await?;
    }

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE quizzes SET title = ? WHERE id = ?")
        .bind(&title)
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM quiz_translations WHERE quiz_id = ?")
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

    // Cascades to options and question/option translations.
    sqlx::query("DELETE FROM questions WHERE quiz_id = ?")
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

    insert_content(&mut tx, quiz_id, req).await?;

    tx.commit().await?;

    tracing::info!("Replaced content of quiz {}", quiz_id);
    Ok(())
}

/// Deletes a quiz that has no attempts, cascading to its content.
pub async fn delete_quiz(pool: &SqlitePool, locks: &QuizLocks, quiz_id: i64) -> Result<(), AppError> {
    let _guard = locks.lock(quiz_id).await;

    {
        let mut conn = pool.acquire().await?;
        ensure_exists(&mut conn, quiz_id).await?;
        ensure_no_attempts(&mut conn, quiz_id).await?;
    }

    sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .execute(pool)
        .await?;

    locks.forget(quiz_id);
    tracing::info!("Deleted quiz {}", quiz_id);
    Ok(())
}

/// Adds or overwrites translations of a quiz in one language.
///
/// Allowed after attempts exist: translations never change what is graded.
pub async fn upsert_translation(
    pool: &SqlitePool,
    locks: &QuizLocks,
    quiz_id: i64,
    language: &str,
    req: &TranslationRequest,
) -> Result<Quiz, AppError> {
    let language = language_key(language)?;

    if req.title.is_none() && req.questions.is_empty() {
        return Err(AppError::Validation("Nothing to translate".to_string()));
    }

    let _guard = locks.lock(quiz_id).await;

    let quiz = get_quiz(pool, quiz_id).await?;

    // Every referenced id must belong to this quiz before anything is written.
    for qt in &req.questions {
        let question = quiz
            .questions
            .iter()
            .find(|q| q.id == qt.question_id)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Question {} does not belong to quiz {}",
                    qt.question_id, quiz_id
                ))
            })?;

        for ot in &qt.options {
            if question.option(ot.option_id).is_none() {
                return Err(AppError::Validation(format!(
                    "Option {} does not belong to question {}",
                    ot.option_id, qt.question_id
                )));
            }
        }
    }

    let mut tx = pool.begin().await?;

    if let Some(title) = &req.title {
        upsert_quiz_title(&mut tx, quiz_id, &language, title).await?;
    }

    for qt in &req.questions {
        if let Some(text) = &qt.question {
            upsert_question_text(&mut tx, qt.question_id, &language, text).await?;
        }
        for ot in &qt.options {
            upsert_option_text(&mut tx, ot.option_id, &language, &ot.text).await?;
        }
    }

    let updated = load_quiz(&mut tx, quiz_id).await?;
    tx.commit().await?;

    tracing::info!("Stored '{}' translations for quiz {}", language, quiz_id);
    Ok(updated)
}
