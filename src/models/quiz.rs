// src/models/quiz.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::{
    i18n::Localized,
    models::question::{CreateQuestionRequest, PublicQuestion, Question},
    utils::validation::{not_blank, validate_translations},
};

/// A quiz with its questions in display order.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub translations: HashMap<String, String>,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn to_public(&self, language: &str) -> PublicQuiz {
        PublicQuiz {
            id: self.id,
            title: self.text_in(language).to_string(),
            questions: self.questions.iter().map(|q| q.to_public(language)).collect(),
        }
    }
}

impl Localized for Quiz {
    fn default_text(&self) -> &str {
        &self.title
    }

    fn translations(&self) -> &HashMap<String, String> {
        &self.translations
    }
}

/// Quiz metadata without questions, as shown in quiz lists.
#[derive(Debug, Clone)]
pub struct QuizHeader {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub translations: HashMap<String, String>,
}

impl QuizHeader {
    pub fn to_summary(&self, language: &str) -> QuizSummary {
        QuizSummary {
            id: self.id,
            title: self.text_in(language).to_string(),
            created_at: self.created_at,
        }
    }
}

impl Localized for QuizHeader {
    fn default_text(&self) -> &str {
        &self.title
    }

    fn translations(&self) -> &HashMap<String, String> {
        &self.translations
    }
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for the student-facing quiz view.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for creating (or fully replacing) a quiz.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(max = 200), custom(function = not_blank))]
    pub title: String,

    /// Translated titles keyed by language code.
    #[serde(default)]
    #[validate(custom(function = validate_translations))]
    pub translations: HashMap<String, String>,

    #[validate(length(min = 1, max = 200), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

/// Query parameters shared by the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LanguageParams {
    pub lang: Option<String>,
}

/// DTO for adding translations to an existing quiz.
/// Every field is optional; only what is present gets written.
#[derive(Debug, Default, Deserialize)]
pub struct TranslationRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionTranslation {
    pub question_id: i64,
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct OptionTranslation {
    pub option_id: i64,
    pub text: String,
}
