// src/models/question.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::{
    i18n::Localized,
    utils::validation::{MAX_TEXT_LEN, not_blank, validate_translations},
};

/// A question of a quiz, with its options in display order.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// Default-language text.
    pub text: String,

    pub translations: HashMap<String, String>,

    pub options: Vec<QuizOption>,
}

impl Question {
    /// Id of the single option flagged correct.
    pub fn correct_option_id(&self) -> Option<i64> {
        self.options.iter().find(|o| o.is_correct).map(|o| o.id)
    }

    pub fn option(&self, option_id: i64) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Student-facing view: text resolved for `language`, correctness hidden.
    pub fn to_public(&self, language: &str) -> PublicQuestion {
        PublicQuestion {
            id: self.id,
            question: self.text_in(language).to_string(),
            options: self
                .options
                .iter()
                .map(|o| PublicOption {
                    id: o.id,
                    text: o.text_in(language).to_string(),
                })
                .collect(),
        }
    }
}

impl Localized for Question {
    fn default_text(&self) -> &str {
        &self.text
    }

    fn translations(&self) -> &HashMap<String, String> {
        &self.translations
    }
}

/// One answer choice. Named `QuizOption` to stay clear of `std::option::Option`.
#[derive(Debug, Clone)]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub translations: HashMap<String, String>,
}

impl Localized for QuizOption {
    fn default_text(&self) -> &str {
        &self.text
    }

    fn translations(&self) -> &HashMap<String, String> {
        &self.translations
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
}

/// Represents the 'options' table in the database.
#[derive(Debug, FromRow)]
pub struct OptionRow {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
}

/// A row of any of the `*_translations` tables, keyed by the owning entity id.
#[derive(Debug, FromRow)]
pub struct TranslationRow {
    pub owner_id: i64,
    pub language: String,
    pub text: String,
}

/// DTO for sending a question to students (excludes correctness).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question: String,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// DTO for authoring a question.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(max = 1000), custom(function = not_blank))]
    pub question: String,

    #[serde(default)]
    #[validate(custom(function = validate_translations))]
    pub translations: HashMap<String, String>,

    #[validate(custom(function = validate_options))]
    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOptionRequest {
    pub text: String,

    #[serde(rename = "isCorrect", alias = "is_correct", default)]
    pub is_correct: bool,

    #[serde(default)]
    pub translations: HashMap<String, String>,
}

/// At least two options, exactly one of them correct, none blank.
fn validate_options(options: &[CreateOptionRequest]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("at_least_two_options_required"));
    }

    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err(validator::ValidationError::new("exactly_one_correct_option_required"));
    }

    for opt in options {
        not_blank(&opt.text)?;
        if opt.text.chars().count() > MAX_TEXT_LEN {
            return Err(validator::ValidationError::new("option_too_long"));
        }
        validate_translations(&opt.translations)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool) -> CreateOptionRequest {
        CreateOptionRequest {
            text: text.to_string(),
            is_correct,
            translations: HashMap::new(),
        }
    }

    fn question(options: Vec<CreateOptionRequest>) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question: "Capital of France?".to_string(),
            translations: HashMap::new(),
            options,
        }
    }

    #[test]
    fn accepts_single_correct_option() {
        let q = question(vec![option("Paris", true), option("Rome", false)]);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn text_limits_count_characters_not_bytes() {
        let mut q = question(vec![option(&"答".repeat(1000), true), option("Rome", false)]);
        q.question = "问".repeat(400);
        assert!(q.validate().is_ok());

        q.options[0].text = "答".repeat(1001);
        assert!(q.validate().is_err());
    }

    #[test]
    fn rejects_fewer_than_two_options() {
        let q = question(vec![option("Paris", true)]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn rejects_zero_or_many_correct_options() {
        let none = question(vec![option("Paris", false), option("Rome", false)]);
        assert!(none.validate().is_err());

        let two = question(vec![option("Paris", true), option("Rome", true)]);
        assert!(two.validate().is_err());
    }

    #[test]
    fn rejects_blank_question_or_option() {
        let mut q = question(vec![option("Paris", true), option("Rome", false)]);
        q.question = "   ".to_string();
        assert!(q.validate().is_err());

        let q = question(vec![option("Paris", true), option(" ", false)]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn public_view_hides_correctness_and_resolves_language() {
        let q = Question {
            id: 1,
            quiz_id: 1,
            text: "Capital of France?".to_string(),
            translations: HashMap::from([("fr".to_string(), "Capitale de la France ?".to_string())]),
            options: vec![
                QuizOption {
                    id: 10,
                    question_id: 1,
                    text: "Paris".to_string(),
                    is_correct: true,
                    translations: HashMap::new(),
                },
                QuizOption {
                    id: 11,
                    question_id: 1,
                    text: "Rome".to_string(),
                    is_correct: false,
                    translations: HashMap::from([("fr".to_string(), "Rome (fr)".to_string())]),
                },
            ],
        };

        let public = q.to_public("fr");
        assert_eq!(public.question, "Capitale de la France ?");
        assert_eq!(public.options[0].text, "Paris");
        assert_eq!(public.options[1].text, "Rome (fr)");

        let json = serde_json::to_value(&public).unwrap();
        assert!(json["options"][0].get("isCorrect").is_none());
        assert_eq!(q.correct_option_id(), Some(10));
    }
}
