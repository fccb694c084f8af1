// src/utils/validation.rs

use std::collections::HashMap;

use validator::ValidationError;

use crate::i18n::parse_language;

/// Maximum length, in characters, of a translated or default-language text.
pub const MAX_TEXT_LEN: usize = 1000;

/// Rejects empty or whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("must_not_be_blank"));
    }
    Ok(())
}

/// Checks a `language -> text` map supplied alongside default-language text.
pub fn validate_translations(translations: &HashMap<String, String>) -> Result<(), ValidationError> {
    for (language, text) in translations {
        if parse_language(language).is_none() {
            return Err(ValidationError::new("invalid_language_code"));
        }
        if text.trim().is_empty() {
            return Err(ValidationError::new("translation_must_not_be_blank"));
        }
        if text.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::new("translation_too_long"));
        }
    }
    Ok(())
}
