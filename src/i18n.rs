// src/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static LANGUAGE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").expect("language code regex is valid")
});

/// A language the quiz UI offers in its selector.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "zh", name: "Chinese" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "id", name: "Indonesian" },
    Language { code: "ga", name: "Irish" },
    Language { code: "it", name: "Italian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "pl", name: "Polish" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ru", name: "Russian" },
    Language { code: "es", name: "Spanish" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "vi", name: "Vietnamese" },
];

pub fn supported_languages() -> &'static [Language] {
    SUPPORTED_LANGUAGES
}

/// Trims and lower-cases a language code (`" es-MX "` -> `"es-mx"`).
pub fn normalize_language(code: &str) -> String {
    code.trim().replace('_', "-").to_lowercase()
}

/// Normalises `code` and checks that it looks like a BCP 47 tag.
/// Returns `None` for anything that cannot be stored as a translation key.
pub fn parse_language(code: &str) -> Option<String> {
    let normalized = normalize_language(code);
    LANGUAGE_CODE.is_match(&normalized).then_some(normalized)
}

/// Picks the text for `language`: the exact translation, then the translation of the
/// primary subtag (`es-mx` falls back to `es`), then the default-language text.
///
/// A missing translation is never an error.
pub fn resolve_text<'a>(
    default_text: &'a str,
    translations: &'a HashMap<String, String>,
    language: &str,
) -> &'a str {
    if translations.is_empty() {
        return default_text;
    }

    let language = normalize_language(language);
    if let Some(text) = translations.get(&language) {
        return text;
    }

    language
        .split_once('-')
        .and_then(|(primary, _)| translations.get(primary))
        .map(String::as_str)
        .unwrap_or(default_text)
}

/// Anything carrying default-language text plus per-language overrides.
pub trait Localized {
    fn default_text(&self) -> &str;

    fn translations(&self) -> &HashMap<String, String>;

    fn text_in(&self, language: &str) -> &str {
        resolve_text(self.default_text(), self.translations(), language)
    }
}
