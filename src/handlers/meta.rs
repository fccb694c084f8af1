// src/handlers/meta.rs

use axum::{Json, response::IntoResponse};

use crate::i18n::supported_languages;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Languages offered by the language selector.
pub async fn list_languages() -> impl IntoResponse {
    Json(supported_languages())
}
