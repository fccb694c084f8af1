// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, meta, quiz, stats},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Quiz listing/creation at the paths the UI calls (`/api/quizzes`, `/api/create_quiz`).
/// * Per-quiz routes nested under `/api/quiz`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/attempt", post(attempt::submit_attempt))
        .route(
            "/{id}",
            get(quiz::get_quiz)
                .put(quiz::replace_quiz)
                .delete(quiz::delete_quiz),
        )
        .route("/{id}/stats", get(stats::get_stats))
        .route("/{id}/attempts", get(attempt::list_attempts))
        .route("/{id}/translations/{lang}", put(quiz::upsert_translation));

    Router::new()
        .route("/api/health", get(meta::health))
        .route("/api/languages", get(meta::list_languages))
        .route("/api/quizzes", get(quiz::list_quizzes))
        .route("/api/create_quiz", post(quiz::create_quiz))
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
