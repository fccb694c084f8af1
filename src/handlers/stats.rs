// src/handlers/stats.rs

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::stats::StatsParams,
    services::stats_service::{self, StatsSettings},
};

/// Dashboard statistics for one quiz over `timeRange` (week, month or all).
/// An unknown `timeRange` is a validation error.
pub async fn get_stats(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<StatsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Query(params) = query?;
    let language = params.lang.as_deref().unwrap_or(&config.default_language);

    let stats = stats_service::compute_stats(
        &pool,
        StatsSettings::from(&config),
        id,
        params.time_range,
        language,
    )
    .await?;

    Ok(Json(stats))
}
