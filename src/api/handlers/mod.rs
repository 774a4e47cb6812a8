use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::Deserialize;

use crate::config::settings::AppConfig;

pub mod results;
pub mod tournaments;

pub struct AppState {
    pub pool: Pool<SqliteConnectionManager>,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct ScopeParams {
    /// 1-based schedule day; absent means every round.
    pub day: Option<usize>,
}

#[derive(Deserialize)]
pub struct TeamSearchParams {
    pub search: Option<String>,
}

/// Storage failures are the server's fault; anything else was a bad request.
pub(crate) fn error_response(e: anyhow::Error) -> Response {
    let storage_failure = e
        .chain()
        .any(|cause| cause.is::<rusqlite::Error>() || cause.is::<r2d2::Error>());

    let status = if storage_failure {
        log::error!("Request failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    } else if e.to_string().starts_with("Unknown tournament") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, format!("{:#}", e)).into_response()
}
