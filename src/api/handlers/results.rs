use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;
use std::sync::Arc;

use super::{AppState, error_response};
use crate::api::models::{CommitRequest, ManualResultsRequest};
use crate::domain::RoundNumber;
use crate::scoring::batch_id;
use crate::services::commit::CommitService;

pub async fn post_manual_results(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, round)): Path<(String, RoundNumber)>,
    Json(request): Json<ManualResultsRequest>,
) -> impl IntoResponse {
    info!("Manual results for round {} of {}", round, tournament_id);
    let service = CommitService::new(state.pool.clone());

    match service.save_manual(&tournament_id, round, &request.entries) {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn post_commit(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, round)): Path<(String, RoundNumber)>,
    Json(request): Json<CommitRequest>,
) -> impl IntoResponse {
    info!("Committing {} reviewed items for round {} of {}", request.items.len(), round, tournament_id);
    let service = CommitService::new(state.pool.clone());
    let batch = request.batch.clone().unwrap_or_else(|| batch_id(Utc::now()));

    match service.commit_entries(&tournament_id, round, &batch, &request.items, &request.adjustments) {
        Ok(report) => Json(report).into_response(),
        Err(e) => error_response(e),
    }
}
