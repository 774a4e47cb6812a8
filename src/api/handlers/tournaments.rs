use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, ScopeParams, TeamSearchParams, error_response};
use crate::api::models::{PlayerStandingsResponse, RoundListResponse, TeamListResponse, TeamStandingsResponse};
use crate::services::standings::StandingsService;

pub async fn get_rounds(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<String>,
) -> impl IntoResponse {
    let service = StandingsService::new(state.pool.clone());

    match service.rounds(&tournament_id) {
        Ok(rounds) => Json(RoundListResponse {
            tournament_id,
            total_rounds: rounds.len(),
            rounds,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<String>,
    Query(params): Query<ScopeParams>,
) -> impl IntoResponse {
    let service = StandingsService::new(state.pool.clone());

    let report = match service.run(&tournament_id, params.day) {
        Ok(report) => report,
        Err(e) => return error_response(e),
    };

    Json(TeamStandingsResponse {
        tournament_id: report.tournament_id,
        tournament_name: report.tournament_name,
        scope: report.scope,
        rows: report.teams,
    })
    .into_response()
}

pub async fn get_player_standings(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<String>,
    Query(params): Query<ScopeParams>,
) -> impl IntoResponse {
    let service = StandingsService::new(state.pool.clone());

    let report = match service.run(&tournament_id, params.day) {
        Ok(report) => report,
        Err(e) => return error_response(e),
    };

    Json(PlayerStandingsResponse {
        tournament_id: report.tournament_id,
        tournament_name: report.tournament_name,
        scope: report.scope,
        rows: report.players,
    })
    .into_response()
}

pub async fn get_teams(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<String>,
    Query(params): Query<TeamSearchParams>,
) -> impl IntoResponse {
    let service = StandingsService::new(state.pool.clone());
    let query = params.search.unwrap_or_default();

    match service.search_teams(&tournament_id, &query) {
        Ok(items) => Json(TeamListResponse {
            total: items.len(),
            items,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
