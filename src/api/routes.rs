use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    results::{post_commit, post_manual_results},
    tournaments::{get_player_standings, get_rounds, get_standings, get_teams},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tournaments/:id/rounds", get(get_rounds))
        .route("/api/tournaments/:id/standings", get(get_standings))
        .route("/api/tournaments/:id/players", get(get_player_standings))
        .route("/api/tournaments/:id/teams", get(get_teams))
        .route("/api/tournaments/:id/rounds/:round/results", post(post_manual_results))
        .route("/api/tournaments/:id/rounds/:round/commit", post(post_commit))
        .with_state(state)
}
