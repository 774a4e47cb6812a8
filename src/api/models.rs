use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{PlayerStandingsRow, ScheduledRound, StandingsRow, Team};
use crate::scoring::{RankAdjustment, ResultEntry, TeamEntry};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundListResponse {
    pub tournament_id: String,
    pub total_rounds: usize,
    pub rounds: Vec<ScheduledRound>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse<T> {
    pub tournament_id: String,
    pub tournament_name: String,
    pub scope: String,
    pub rows: Vec<T>,
}

pub type TeamStandingsResponse = StandingsResponse<StandingsRow>;
pub type PlayerStandingsResponse = StandingsResponse<PlayerStandingsRow>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListResponse {
    pub items: Vec<Team>,
    pub total: usize,
}

/// Round form as submitted by the manual entry screen
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualResultsRequest {
    pub entries: Vec<TeamEntry>,
}

/// Reviewed detections and the per-rank bonus/penalty fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub items: Vec<ResultEntry>,
    #[serde(default)]
    pub adjustments: BTreeMap<u32, RankAdjustment>,
    /// Client-side batch id; one is generated when absent.
    #[serde(default)]
    pub batch: Option<String>,
}
