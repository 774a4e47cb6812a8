use anyhow::{Result, bail};
use log::{debug, info};
use serde::Serialize;

use super::roster::{TournamentContext, load_context};
use crate::database::{self, DbPool};
use crate::domain::{PlayerStandingsRow, RoundRange, ScheduledRound, StandingsRow, Team, Tournament};
use crate::scoring::{compute_player_standings, compute_standings};

/// Standings of one tournament over one scope, ready for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsReport {
    pub tournament_id: String,
    pub tournament_name: String,
    pub scope: String,
    pub teams: Vec<StandingsRow>,
    pub players: Vec<PlayerStandingsRow>,
}

pub struct StandingsService {
    pool: DbPool,
}

impl StandingsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Team standings and kill leaderboard. `day` is 1-based; `None` covers
    /// every stored round.
    pub fn run(&self, tournament_id: &str, day: Option<usize>) -> Result<StandingsReport> {
        let mut conn = database::get_connection(&self.pool)?;
        let TournamentContext { tournament, roster } = load_context(&mut conn, tournament_id)?;
        let (range, scope) = select_scope(&tournament, day)?;

        let results = database::results::load_results(&mut conn, tournament_id)?;
        debug!("Loaded {} rounds of results for {}", results.len(), tournament_id);

        let teams = compute_standings(&roster.teams, &results, tournament.scoring(), range);
        let players = compute_player_standings(&roster, &results, range, &teams);
        info!(
            "  → {}: {} teams, {} players with kills ({})",
            tournament.name,
            teams.len(),
            players.len(),
            scope
        );

        Ok(StandingsReport {
            tournament_id: tournament.id,
            tournament_name: tournament.name,
            scope,
            teams,
            players,
        })
    }

    pub fn rounds(&self, tournament_id: &str) -> Result<Vec<ScheduledRound>> {
        let mut conn = database::get_connection(&self.pool)?;
        let context = load_context(&mut conn, tournament_id)?;
        Ok(context.tournament.rounds())
    }

    pub fn search_teams(&self, tournament_id: &str, query: &str) -> Result<Vec<Team>> {
        let mut conn = database::get_connection(&self.pool)?;
        let context = load_context(&mut conn, tournament_id)?;
        Ok(context.roster.search_teams(query).into_iter().cloned().collect())
    }
}

fn select_scope(tournament: &Tournament, day: Option<usize>) -> Result<(RoundRange, String)> {
    let Some(day) = day else {
        return Ok((RoundRange::All, "All rounds".to_string()));
    };

    let index = day.wrapping_sub(1);
    let Some(schedule_day) = tournament.schedule.get(index) else {
        bail!(
            "Day {} is not on the schedule of {} ({} days)",
            day,
            tournament.id,
            tournament.schedule.len()
        );
    };

    let label = schedule_day
        .name
        .clone()
        .unwrap_or_else(|| format!("Day {}", day));
    Ok((tournament.day_range(index), label))
}
