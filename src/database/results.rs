use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::{ResultRow, json_column};
use crate::domain::{RoundNumber, RoundResults, TournamentResults};

fn parse_result_row(row: &rusqlite::Row) -> rusqlite::Result<ResultRow> {
    Ok(ResultRow {
        round: row.get(0)?,
        team_id: row.get(1)?,
        result: json_column(row, 2)?,
        updated_at: row.get(3)?,
    })
}

pub fn list_rows(conn: &mut DbConn, tournament_id: &str) -> Result<Vec<ResultRow>> {
    let sql = "SELECT round, team_id, data, updated_at FROM results WHERE tournament_id = ?1 ORDER BY round, team_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to load results of {}", tournament_id))?;

    Ok(rows)
}

/// Every stored result of a tournament, grouped by round.
pub fn load_results(conn: &mut DbConn, tournament_id: &str) -> Result<TournamentResults> {
    let mut results = TournamentResults::new();
    for row in list_rows(conn, tournament_id)? {
        results.entry(row.round).or_default().insert(row.team_id, row.result);
    }
    Ok(results)
}

pub fn load_round(conn: &mut DbConn, tournament_id: &str, round: RoundNumber) -> Result<RoundResults> {
    let sql = "SELECT round, team_id, data, updated_at FROM results WHERE tournament_id = ?1 AND round = ?2";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id, round], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to load round {} of {}", round, tournament_id))?;

    Ok(rows.into_iter().map(|row| (row.team_id, row.result)).collect())
}

/// Writes the given team records of one round. Other teams' records in the
/// round are left untouched; a record for the same team is replaced.
pub fn save_results(
    conn: &mut DbConn,
    tournament_id: &str,
    round: RoundNumber,
    results: &RoundResults,
) -> Result<usize> {
    let tx = conn.transaction().context("Failed to begin results transaction")?;

    {
        let sql = "INSERT INTO results (tournament_id, round, team_id, data) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(tournament_id, round, team_id) DO UPDATE SET data = excluded.data, updated_at = CURRENT_TIMESTAMP";
        let mut stmt = tx.prepare(sql)?;

        for (team_id, result) in results {
            let data = serde_json::to_string(result).context("Failed to encode round result")?;
            stmt.execute(params![tournament_id, round, team_id, data])
                .with_context(|| format!("Failed to save result of team {}", team_id))?;
        }
    }

    tx.commit().context("Failed to commit results")?;
    Ok(results.len())
}
