use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::json_column;
use crate::domain::Team;

pub fn upsert_team(conn: &mut DbConn, team: &Team) -> Result<()> {
    let member_ids = serde_json::to_string(&team.member_ids).context("Failed to encode member ids")?;

    let sql = "INSERT INTO teams (id, tournament_id, name, tag, icon, owner_id, member_ids) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) ON CONFLICT(id) DO UPDATE SET tournament_id = excluded.tournament_id, name = excluded.name, tag = excluded.tag, icon = excluded.icon, owner_id = excluded.owner_id, member_ids = excluded.member_ids";

    conn.execute(
        sql,
        params![
            team.id,
            team.tournament_id,
            team.name,
            team.tag,
            team.icon,
            team.owner_id,
            member_ids
        ],
    )
    .with_context(|| format!("Failed to save team {}", team.id))?;
    Ok(())
}

fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        name: row.get(2)?,
        tag: row.get(3)?,
        icon: row.get(4)?,
        owner_id: row.get(5)?,
        member_ids: json_column(row, 6)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Team>> {
    let sql = "SELECT id, tournament_id, name, tag, icon, owner_id, member_ids FROM teams WHERE id = ?1";

    conn.query_row(sql, params![id], parse_team_row)
        .optional()
        .context("Failed to query team by id")
}

/// Teams of a tournament in registration order.
pub fn list_by_tournament(conn: &mut DbConn, tournament_id: &str) -> Result<Vec<Team>> {
    let sql = "SELECT id, tournament_id, name, tag, icon, owner_id, member_ids FROM teams WHERE tournament_id = ?1 ORDER BY rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_team_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list teams")?;

    Ok(rows)
}

pub fn count_by_tournament(conn: &mut DbConn, tournament_id: &str) -> Result<usize> {
    let sql = "SELECT COUNT(*) FROM teams WHERE tournament_id = ?1";

    let count: i64 = conn
        .query_row(sql, params![tournament_id], |row| row.get(0))
        .context("Failed to count teams")?;
    Ok(count as usize)
}
