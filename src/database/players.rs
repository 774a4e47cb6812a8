use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::json_column;
use crate::domain::Player;

pub fn upsert_player(conn: &mut DbConn, player: &Player) -> Result<()> {
    let tags = serde_json::to_string(&player.tags).context("Failed to encode player tags")?;

    let sql = "INSERT INTO players (id, name, tags) VALUES (?1, ?2, ?3) ON CONFLICT(id) DO UPDATE SET name = excluded.name, tags = excluded.tags";

    conn.execute(sql, params![player.id, player.name, tags])
        .with_context(|| format!("Failed to save player {}", player.id))?;
    Ok(())
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        tags: json_column(row, 2)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Player>> {
    let sql = "SELECT id, name, tags FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Player>> {
    let sql = "SELECT id, name, tags FROM players ORDER BY rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
