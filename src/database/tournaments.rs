use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::json_column;
use crate::domain::Tournament;

pub fn upsert_tournament(conn: &mut DbConn, tournament: &Tournament) -> Result<()> {
    let schedule = serde_json::to_string(&tournament.schedule).context("Failed to encode schedule")?;
    let rules = serde_json::to_string(&tournament.rules).context("Failed to encode rules")?;

    let sql = "INSERT INTO tournaments (id, name, schedule, rules) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(id) DO UPDATE SET name = excluded.name, schedule = excluded.schedule, rules = excluded.rules";

    conn.execute(sql, params![tournament.id, tournament.name, schedule, rules])
        .with_context(|| format!("Failed to save tournament {}", tournament.id))?;
    Ok(())
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        schedule: json_column(row, 2)?,
        rules: json_column(row, 3)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Tournament>> {
    let sql = "SELECT id, name, schedule, rules FROM tournaments WHERE id = ?1";

    conn.query_row(sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Tournament>> {
    let sql = "SELECT id, name, schedule, rules FROM tournaments ORDER BY created_at DESC, id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup};
    use crate::domain::{ScheduleDay, TournamentRules};

    #[test]
    fn test_tournament_round_trips_rules() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::ensure_schema(&mut conn).unwrap();

        let mut rules = TournamentRules::default();
        rules.scoring_rules.kill_point = 2;
        let tournament = Tournament {
            id: "cup".to_string(),
            name: "Spring Cup".to_string(),
            schedule: vec![ScheduleDay {
                name: Some("Day 1".to_string()),
                date: None,
                rounds: 3,
            }],
            rules,
        };

        upsert_tournament(&mut conn, &tournament).unwrap();
        upsert_tournament(&mut conn, &tournament).unwrap();

        let loaded = find_by_id(&mut conn, "cup").unwrap().unwrap();
        assert_eq!(loaded, tournament);
        assert_eq!(list_all(&mut conn).unwrap().len(), 1);
        assert!(find_by_id(&mut conn, "missing").unwrap().is_none());
    }
}
