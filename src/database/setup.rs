use anyhow::{Context, Result};
use std::path::Path;

use super::connection::{self, DbConn, DbPool};

/// Opens the database file, creating it and its tables when missing.
pub fn open_database(path: &Path) -> Result<DbPool> {
    let pool = connection::create_pool(&path.to_string_lossy())?;
    let mut conn = connection::get_connection(&pool)?;
    ensure_schema(&mut conn)?;
    Ok(pool)
}

/// Creates any missing tables. Safe to run on every start.
pub fn ensure_schema(conn: &mut DbConn) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    let statements = split_sql_statements(schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::debug!("Database schema ready ({} statements)", statements.len());
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &mut DbConn, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::{create_memory_pool, get_connection};

    #[test]
    fn test_schema_is_idempotent() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();

        ensure_schema(&mut conn).unwrap();
        ensure_schema(&mut conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('tournaments', 'players', 'teams', 'results')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }
}
