use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

use crate::domain::{RoundNumber, RoundResult, TeamId};

/// Stored result of one team in one round
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub round: RoundNumber,
    pub team_id: TeamId,
    pub result: RoundResult,
    pub updated_at: Option<NaiveDateTime>,
}

/// Reads a TEXT column holding JSON.
pub(crate) fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
