use anyhow::{Result, bail};
use log::info;

use super::roster::load_context;
use crate::cache::Cache;
use crate::config::settings::MatcherSettings;
use crate::database::{self, DbPool};
use crate::domain::{Points, RoundNumber};
use crate::matching::NameMatcher;
use crate::ocr::ScanSession;

/// One operator correction to a scan session
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewEdit {
    Text { id: String, text: String },
    Rematch { id: String },
    AssignPlayer { id: String, player_id: String },
    AssignTeam { id: String, team_id: String },
    Kills { id: String, kills: Option<u32> },
    Rank { id: String, rank: Option<u32> },
    Add { rank: Option<u32> },
    Remove { id: String },
    Adjust { rank: u32, bonus: Option<Points>, penalty: Option<Points> },
}

pub struct ReviewService {
    pool: DbPool,
    cache: Cache,
    matcher: NameMatcher,
}

impl ReviewService {
    pub fn new(pool: DbPool, cache: Cache, settings: MatcherSettings) -> Self {
        Self {
            pool,
            cache,
            matcher: NameMatcher::new(settings),
        }
    }

    pub fn load(&self, tournament_id: &str, round: RoundNumber) -> Result<ScanSession> {
        match self.cache.load_parsed(&ScanSession::cache_key(tournament_id, round))? {
            Some(session) => Ok(session),
            None => bail!("No scan session for round {} of {}", round, tournament_id),
        }
    }

    /// Applies the edit and stores the session again. A failing edit leaves
    /// the stored session unchanged.
    pub fn apply(&self, tournament_id: &str, round: RoundNumber, edit: ReviewEdit) -> Result<ScanSession> {
        let mut session = self.load(tournament_id, round)?;
        let roster = {
            let mut conn = database::get_connection(&self.pool)?;
            load_context(&mut conn, tournament_id)?.roster
        };

        match &edit {
            ReviewEdit::Text { id, text } => {
                session.edit_text(id, text)?;
                session.rematch(id, &self.matcher, &roster)?;
            }
            ReviewEdit::Rematch { id } => session.rematch(id, &self.matcher, &roster)?,
            ReviewEdit::AssignPlayer { id, player_id } => session.assign_player(id, player_id, &roster)?,
            ReviewEdit::AssignTeam { id, team_id } => session.assign_team(id, team_id, &roster)?,
            ReviewEdit::Kills { id, kills } => session.set_kills(id, *kills)?,
            ReviewEdit::Rank { id, rank } => session.set_rank(id, *rank)?,
            ReviewEdit::Add { rank } => {
                let id = session.add_member(*rank);
                info!("  → Added {}", id);
            }
            ReviewEdit::Remove { id } => session.remove(id)?,
            ReviewEdit::Adjust { rank, bonus, penalty } => session.adjust(*rank, *bonus, *penalty),
        }

        self.cache
            .save_parsed(&ScanSession::cache_key(tournament_id, round), &session)?;
        info!("  → {} items still need review", session.unresolved().len());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, setup};
    use crate::ocr::DetectionItem;
    use crate::services::roster::{RosterImport, RosterService};
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    fn service(name: &str) -> (ReviewService, PathBuf) {
        let pool = create_memory_pool().unwrap();
        {
            let mut conn = database::get_connection(&pool).unwrap();
            setup::ensure_schema(&mut conn).unwrap();
        }
        let import: RosterImport = serde_json::from_value(json!({
            "tournament": {"id": "t1", "name": "Cup", "schedule": [{"rounds": 2}]},
            "players": [{"id": "p1", "name": "CRX_Ace"}, {"id": "p2", "name": "Ghost"}],
            "teams": [
                {"id": "alpha", "tag": "A", "memberIds": ["p1"]},
                {"id": "bravo", "tag": "B", "memberIds": ["p2"]}
            ]
        }))
        .unwrap();
        RosterService::new(pool.clone()).import(import).unwrap();

        let dir = std::env::temp_dir().join(format!("squad-standings-review-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let cache = Cache::new(&dir).unwrap();

        let mut item = DetectionItem::manual("img1-LT-0".to_string(), Some(1));
        item.edited_text = "Ghst".to_string();
        let session = ScanSession::new("t1", 1, vec![item], String::new());
        cache.save_parsed(&ScanSession::cache_key("t1", 1), &session).unwrap();

        (ReviewService::new(pool, cache, MatcherSettings::default()), dir)
    }

    #[test]
    fn test_text_edit_rematches_and_persists() {
        let (service, dir) = service("text");

        let session = service
            .apply(
                "t1",
                1,
                ReviewEdit::Text {
                    id: "img1-LT-0".to_string(),
                    text: " Ghost ".to_string(),
                },
            )
            .unwrap();
        assert_eq!(session.items[0].team_id.as_deref(), Some("bravo"));

        let stored = service.load("t1", 1).unwrap();
        assert_eq!(stored.items[0].edited_text, "Ghost");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_failed_edit_keeps_stored_session() {
        let (service, dir) = service("failed");

        let result = service.apply(
            "t1",
            1,
            ReviewEdit::AssignPlayer {
                id: "img1-LT-0".to_string(),
                player_id: "p9".to_string(),
            },
        );
        assert!(result.is_err());
        assert!(service.load("t1", 1).unwrap().items[0].team_id.is_none());

        service.apply("t1", 1, ReviewEdit::Add { rank: Some(2) }).unwrap();
        service
            .apply(
                "t1",
                1,
                ReviewEdit::Adjust {
                    rank: 2,
                    bonus: Some(3),
                    penalty: None,
                },
            )
            .unwrap();
        let stored = service.load("t1", 1).unwrap();
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.adjustments[&2].bonus, Some(3));
        fs::remove_dir_all(dir).unwrap();
    }
}
