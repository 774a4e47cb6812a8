use anyhow::{Result, bail};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use super::roster::{TournamentContext, check_round, load_context};
use crate::cache::Cache;
use crate::database::{self, DbPool};
use crate::domain::{RoundNumber, RoundResults, TeamId};
use crate::ocr::ScanSession;
use crate::scoring::{RankAdjustment, ResultEntry, TeamEntry, Unresolved, aggregate, apply_manual_entries, merge_round};

/// Outcome of writing one round submission
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub round: RoundNumber,
    pub saved: Vec<TeamId>,
    pub unresolved: Vec<Unresolved>,
    /// Every stored record of the round after the write.
    pub results: RoundResults,
}

pub struct CommitService {
    pool: DbPool,
}

impl CommitService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Commits a reviewed scan session and drops it from the cache so the
    /// same screenshots cannot be added twice.
    pub fn commit_session(&self, cache: &Cache, tournament_id: &str, round: RoundNumber) -> Result<CommitReport> {
        info!("=== Committing Round {} of {} ===\n", round, tournament_id);

        let key = ScanSession::cache_key(tournament_id, round);
        let Some(session) = cache.load_parsed::<ScanSession>(&key)? else {
            bail!("No scan session for round {} of {}; run scan first", round, tournament_id);
        };

        let report = self.commit_entries(
            tournament_id,
            round,
            &session.batch_id(),
            &session.entries(),
            &session.adjustments,
        )?;
        cache.remove_parsed(&key)?;

        info!("=== Commit Complete ===");
        Ok(report)
    }

    /// Adds member lines to the stored round. Entries naming a team outside
    /// the tournament are treated as having no team; entries without a batch
    /// are assigned `batch`.
    pub fn commit_entries(
        &self,
        tournament_id: &str,
        round: RoundNumber,
        batch: &str,
        entries: &[ResultEntry],
        adjustments: &BTreeMap<u32, RankAdjustment>,
    ) -> Result<CommitReport> {
        let mut conn = database::get_connection(&self.pool)?;
        let TournamentContext { tournament, roster } = load_context(&mut conn, tournament_id)?;
        check_round(&tournament, round)?;

        let entries: Vec<ResultEntry> = entries
            .iter()
            .cloned()
            .map(|mut entry| {
                if entry.batch.is_none() {
                    entry.batch = Some(batch.to_string());
                }
                if let Some(team_id) = &entry.team_id {
                    if roster.team(team_id).is_none() {
                        warn!("Entry {} names unknown team {}", entry.id, team_id);
                        entry.team_id = None;
                    }
                }
                entry
            })
            .collect();

        let existing = database::results::load_round(&mut conn, tournament_id, round)?;
        let aggregation = aggregate(&existing, &entries, adjustments, tournament.scoring());
        info!(
            "  → {} entries: {} teams updated, {} unresolved",
            entries.len(),
            aggregation.updated.len(),
            aggregation.unresolved.len()
        );

        database::results::save_results(&mut conn, tournament_id, round, &aggregation.updated)?;
        info!("  → Saved {} team records\n", aggregation.updated.len());

        Ok(CommitReport {
            round,
            saved: aggregation.updated.keys().cloned().collect(),
            results: merge_round(&existing, &aggregation),
            unresolved: aggregation.unresolved,
        })
    }

    /// Replaces the records of every team with a rank filled in.
    pub fn save_manual(&self, tournament_id: &str, round: RoundNumber, entries: &[TeamEntry]) -> Result<CommitReport> {
        let mut conn = database::get_connection(&self.pool)?;
        let TournamentContext { tournament, roster } = load_context(&mut conn, tournament_id)?;
        check_round(&tournament, round)?;

        if let Some(entry) = entries.iter().find(|entry| roster.team(&entry.team_id).is_none()) {
            bail!("Team {} is not part of {}", entry.team_id, tournament_id);
        }

        let updated = apply_manual_entries(entries, tournament.scoring());
        database::results::save_results(&mut conn, tournament_id, round, &updated)?;
        info!(
            "  → Round {}: saved {} of {} teams",
            round,
            updated.len(),
            entries.len()
        );

        let results = database::results::load_round(&mut conn, tournament_id, round)?;
        Ok(CommitReport {
            round,
            saved: updated.into_keys().collect(),
            unresolved: Vec::new(),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, setup};
    use crate::scoring::UnresolvedReason;
    use crate::services::roster::{RosterImport, RosterService};
    use serde_json::json;
    use std::fs;

    fn seeded_pool() -> DbPool {
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
        pool
    }

    fn entry(id: &str, rank: u32, team: &str, member: &str, kills: u32) -> ResultEntry {
        ResultEntry {
            id: id.to_string(),
            rank: Some(rank),
            team_id: Some(team.to_string()),
            member_id: Some(member.to_string()),
            kills: Some(kills),
            is_duplicate: false,
            batch: None,
        }
    }

    #[test]
    fn test_commit_entries_adds_bonus_and_keeps_other_teams() {
        let service = CommitService::new(seeded_pool());
        let adjustments: BTreeMap<u32, RankAdjustment> = [(
            1,
            RankAdjustment {
                bonus: Some(5),
                penalty: None,
            },
        )]
        .into();

        service
            .commit_entries("t1", 1, "b1", &[entry("a", 2, "bravo", "p2", 1)], &BTreeMap::new())
            .unwrap();
        let report = service
            .commit_entries("t1", 1, "b1", &[entry("b", 1, "alpha", "p1", 3)], &adjustments)
            .unwrap();

        assert_eq!(report.saved, vec!["alpha".to_string()]);
        assert_eq!(report.results["alpha"].total_points, 15 + 3 + 5);
        assert_eq!(report.results["bravo"].rank, 2);

        // A second batch for the same team adds its bonus again.
        let report = service
            .commit_entries("t1", 1, "b1", &[entry("c", 1, "alpha", "p1", 3)], &adjustments)
            .unwrap();
        assert_eq!(report.results["alpha"].bonus, 10);
    }

    #[test]
    fn test_guest_kills_from_separate_scans_accumulate() {
        let dir = std::env::temp_dir().join(format!("squad-standings-batches-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let cache = Cache::new(&dir).unwrap();
        let service = CommitService::new(seeded_pool());
        let key = ScanSession::cache_key("t1", 1);

        for (kills, minutes) in [(3, 0), (1, 5)] {
            let mut item = crate::ocr::DetectionItem::manual("img1-LT-2".to_string(), Some(1));
            item.team_id = Some("alpha".to_string());
            item.kills = Some(kills);
            let mut session = ScanSession::new("t1", 1, vec![item], String::new());
            session.created_at = chrono::DateTime::from_timestamp(1_767_225_600 + minutes * 60, 0).unwrap();
            cache.save_parsed(&key, &session).unwrap();
            service.commit_session(&cache, "t1", 1).unwrap();
        }

        let mut conn = database::get_connection(&service.pool).unwrap();
        let round = database::results::load_round(&mut conn, "t1", 1).unwrap();
        assert_eq!(round["alpha"].member_kills.len(), 2);
        assert_eq!(round["alpha"].kills, 4);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_unknown_team_is_reported_unresolved() {
        let service = CommitService::new(seeded_pool());
        let report = service
            .commit_entries("t1", 1, "b1", &[entry("x", 1, "zulu", "p9", 2)], &BTreeMap::new())
            .unwrap();
        assert!(report.saved.is_empty());
        assert_eq!(report.unresolved[0].reason, UnresolvedReason::NoTeam);
    }

    #[test]
    fn test_manual_entry_replaces_record_and_skips_blank_rank() {
        let service = CommitService::new(seeded_pool());
        service
            .commit_entries("t1", 2, "b1", &[entry("a", 1, "alpha", "p1", 4)], &BTreeMap::new())
            .unwrap();

        let entries: Vec<TeamEntry> = serde_json::from_value(json!([
            {"teamId": "alpha", "rank": "", "memberKills": {"p1": 9}},
            {"teamId": "bravo", "rank": "3", "memberKills": {"p2": ""}, "bonus": "2"}
        ]))
        .unwrap();
        let report = service.save_manual("t1", 2, &entries).unwrap();

        assert_eq!(report.saved, vec!["bravo".to_string()]);
        assert_eq!(report.results["alpha"].kills, 4);
        assert_eq!(report.results["bravo"].total_points, 10 + 2);
        assert_eq!(report.results["bravo"].member_kills.get("p2"), Some(&None));
    }

    #[test]
    fn test_manual_entry_rejects_foreign_team() {
        let service = CommitService::new(seeded_pool());
        let entries = vec![TeamEntry {
            team_id: "zulu".to_string(),
            rank: Some(1),
            ..Default::default()
        }];
        assert!(service.save_manual("t1", 1, &entries).is_err());
        assert!(service.save_manual("t1", 3, &[]).is_err());
    }

    #[test]
    fn test_commit_session_consumes_cached_session() {
        let dir = std::env::temp_dir().join(format!("squad-standings-commit-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let cache = Cache::new(&dir).unwrap();
        let service = CommitService::new(seeded_pool());

        assert!(service.commit_session(&cache, "t1", 1).is_err());

        let mut item = crate::ocr::DetectionItem::manual("manual-1".to_string(), Some(2));
        item.team_id = Some("bravo".to_string());
        item.kills = Some(6);
        let session = ScanSession::new("t1", 1, vec![item], String::new());
        cache.save_parsed(&ScanSession::cache_key("t1", 1), &session).unwrap();

        let report = service.commit_session(&cache, "t1", 1).unwrap();
        assert_eq!(report.results["bravo"].kills, 6);
        assert_eq!(
            report.results["bravo"]
                .member_kills
                .get(&format!("guest:{}:manual-1", session.batch_id())),
            Some(&Some(6))
        );
        assert!(service.commit_session(&cache, "t1", 1).is_err());

        fs::remove_dir_all(dir).unwrap();
    }
}
