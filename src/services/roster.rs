use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::database::{self, DbConn, DbPool};
use crate::domain::{Player, Roster, RoundNumber, Team, Tournament};

/// Roster file as exported by the registration form
#[derive(Debug, Clone, Deserialize)]
pub struct RosterImport {
    pub tournament: Tournament,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub teams: usize,
    pub players: usize,
}

/// A tournament together with the roster its results refer to
#[derive(Debug, Clone)]
pub struct TournamentContext {
    pub tournament: Tournament,
    pub roster: Roster,
}

pub fn load_context(conn: &mut DbConn, tournament_id: &str) -> Result<TournamentContext> {
    let tournament = match database::tournaments::find_by_id(conn, tournament_id)? {
        Some(tournament) => tournament,
        None => bail!("Unknown tournament {}", tournament_id),
    };

    let teams = database::teams::list_by_tournament(conn, tournament_id)?;
    let players = database::players::list_all(conn)?;

    Ok(TournamentContext {
        tournament,
        roster: Roster::new(teams, players),
    })
}

/// Rejects round numbers outside the schedule. A tournament without a
/// schedule accepts any positive round.
pub fn check_round(tournament: &Tournament, round: RoundNumber) -> Result<()> {
    let total = tournament.total_rounds();
    if round == 0 || (total > 0 && round > total) {
        bail!("Round {} is not on the schedule of {} ({} rounds)", round, tournament.id, total);
    }
    Ok(())
}

pub struct RosterService {
    pool: DbPool,
}

impl RosterService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn run(&self, path: &Path) -> Result<ImportSummary> {
        info!("=== Importing Roster ===");
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file {}", path.display()))?;
        let import: RosterImport = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse roster file {}", path.display()))?;

        let summary = self.import(import)?;
        info!("=== Import Complete ===");
        Ok(summary)
    }

    /// Validates the whole roster against the tournament rules, then writes it.
    /// Nothing is written when any team breaks a rule.
    pub fn import(&self, mut import: RosterImport) -> Result<ImportSummary> {
        let mut conn = database::get_connection(&self.pool)?;
        let tournament_id = import.tournament.id.clone();

        for team in &mut import.teams {
            if team.tournament_id.is_empty() {
                team.tournament_id = tournament_id.clone();
            }
            team.tag = team
                .tag
                .as_deref()
                .map(|tag| tag.trim().to_uppercase())
                .filter(|tag| !tag.is_empty());
        }

        self.validate(&mut conn, &import)?;

        database::tournaments::upsert_tournament(&mut conn, &import.tournament)?;
        info!("  → Saved tournament {} ({})", import.tournament.name, tournament_id);

        for player in &import.players {
            database::players::upsert_player(&mut conn, player)?;
        }
        info!("  → Saved {} players", import.players.len());

        for team in &import.teams {
            database::teams::upsert_team(&mut conn, team)?;
        }
        info!("  → Saved {} teams", import.teams.len());

        Ok(ImportSummary {
            teams: import.teams.len(),
            players: import.players.len(),
        })
    }

    fn validate(&self, conn: &mut DbConn, import: &RosterImport) -> Result<()> {
        let rules = &import.tournament.rules;
        let tournament_id = &import.tournament.id;

        let mut known_players: HashSet<String> = database::players::list_all(conn)?
            .into_iter()
            .map(|p| p.id)
            .collect();
        known_players.extend(import.players.iter().map(|p| p.id.clone()));

        for team in &import.teams {
            if &team.tournament_id != tournament_id {
                bail!(
                    "Team {} belongs to tournament {}, not {}",
                    team.id,
                    team.tournament_id,
                    tournament_id
                );
            }
            if team.member_ids.len() > rules.max_members {
                bail!(
                    "Team {} has {} members; at most {} allowed",
                    team.id,
                    team.member_ids.len(),
                    rules.max_members
                );
            }
            if rules.tag_required && team.tag.is_none() {
                bail!("Team {} needs a tag", team.id);
            }
            for member in team.member_ids.iter().filter(|m| !known_players.contains(*m)) {
                warn!("Team {} lists unknown player {}", team.id, member);
            }
        }

        let imported: HashSet<&str> = import.teams.iter().map(|t| t.id.as_str()).collect();
        let kept = database::teams::list_by_tournament(conn, tournament_id)?
            .into_iter()
            .filter(|t| !imported.contains(t.id.as_str()))
            .count();

        if kept + imported.len() > rules.max_teams {
            bail!(
                "Tournament {} allows {} teams; the import would make {}",
                tournament_id,
                rules.max_teams,
                kept + imported.len()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, setup};
    use serde_json::json;

    fn service() -> RosterService {
        let pool = create_memory_pool().unwrap();
        let mut conn = database::get_connection(&pool).unwrap();
        setup::ensure_schema(&mut conn).unwrap();
        drop(conn);
        RosterService::new(pool)
    }

    fn roster_json(teams: serde_json::Value) -> RosterImport {
        serde_json::from_value(json!({
            "tournament": {
                "id": "t1",
                "name": "Spring Cup",
                "schedule": [{"name": "Day 1", "rounds": 3}],
                "rules": {"maxMembers": 2, "maxTeams": 2}
            },
            "players": [
                {"id": "p1", "name": "CRX_Ace"},
                {"id": "p2", "name": "Ghost"},
                {"id": "p3", "name": "Nova"}
            ],
            "teams": teams
        }))
        .unwrap()
    }

    #[test]
    fn test_import_uppercases_tags_and_fills_tournament() {
        let service = service();
        let summary = service
            .import(roster_json(json!([
                {"id": "alpha", "name": "Alpha", "tag": " crx ", "memberIds": ["p1", "p2"]}
            ])))
            .unwrap();
        assert_eq!(summary, ImportSummary { teams: 1, players: 3 });

        let mut conn = database::get_connection(&service.pool).unwrap();
        let context = load_context(&mut conn, "t1").unwrap();
        let team = &context.roster.teams[0];
        assert_eq!(team.tag.as_deref(), Some("CRX"));
        assert_eq!(team.tournament_id, "t1");
        assert_eq!(context.tournament.total_rounds(), 3);
        assert_eq!(context.roster.team_of("p2").map(|t| t.id.as_str()), Some("alpha"));
    }

    #[test]
    fn test_import_rejects_oversized_team() {
        let service = service();
        let err = service
            .import(roster_json(json!([
                {"id": "alpha", "name": "Alpha", "tag": "A", "memberIds": ["p1", "p2", "p3"]}
            ])))
            .unwrap_err();
        assert!(err.to_string().contains("at most 2"));

        let mut conn = database::get_connection(&service.pool).unwrap();
        assert!(database::tournaments::find_by_id(&mut conn, "t1").unwrap().is_none());
    }

    #[test]
    fn test_import_requires_tag() {
        let service = service();
        let err = service
            .import(roster_json(json!([{"id": "alpha", "name": "Alpha", "tag": "  "}])))
            .unwrap_err();
        assert!(err.to_string().contains("needs a tag"));
    }

    #[test]
    fn test_import_counts_existing_teams_against_limit() {
        let service = service();
        service
            .import(roster_json(json!([
                {"id": "alpha", "tag": "A"},
                {"id": "bravo", "tag": "B"}
            ])))
            .unwrap();

        // Re-importing the same teams is fine; a third one is not.
        service
            .import(roster_json(json!([{"id": "alpha", "tag": "A"}])))
            .unwrap();
        let err = service
            .import(roster_json(json!([{"id": "charlie", "tag": "C"}])))
            .unwrap_err();
        assert!(err.to_string().contains("allows 2 teams"));
    }

    #[test]
    fn test_unknown_tournament_is_an_error() {
        let service = service();
        let mut conn = database::get_connection(&service.pool).unwrap();
        assert!(load_context(&mut conn, "missing").is_err());
    }
}
