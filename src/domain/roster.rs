use std::collections::HashMap;

use super::models::{Player, Team};

/// Teams and players of one tournament, as read from the persistence layer
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    team_by_member: HashMap<String, usize>,
}

impl Roster {
    pub fn new(teams: Vec<Team>, players: Vec<Player>) -> Self {
        let mut team_by_member = HashMap::new();
        for (index, team) in teams.iter().enumerate() {
            for member in &team.member_ids {
                // First team listing a player owns them.
                team_by_member.entry(member.clone()).or_insert(index);
            }
        }

        Self {
            teams,
            players,
            team_by_member,
        }
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn team_of(&self, player_id: &str) -> Option<&Team> {
        self.team_by_member.get(player_id).map(|&index| &self.teams[index])
    }

    /// Display name, "Unknown" for ids no longer on the roster.
    pub fn player_name(&self, player_id: &str) -> String {
        self.player(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Players who belong to at least one team. These are the candidates the
    /// name matcher is run against.
    pub fn registered_players(&self) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| self.team_by_member.contains_key(&p.id))
            .cloned()
            .collect()
    }

    /// Case-insensitive search over team name, tag and member names.
    pub fn search_teams(&self, query: &str) -> Vec<&Team> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.teams.iter().collect();
        }

        self.teams
            .iter()
            .filter(|team| {
                team.name.to_lowercase().contains(&needle)
                    || team
                        .tag
                        .as_deref()
                        .is_some_and(|tag| tag.to_lowercase().contains(&needle))
                    || team.member_ids.iter().any(|id| {
                        self.player(id)
                            .is_some_and(|p| p.name.to_lowercase().contains(&needle))
                    })
            })
            .collect()
    }
}
