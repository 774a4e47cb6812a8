use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::detection::{self, DetectionItem};
use crate::domain::{Points, RoundNumber, Roster, TournamentId};
use crate::matching::{MatchOutcome, NameMatcher};
use crate::scoring::{self, RankAdjustment, ResultEntry};

/// Detections of one round, kept between scanning and committing so the
/// operator can correct them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    pub tournament_id: TournamentId,
    pub round: RoundNumber,
    pub items: Vec<DetectionItem>,
    #[serde(default)]
    pub adjustments: BTreeMap<u32, RankAdjustment>,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub next_manual: u32,
    pub created_at: DateTime<Utc>,
}

impl ScanSession {
    pub fn new(
        tournament_id: &str,
        round: RoundNumber,
        items: Vec<DetectionItem>,
        transcript: String,
    ) -> Self {
        Self {
            tournament_id: tournament_id.to_string(),
            round,
            items,
            adjustments: BTreeMap::new(),
            transcript,
            next_manual: 0,
            created_at: Utc::now(),
        }
    }

    /// Distinguishes this session's submission from earlier scans of the round.
    pub fn batch_id(&self) -> String {
        scoring::batch_id(self.created_at)
    }

    pub fn cache_key(tournament_id: &str, round: RoundNumber) -> String {
        format!("scan-{}-round{}", tournament_id, round)
    }

    pub fn item(&self, id: &str) -> Result<&DetectionItem> {
        match self.items.iter().find(|item| item.id == id) {
            Some(item) => Ok(item),
            None => bail!("No detection item with id {}", id),
        }
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut DetectionItem> {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => Ok(item),
            None => bail!("No detection item with id {}", id),
        }
    }

    // --- Operator Corrections ---

    pub fn edit_text(&mut self, id: &str, text: &str) -> Result<()> {
        self.item_mut(id)?.edited_text = text.trim().to_string();
        Ok(())
    }

    /// Runs the matcher again on the edited text.
    pub fn rematch(&mut self, id: &str, matcher: &NameMatcher, roster: &Roster) -> Result<()> {
        let candidates = roster.registered_players();
        let item = self.item_mut(id)?;

        item.matched = matcher.match_name(&item.edited_text, &candidates);
        item.team_id = detection::team_for(&item.matched, roster);
        item.cleaned_text = item.edited_text.clone();

        detection::mark_duplicates(&mut self.items);
        Ok(())
    }

    pub fn assign_player(&mut self, id: &str, player_id: &str, roster: &Roster) -> Result<()> {
        let Some(player) = roster.player(player_id) else {
            bail!("Player {} is not on the roster", player_id);
        };
        let Some(team) = roster.team_of(player_id) else {
            bail!("Player {} is not on any team", player_id);
        };

        let item = self.item_mut(id)?;
        item.matched = MatchOutcome::manual(player.clone());
        item.team_id = Some(team.id.clone());

        detection::mark_duplicates(&mut self.items);
        Ok(())
    }

    /// Credits the item to a team without naming a player (a guest).
    pub fn assign_team(&mut self, id: &str, team_id: &str, roster: &Roster) -> Result<()> {
        if roster.team(team_id).is_none() {
            bail!("Team {} is not in this tournament", team_id);
        }
        self.item_mut(id)?.team_id = Some(team_id.to_string());
        Ok(())
    }

    pub fn set_kills(&mut self, id: &str, kills: Option<u32>) -> Result<()> {
        self.item_mut(id)?.kills = kills;
        Ok(())
    }

    pub fn set_rank(&mut self, id: &str, rank: Option<u32>) -> Result<()> {
        self.item_mut(id)?.rank = rank.filter(|r| *r > 0);
        detection::mark_duplicates(&mut self.items);
        Ok(())
    }

    /// Inserts a blank manual item and returns its id.
    pub fn add_member(&mut self, rank: Option<u32>) -> String {
        self.next_manual += 1;
        let id = format!("manual-{}", self.next_manual);
        self.items.push(DetectionItem::manual(id.clone(), rank.filter(|r| *r > 0)));
        id
    }

    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            bail!("No detection item with id {}", id);
        }
        detection::mark_duplicates(&mut self.items);
        Ok(())
    }

    pub fn adjust(&mut self, rank: u32, bonus: Option<Points>, penalty: Option<Points>) {
        self.adjustments.insert(rank, RankAdjustment { bonus, penalty });
    }

    // --- Views ---

    pub fn ranked_groups(&self) -> BTreeMap<u32, Vec<&DetectionItem>> {
        let mut groups: BTreeMap<u32, Vec<&DetectionItem>> = BTreeMap::new();
        for item in &self.items {
            if let Some(rank) = item.rank {
                groups.entry(rank).or_default().push(item);
            }
        }
        groups
    }

    /// Items a commit would skip: no rank, no team, or a duplicate.
    pub fn unresolved(&self) -> Vec<&DetectionItem> {
        self.items
            .iter()
            .filter(|item| item.rank.is_none() || item.team_id.is_none() || item.is_duplicate)
            .collect()
    }

    pub fn entries(&self) -> Vec<ResultEntry> {
        self.items
            .iter()
            .map(|item| ResultEntry {
                id: item.id.clone(),
                rank: item.rank,
                team_id: item.team_id.clone(),
                member_id: item.player_id().cloned(),
                kills: item.kills,
                is_duplicate: item.is_duplicate,
                batch: Some(self.batch_id()),
            })
            .collect()
    }
}
