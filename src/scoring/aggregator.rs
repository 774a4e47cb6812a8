use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::lenient;
use crate::domain::{PlayerId, Points, RoundResults, ScoringRules, TeamId};

/// Operator-entered bonus and penalty for everyone at one detected rank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankAdjustment {
    #[serde(default, deserialize_with = "lenient::optional_points")]
    pub bonus: Option<Points>,
    #[serde(default, deserialize_with = "lenient::optional_points")]
    pub penalty: Option<Points>,
}

/// One member's line of a round submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub id: String,
    /// Empty or unreadable ("?") means the rank is unresolved.
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub rank: Option<u32>,
    pub team_id: Option<TeamId>,
    /// `None` for a guest the roster does not know.
    pub member_id: Option<PlayerId>,
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub kills: Option<u32>,
    #[serde(default)]
    pub is_duplicate: bool,
    /// Submission the entry arrived in. Item ids restart with every scan, so
    /// guest keys need it to stay apart across batches.
    #[serde(default)]
    pub batch: Option<String>,
}

impl ResultEntry {
    fn member_key(&self) -> String {
        match (&self.member_id, &self.batch) {
            (Some(id), _) => id.clone(),
            (None, Some(batch)) => format!("guest:{}:{}", batch, self.id),
            (None, None) => format!("guest:{}", self.id),
        }
    }
}

/// Batch id for a submission made at `at`.
pub fn batch_id(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S%6f").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnresolvedReason {
    UnknownRank,
    NoTeam,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unresolved {
    pub entry_id: String,
    pub reason: UnresolvedReason,
}

/// Team records touched by a submission, plus the entries it could not place
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub updated: RoundResults,
    pub unresolved: Vec<Unresolved>,
}

struct TeamUpdate {
    rank: u32,
    bonus: Points,
    penalty: Points,
    member_kills: BTreeMap<PlayerId, Option<u32>>,
}

/// Merges a round submission into the stored records of that round.
///
/// The first entry seen for a team fixes its rank and picks up the bonus and
/// penalty entered for that rank. Member kills overwrite per member, bonus
/// and penalty add to what is already stored. Teams not named by any entry
/// are left out of the result entirely.
pub fn aggregate(
    existing: &RoundResults,
    entries: &[ResultEntry],
    adjustments: &BTreeMap<u32, RankAdjustment>,
    rules: &ScoringRules,
) -> Aggregation {
    let mut updates: BTreeMap<TeamId, TeamUpdate> = BTreeMap::new();
    let mut unresolved = Vec::new();

    for entry in entries {
        let reason = match (entry.rank, &entry.team_id) {
            _ if entry.is_duplicate => Some(UnresolvedReason::Duplicate),
            (None, _) | (Some(0), _) => Some(UnresolvedReason::UnknownRank),
            (_, None) => Some(UnresolvedReason::NoTeam),
            _ => None,
        };

        if let Some(reason) = reason {
            unresolved.push(Unresolved {
                entry_id: entry.id.clone(),
                reason,
            });
            continue;
        }

        let (Some(rank), Some(team_id)) = (entry.rank, entry.team_id.clone()) else {
            continue;
        };

        let update = updates.entry(team_id).or_insert_with(|| {
            let adjustment = adjustments.get(&rank).cloned().unwrap_or_default();
            TeamUpdate {
                rank,
                bonus: adjustment.bonus.unwrap_or(0),
                penalty: adjustment.penalty.unwrap_or(0),
                member_kills: BTreeMap::new(),
            }
        });
        update.member_kills.insert(entry.member_key(), entry.kills);
    }

    let updated = updates
        .into_iter()
        .map(|(team_id, update)| {
            let mut result = existing.get(&team_id).cloned().unwrap_or_default();
            result.member_kills.extend(update.member_kills);
            result.rank = update.rank;
            result.bonus = result.bonus.saturating_add(update.bonus);
            result.penalty = result.penalty.saturating_add(update.penalty);
            result.recompute(rules);
            (team_id, result)
        })
        .collect();

    Aggregation {
        updated,
        unresolved,
    }
}

/// `existing` with the aggregation's records laid over it.
pub fn merge_round(existing: &RoundResults, aggregation: &Aggregation) -> RoundResults {
    let mut merged = existing.clone();
    for (team_id, result) in &aggregation.updated {
        merged.insert(team_id.clone(), result.clone());
    }
    merged
}
