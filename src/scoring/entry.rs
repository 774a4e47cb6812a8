use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::lenient;
use crate::domain::{PlayerId, Points, RoundResult, RoundResults, ScoringRules, TeamId};

/// Hand-entered result for one team, as typed into the round form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub team_id: TeamId,
    /// Empty means the operator left this team alone.
    #[serde(default, deserialize_with = "lenient::optional_count")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient::kill_map")]
    pub member_kills: BTreeMap<PlayerId, Option<u32>>,
    #[serde(default, deserialize_with = "lenient::points_or_zero")]
    pub bonus: Points,
    #[serde(default, deserialize_with = "lenient::points_or_zero")]
    pub penalty: Points,
}

/// Builds replacement records for every team whose rank was filled in.
/// Teams with an empty rank are absent from the output so their stored
/// record stays as it is.
pub fn apply_manual_entries(entries: &[TeamEntry], rules: &ScoringRules) -> RoundResults {
    entries
        .iter()
        .filter_map(|entry| {
            let rank = entry.rank?;
            let mut result = RoundResult {
                rank,
                member_kills: entry.member_kills.clone(),
                bonus: entry.bonus,
                penalty: entry.penalty,
                ..Default::default()
            };
            result.recompute(rules);
            Some((entry.team_id.clone(), result))
        })
        .collect()
}
