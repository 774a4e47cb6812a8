use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::lenient;

pub type PlayerId = String;
pub type TeamId = String;
pub type TournamentId = String;
pub type RoundNumber = u32;
pub type Points = i64;

/// Round results of a single round, keyed by team.
pub type RoundResults = BTreeMap<TeamId, RoundResult>;
/// Every stored round of a tournament, keyed by global round number.
pub type TournamentResults = BTreeMap<RoundNumber, RoundResults>;

pub const DEFAULT_KILL_POINT: Points = 1;
pub const DEFAULT_RANK_POINTS: [Points; 20] = [15, 12, 10, 8, 6, 4, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
pub const DEFAULT_MAX_MEMBERS: usize = 5;
pub const DEFAULT_MAX_TEAMS: usize = 20;
/// Upper bound on the rounds a single schedule day may hold.
pub const MAX_ROUNDS_PER_DAY: u32 = 1000;

/// Registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Team entered into a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, alias = "member_ids")]
    pub member_ids: Vec<PlayerId>,
    #[serde(default, alias = "owner_id")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "tournament_id")]
    pub tournament_id: TournamentId,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Field compared when two teams finish level on total points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tiebreaker {
    PlacementPoints,
    Wins,
    KillPoints,
    BonusPoints,
    TotalKills,
    /// Name this build does not know; never separates two teams.
    Unrecognized,
}

impl Tiebreaker {
    pub fn as_str(&self) -> &str {
        match self {
            Tiebreaker::PlacementPoints => "placementPoints",
            Tiebreaker::Wins => "wins",
            Tiebreaker::KillPoints => "killPoints",
            Tiebreaker::BonusPoints => "bonusPoints",
            Tiebreaker::TotalKills => "totalKills",
            Tiebreaker::Unrecognized => "unrecognized",
        }
    }
}

impl From<String> for Tiebreaker {
    fn from(name: String) -> Self {
        match name.as_str() {
            "placementPoints" => Tiebreaker::PlacementPoints,
            "wins" => Tiebreaker::Wins,
            "killPoints" => Tiebreaker::KillPoints,
            "bonusPoints" => Tiebreaker::BonusPoints,
            "totalKills" => Tiebreaker::TotalKills,
            _ => Tiebreaker::Unrecognized,
        }
    }
}

impl From<Tiebreaker> for String {
    fn from(tiebreaker: Tiebreaker) -> Self {
        tiebreaker.as_str().to_string()
    }
}

pub fn default_tiebreakers() -> Vec<Tiebreaker> {
    vec![
        Tiebreaker::PlacementPoints,
        Tiebreaker::Wins,
        Tiebreaker::KillPoints,
        Tiebreaker::BonusPoints,
    ]
}

/// Per-tournament scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawScoringRules")]
pub struct ScoringRules {
    pub kill_point: Points,
    /// Indexed by `rank - 1`.
    pub rank_points: Vec<Points>,
    pub tiebreakers: Vec<Tiebreaker>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            kill_point: DEFAULT_KILL_POINT,
            rank_points: DEFAULT_RANK_POINTS.to_vec(),
            tiebreakers: default_tiebreakers(),
        }
    }
}

impl ScoringRules {
    /// Points for a finishing rank. Rank 0 (not played) and ranks past the
    /// end of the table are worth nothing.
    pub fn placement_points(&self, rank: u32) -> Points {
        if rank == 0 {
            return 0;
        }
        self.rank_points
            .get(rank as usize - 1)
            .copied()
            .unwrap_or(0)
    }

    pub fn kill_points(&self, kills: u32) -> Points {
        (kills as Points).saturating_mul(self.kill_point)
    }
}

// Shape accepted from storage and operator input. Older records carry
// `killPoints`, or a `placement` object instead of `rankPoints`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawScoringRules {
    #[serde(alias = "killPoints")]
    kill_point: Option<Value>,
    rank_points: Option<Value>,
    placement: Option<Value>,
    tiebreakers: Option<Value>,
}

impl From<RawScoringRules> for ScoringRules {
    fn from(raw: RawScoringRules) -> Self {
        let kill_point = raw
            .kill_point
            .as_ref()
            .and_then(lenient::to_i64)
            .unwrap_or(DEFAULT_KILL_POINT);

        let rank_points = points_list(raw.rank_points.as_ref())
            .or_else(|| points_list(raw.placement.as_ref()))
            .unwrap_or_else(|| DEFAULT_RANK_POINTS.to_vec());

        Self {
            kill_point,
            rank_points,
            tiebreakers: tiebreaker_list(raw.tiebreakers.as_ref()).unwrap_or_else(default_tiebreakers),
        }
    }
}

fn points_list(value: Option<&Value>) -> Option<Vec<Points>> {
    match value? {
        Value::Array(items) => Some(items.iter().map(|v| lenient::to_i64(v).unwrap_or(0)).collect()),
        Value::Object(map) => {
            // Rank keys in numeric order ("10" after "9"), anything else after them.
            let mut entries: Vec<(Option<u32>, &Value)> =
                map.iter().map(|(key, v)| (key.parse::<u32>().ok(), v)).collect();
            entries.sort_by_key(|(rank, _)| rank.unwrap_or(u32::MAX));
            Some(entries.into_iter().map(|(_, v)| lenient::to_i64(v).unwrap_or(0)).collect())
        }
        _ => None,
    }
}

fn tiebreaker_list(value: Option<&Value>) -> Option<Vec<Tiebreaker>> {
    match value? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|name| Tiebreaker::from(name.to_string()))
                .collect(),
        ),
        _ => None,
    }
}

/// Tournament-level rules packed alongside the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTournamentRules")]
pub struct TournamentRules {
    pub scoring_rules: ScoringRules,
    pub max_members: usize,
    pub max_teams: usize,
    pub tag_required: bool,
}

impl Default for TournamentRules {
    fn default() -> Self {
        Self {
            scoring_rules: ScoringRules::default(),
            max_members: DEFAULT_MAX_MEMBERS,
            max_teams: DEFAULT_MAX_TEAMS,
            tag_required: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTournamentRules {
    scoring_rules: Option<ScoringRules>,
    tiebreakers: Option<Value>,
    max_members: Option<Value>,
    max_teams: Option<Value>,
    tag_required: Option<bool>,
}

impl From<RawTournamentRules> for TournamentRules {
    fn from(raw: RawTournamentRules) -> Self {
        let mut scoring_rules = raw.scoring_rules.unwrap_or_default();
        // Tiebreakers historically lived next to the scoring rules, not inside them.
        if let Some(tiebreakers) = tiebreaker_list(raw.tiebreakers.as_ref()) {
            scoring_rules.tiebreakers = tiebreakers;
        }

        let positive = |value: Option<&Value>, fallback: usize| {
            value
                .and_then(lenient::to_count)
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(fallback)
        };

        Self {
            scoring_rules,
            max_members: positive(raw.max_members.as_ref(), DEFAULT_MAX_MEMBERS),
            max_teams: positive(raw.max_teams.as_ref(), DEFAULT_MAX_TEAMS),
            tag_required: raw.tag_required.unwrap_or(true),
        }
    }
}

/// One day of the tournament schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::rounds_per_day")]
    pub rounds: u32,
}

/// Tournament definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleDay>,
    #[serde(default)]
    pub rules: TournamentRules,
}

impl Tournament {
    pub fn scoring(&self) -> &ScoringRules {
        &self.rules.scoring_rules
    }
}

/// One team's record for one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRoundResult")]
pub struct RoundResult {
    /// Finishing rank; 0 means not yet played.
    pub rank: u32,
    /// `None` marks a kill count that was never entered.
    pub member_kills: BTreeMap<PlayerId, Option<u32>>,
    pub bonus: Points,
    pub penalty: Points,
    pub kills: u32,
    pub placement_points: Points,
    pub kill_points: Points,
    pub total_points: Points,
}

impl RoundResult {
    pub fn member_kill_total(&self) -> u32 {
        self.member_kills
            .values()
            .fold(0u32, |total, k| total.saturating_add(k.unwrap_or(0)))
    }

    /// Kill total, preferring the per-member breakdown when one exists.
    pub fn effective_kills(&self) -> u32 {
        if self.member_kills.is_empty() {
            self.kills
        } else {
            self.member_kill_total()
        }
    }

    /// Refreshes every derived field from rank, kills, bonus and penalty.
    pub fn recompute(&mut self, rules: &ScoringRules) {
        self.kills = self.effective_kills();
        self.placement_points = rules.placement_points(self.rank);
        self.kill_points = rules.kill_points(self.kills);
        self.total_points = self
            .kill_points
            .saturating_add(self.placement_points)
            .saturating_add(self.bonus)
            .saturating_sub(self.penalty);
    }
}

// Rows written by older clients use `bonusPoints`/`penaltyPoints`, sometimes
// alongside the plain names, and may hold strings where numbers belong.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRoundResult {
    rank: Option<Value>,
    member_kills: Option<Value>,
    bonus: Option<Value>,
    bonus_points: Option<Value>,
    penalty: Option<Value>,
    penalty_points: Option<Value>,
    kills: Option<Value>,
    placement_points: Option<Value>,
    kill_points: Option<Value>,
    total_points: Option<Value>,
}

impl From<RawRoundResult> for RoundResult {
    fn from(raw: RawRoundResult) -> Self {
        let points = |primary: &Option<Value>, legacy: &Option<Value>| {
            primary
                .as_ref()
                .and_then(lenient::to_i64)
                .or_else(|| legacy.as_ref().and_then(lenient::to_i64))
                .unwrap_or(0)
        };

        Self {
            rank: raw.rank.as_ref().and_then(lenient::to_count).unwrap_or(0),
            member_kills: raw
                .member_kills
                .as_ref()
                .map(lenient::kill_map_from_value)
                .unwrap_or_default(),
            bonus: points(&raw.bonus, &raw.bonus_points),
            penalty: points(&raw.penalty, &raw.penalty_points),
            kills: raw.kills.as_ref().and_then(lenient::to_count).unwrap_or(0),
            placement_points: points(&raw.placement_points, &None),
            kill_points: points(&raw.kill_points, &None),
            total_points: points(&raw.total_points, &None),
        }
    }
}

/// Derived team row of the standings table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub tag: Option<String>,
    pub total_points: Points,
    pub placement_points: Points,
    pub kill_points: Points,
    pub total_kills: u32,
    pub wins: u32,
    pub bonus_points: Points,
    pub penalty_points: Points,
    pub played_rounds: u32,
    pub rank: usize,
}

impl StandingsRow {
    pub fn tiebreak_value(&self, tiebreaker: Tiebreaker) -> Points {
        match tiebreaker {
            Tiebreaker::PlacementPoints => self.placement_points,
            Tiebreaker::Wins => self.wins as Points,
            Tiebreaker::KillPoints => self.kill_points,
            Tiebreaker::BonusPoints => self.bonus_points,
            Tiebreaker::TotalKills => self.total_kills as Points,
            Tiebreaker::Unrecognized => 0,
        }
    }
}

/// Derived row of the per-player kill leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStandingsRow {
    pub player_id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub total_kills: u32,
    pub rank: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_scoring_fields_fall_back_to_defaults() {
        let rules: ScoringRules = serde_json::from_value(json!({})).unwrap();
        assert_eq!(rules, ScoringRules::default());

        let rules: ScoringRules = serde_json::from_value(json!({"killPoint": null})).unwrap();
        assert_eq!(rules.kill_point, 1);
    }

    #[test]
    fn test_legacy_scoring_field_names() {
        let rules: ScoringRules =
            serde_json::from_value(json!({"killPoints": 2, "placement": {"1": 20, "2": 14}})).unwrap();
        assert_eq!(rules.kill_point, 2);
        assert_eq!(rules.rank_points, vec![20, 14]);
    }

    #[test]
    fn test_placement_object_keeps_numeric_rank_order() {
        let rules: ScoringRules = serde_json::from_value(json!({"placement": {
            "1": 20, "2": 14, "3": 12, "4": 10, "5": 8,
            "6": 6, "7": 4, "8": 3, "9": 2, "10": 1
        }}))
        .unwrap();

        assert_eq!(rules.rank_points, vec![20, 14, 12, 10, 8, 6, 4, 3, 2, 1]);
        assert_eq!(rules.placement_points(2), 14);
        assert_eq!(rules.placement_points(10), 1);
    }

    #[test]
    fn test_placement_points_lookup() {
        let rules = ScoringRules::default();
        assert_eq!(rules.placement_points(1), 15);
        assert_eq!(rules.placement_points(8), 1);
        assert_eq!(rules.placement_points(0), 0);
        assert_eq!(rules.placement_points(21), 0);
    }

    #[test]
    fn test_unknown_tiebreaker_is_tolerated() {
        let rules: TournamentRules =
            serde_json::from_value(json!({"tiebreakers": ["wins", "headToHead"]})).unwrap();
        assert_eq!(
            rules.scoring_rules.tiebreakers,
            vec![Tiebreaker::Wins, Tiebreaker::Unrecognized]
        );
        assert_eq!(rules.max_members, DEFAULT_MAX_MEMBERS);
        assert!(rules.tag_required);
    }

    #[test]
    fn test_round_result_reads_legacy_shapes() {
        let result: RoundResult = serde_json::from_value(json!({
            "rank": "2",
            "memberKills": {"p1": 3, "p2": ""},
            "bonusPoints": 4,
            "penaltyPoints": "1"
        }))
        .unwrap();

        assert_eq!(result.rank, 2);
        assert_eq!(result.bonus, 4);
        assert_eq!(result.penalty, 1);
        assert_eq!(result.member_kills.get("p2"), Some(&None));
        assert_eq!(result.effective_kills(), 3);
    }

    #[test]
    fn test_round_result_prefers_plain_bonus_when_both_present() {
        let result: RoundResult =
            serde_json::from_value(json!({"bonus": 3, "bonusPoints": 9})).unwrap();
        assert_eq!(result.bonus, 3);
    }

    #[test]
    fn test_recompute_uses_default_kill_point() {
        let mut result = RoundResult {
            rank: 1,
            kills: 5,
            ..Default::default()
        };
        result.recompute(&ScoringRules::default());
        assert_eq!(result.placement_points, 15);
        assert_eq!(result.kill_points, 5);
        assert_eq!(result.total_points, 20);
    }

    #[test]
    fn test_recompute_saturates_on_huge_values() {
        let mut result = RoundResult {
            rank: 1,
            member_kills: [("p1".to_string(), Some(u32::MAX)), ("p2".to_string(), Some(1))].into(),
            bonus: Points::MAX,
            penalty: 0,
            ..Default::default()
        };
        result.recompute(&ScoringRules::default());

        assert_eq!(result.kills, u32::MAX);
        assert_eq!(result.total_points, Points::MAX);
    }

    #[test]
    fn test_schedule_rounds_accept_strings() {
        let day: ScheduleDay = serde_json::from_value(json!({"name": "Day 1", "rounds": "3"})).unwrap();
        assert_eq!(day.rounds, 3);
        let day: ScheduleDay = serde_json::from_value(json!({"rounds": "many"})).unwrap();
        assert_eq!(day.rounds, 0);
    }

    #[test]
    fn test_schedule_rounds_are_capped() {
        let day: ScheduleDay = serde_json::from_value(json!({"rounds": 4294967295u64})).unwrap();
        assert_eq!(day.rounds, MAX_ROUNDS_PER_DAY);

        let tournament: Tournament = serde_json::from_value(json!({
            "id": "t1",
            "schedule": [{"rounds": "99999999999"}, {"rounds": 4294967295u64}, {"rounds": 2}]
        }))
        .unwrap();
        assert_eq!(tournament.total_rounds(), 2 * MAX_ROUNDS_PER_DAY + 2);
        assert_eq!(tournament.rounds().len(), 2 * MAX_ROUNDS_PER_DAY as usize + 2);
    }
}
