use std::cmp::Ordering;
use std::collections::HashMap;

use super::ranking::olympic_ranks;
use crate::domain::{
    PlayerStandingsRow, Roster, RoundRange, ScoringRules, StandingsRow, Team, TournamentResults,
};

/// Team standings over the rounds in `range`.
///
/// Placement points are looked up from the current rules by stored rank, so
/// a rule change shows up in every past round. Ties on total points are
/// ordered by the rules' tiebreakers but keep a shared rank.
pub fn compute_standings(
    teams: &[Team],
    results: &TournamentResults,
    rules: &ScoringRules,
    range: RoundRange,
) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = teams
        .iter()
        .map(|team| accumulate_team(team, results, rules, range))
        .collect();

    rows.sort_by(|a, b| compare_rows(a, b, rules));

    let ranks = olympic_ranks(&rows, |row| row.total_points);
    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
    }

    rows
}

fn accumulate_team(
    team: &Team,
    results: &TournamentResults,
    rules: &ScoringRules,
    range: RoundRange,
) -> StandingsRow {
    let mut row = StandingsRow {
        team_id: team.id.clone(),
        team_name: team.name.clone(),
        tag: team.tag.clone(),
        total_points: 0,
        placement_points: 0,
        kill_points: 0,
        total_kills: 0,
        wins: 0,
        bonus_points: 0,
        penalty_points: 0,
        played_rounds: 0,
        rank: 0,
    };

    let played = results
        .iter()
        .filter(|(round, _)| range.contains(**round))
        .filter_map(|(_, round_results)| round_results.get(&team.id));

    for result in played {
        let placement = rules.placement_points(result.rank);
        let kills = result.effective_kills();

        let round_total = placement
            .saturating_add(rules.kill_points(kills))
            .saturating_add(result.bonus)
            .saturating_sub(result.penalty);

        row.placement_points = row.placement_points.saturating_add(placement);
        row.total_kills = row.total_kills.saturating_add(kills);
        row.bonus_points = row.bonus_points.saturating_add(result.bonus);
        row.penalty_points = row.penalty_points.saturating_add(result.penalty);
        row.total_points = row.total_points.saturating_add(round_total);
        row.played_rounds += 1;
        if result.rank == 1 {
            row.wins += 1;
        }
    }

    row.kill_points = rules.kill_points(row.total_kills);
    row
}

fn compare_rows(a: &StandingsRow, b: &StandingsRow, rules: &ScoringRules) -> Ordering {
    b.total_points.cmp(&a.total_points).then_with(|| {
        rules
            .tiebreakers
            .iter()
            .map(|&tiebreaker| b.tiebreak_value(tiebreaker).cmp(&a.tiebreak_value(tiebreaker)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Kill leaderboard for players with at least one kill in `range`.
///
/// Equal kill counts are ordered by the position of the player's team in
/// `standings`; that position never changes the shared rank.
pub fn compute_player_standings(
    roster: &Roster,
    results: &TournamentResults,
    range: RoundRange,
    standings: &[StandingsRow],
) -> Vec<PlayerStandingsRow> {
    let team_order: HashMap<&str, usize> = standings
        .iter()
        .enumerate()
        .map(|(index, row)| (row.team_id.as_str(), index))
        .collect();

    let mut rows: Vec<(usize, PlayerStandingsRow)> = Vec::new();

    for team in &roster.teams {
        for member_id in &team.member_ids {
            let total_kills: u32 = results
                .iter()
                .filter(|(round, _)| range.contains(**round))
                .filter_map(|(_, round_results)| round_results.get(&team.id))
                .filter_map(|result| result.member_kills.get(member_id).copied().flatten())
                .fold(0u32, u32::saturating_add);

            if total_kills == 0 {
                continue;
            }

            let order = team_order.get(team.id.as_str()).copied().unwrap_or(usize::MAX);
            rows.push((
                order,
                PlayerStandingsRow {
                    player_id: member_id.clone(),
                    name: roster.player_name(member_id),
                    team_id: team.id.clone(),
                    team_name: team.name.clone(),
                    total_kills,
                    rank: 0,
                },
            ));
        }
    }

    rows.sort_by(|(order_a, a), (order_b, b)| {
        b.total_kills.cmp(&a.total_kills).then(order_a.cmp(order_b))
    });

    let mut rows: Vec<PlayerStandingsRow> = rows.into_iter().map(|(_, row)| row).collect();
    let ranks = olympic_ranks(&rows, |row| row.total_kills);
    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Player, RoundResult, RoundResults, ScheduleDay, Tiebreaker, Tournament, TournamentRules,
    };
    use std::collections::BTreeMap;

    fn team(id: &str, members: &[&str]) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {id}"),
            tag: None,
            member_ids: members.iter().map(|m| m.to_string()).collect(),
            owner_id: None,
            tournament_id: "t".to_string(),
            icon: None,
        }
    }

    fn result(rank: u32, kills: &[(&str, u32)], bonus: i64) -> RoundResult {
        RoundResult {
            rank,
            member_kills: kills.iter().map(|(p, k)| (p.to_string(), Some(*k))).collect(),
            bonus,
            ..Default::default()
        }
    }

    fn round(entries: Vec<(&str, RoundResult)>) -> RoundResults {
        entries.into_iter().map(|(t, r)| (t.to_string(), r)).collect()
    }

    #[test]
    fn test_tied_totals_share_rank() {
        let teams = vec![team("a", &[]), team("b", &[]), team("c", &[])];
        let mut results = TournamentResults::new();
        // a: 15 + 35 = 50, b: 12 + 38 = 50, c: 10 + 20 = 30
        results.insert(
            1,
            round(vec![
                ("a", result(1, &[("x", 35)], 0)),
                ("b", result(2, &[("y", 38)], 0)),
                ("c", result(3, &[("z", 20)], 0)),
            ]),
        );

        let rows = compute_standings(&teams, &results, &ScoringRules::default(), RoundRange::All);
        let totals: Vec<_> = rows.iter().map(|r| r.total_points).collect();
        let ranks: Vec<_> = rows.iter().map(|r| r.rank).collect();

        assert_eq!(totals, vec![50, 50, 30]);
        assert_eq!(ranks, vec![1, 1, 3]);
        // placementPoints is the first tiebreaker.
        assert_eq!(rows[0].team_id, "a");
    }

    #[test]
    fn test_huge_kill_counts_saturate_across_rounds() {
        let teams = vec![team("a", &["p1"])];
        let results = TournamentResults::from([
            (1, round(vec![("a", result(1, &[("p1", u32::MAX)], i64::MAX))])),
            (2, round(vec![("a", result(1, &[("p1", 1)], 1))])),
        ]);

        let rows = compute_standings(&teams, &results, &ScoringRules::default(), RoundRange::All);
        assert_eq!(rows[0].total_kills, u32::MAX);
        assert_eq!(rows[0].total_points, i64::MAX);
        assert_eq!(rows[0].wins, 2);
    }

    #[test]
    fn test_default_kill_point() {
        let rules: ScoringRules = serde_json::from_value(serde_json::json!({})).unwrap();
        let teams = vec![team("a", &["p1"])];
        let results = TournamentResults::from([(1, round(vec![("a", result(1, &[("p1", 5)], 0))]))]);

        let rows = compute_standings(&teams, &results, &rules, RoundRange::All);
        assert_eq!(rows[0].total_points, 20);
        assert_eq!(rows[0].kill_points, 5);
        assert_eq!(rows[0].wins, 1);
        assert_eq!(rows[0].played_rounds, 1);
    }

    #[test]
    fn test_day_scope_excludes_other_days() {
        let tournament = Tournament {
            id: "t".to_string(),
            name: "Cup".to_string(),
            schedule: vec![
                ScheduleDay {
                    rounds: 2,
                    ..Default::default()
                },
                ScheduleDay {
                    rounds: 2,
                    ..Default::default()
                },
            ],
            rules: TournamentRules::default(),
        };
        let teams = vec![team("a", &[])];
        let results: TournamentResults = (1..=4)
            .map(|n| (n, round(vec![("a", result(1, &[], 0))])))
            .collect();

        let rows = compute_standings(&teams, &results, tournament.scoring(), tournament.day_range(1));
        assert_eq!(rows[0].played_rounds, 2);
        assert_eq!(rows[0].placement_points, 30);
    }

    #[test]
    fn test_tiebreakers_apply_in_order() {
        let mut rules = ScoringRules::default();
        rules.tiebreakers = vec![Tiebreaker::BonusPoints, Tiebreaker::PlacementPoints];
        rules.kill_point = 1;

        let teams = vec![team("a", &[]), team("b", &[])];
        // a: 15 placement, b: 12 placement + 3 bonus; both total 15.
        let results = TournamentResults::from([(
            1,
            round(vec![("a", result(1, &[], 0)), ("b", result(2, &[], 3))]),
        )]);

        let rows = compute_standings(&teams, &results, &rules, RoundRange::All);
        assert_eq!(rows[0].team_id, "b");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 1);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let teams = vec![team("b", &[]), team("a", &[])];
        let rows = compute_standings(&teams, &BTreeMap::new(), &ScoringRules::default(), RoundRange::All);
        let ids: Vec<_> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(rows.iter().all(|r| r.rank == 1 && r.played_rounds == 0));
    }

    #[test]
    fn test_player_leaderboard() {
        let roster = Roster::new(
            vec![team("a", &["p1", "p2"]), team("b", &["p3", "ghost"])],
            vec![
                Player { id: "p1".into(), name: "Ace".into(), tags: vec![] },
                Player { id: "p2".into(), name: "Bolt".into(), tags: vec![] },
                Player { id: "p3".into(), name: "Cole".into(), tags: vec![] },
            ],
        );
        let results = TournamentResults::from([
            (1, round(vec![("a", result(1, &[("p1", 3), ("p2", 0)], 0)), ("b", result(2, &[("p3", 1), ("ghost", 2)], 0))])),
            (2, round(vec![("b", result(1, &[("p3", 2)], 0))])),
        ]);

        let standings = compute_standings(&roster.teams, &results, &ScoringRules::default(), RoundRange::All);
        let players = compute_player_standings(&roster, &results, RoundRange::All, &standings);
        let summary: Vec<_> = players
            .iter()
            .map(|p| (p.player_id.as_str(), p.name.as_str(), p.total_kills, p.rank))
            .collect();

        // b leads the standings (12 + 3 + 15 + 2 = 32 vs 15 + 3 = 18), so
        // p3 sorts ahead of p1 on equal kills.
        assert_eq!(
            summary,
            vec![
                ("p3", "Cole", 3, 1),
                ("p1", "Ace", 3, 1),
                ("ghost", "Unknown", 2, 3),
            ]
        );
    }
}
