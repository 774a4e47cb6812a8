use serde::Serialize;

use super::models::{RoundNumber, Tournament};

/// A single round placed on the tournament calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRound {
    /// Global 1-based round number across all days.
    pub number: RoundNumber,
    pub day_index: usize,
    /// 1-based position inside its day.
    pub round_in_day: u32,
    pub label: String,
    pub date: Option<String>,
}

/// Rounds included in a standings computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundRange {
    All,
    /// Inclusive span of global round numbers. `first > last` is empty.
    Span { first: RoundNumber, last: RoundNumber },
}

impl RoundRange {
    pub fn contains(&self, round: RoundNumber) -> bool {
        match *self {
            RoundRange::All => true,
            RoundRange::Span { first, last } => first <= round && round <= last,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(*self, RoundRange::Span { first, last } if first > last)
    }

    fn empty() -> Self {
        RoundRange::Span { first: 1, last: 0 }
    }
}

impl Tournament {
    pub fn rounds(&self) -> Vec<ScheduledRound> {
        let mut rounds = Vec::new();
        let mut number: RoundNumber = 0;

        for (day_index, day) in self.schedule.iter().enumerate() {
            let day_name = match day.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => format!("Day {}", day_index + 1),
            };

            for round_in_day in 1..=day.rounds {
                number = number.saturating_add(1);
                rounds.push(ScheduledRound {
                    number,
                    day_index,
                    round_in_day,
                    label: format!("{} - Round {}", day_name, round_in_day),
                    date: day.date.clone(),
                });
            }
        }

        rounds
    }

    pub fn total_rounds(&self) -> u32 {
        self.schedule
            .iter()
            .fold(0u32, |total, day| total.saturating_add(day.rounds))
    }

    /// Global round span of one schedule day.
    pub fn day_range(&self, day_index: usize) -> RoundRange {
        let Some(day) = self.schedule.get(day_index) else {
            return RoundRange::empty();
        };

        let prior = self.schedule[..day_index]
            .iter()
            .fold(0u32, |total, d| total.saturating_add(d.rounds));
        RoundRange::Span {
            first: prior.saturating_add(1),
            last: prior.saturating_add(day.rounds),
        }
    }

    pub fn round_range(&self, day: Option<usize>) -> RoundRange {
        match day {
            Some(day_index) => self.day_range(day_index),
            None => RoundRange::All,
        }
    }

    pub fn find_round(&self, number: RoundNumber) -> Option<ScheduledRound> {
        self.rounds().into_iter().find(|round| round.number == number)
    }
}

pub fn round_key(round: RoundNumber) -> String {
    format!("round{}", round)
}

pub fn parse_round_key(key: &str) -> Option<RoundNumber> {
    key.strip_prefix("round")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ScheduleDay, TournamentRules};

    fn tournament(days: &[(Option<&str>, u32)]) -> Tournament {
        Tournament {
            id: "t1".to_string(),
            name: "Cup".to_string(),
            schedule: days
                .iter()
                .map(|(name, rounds)| ScheduleDay {
                    name: name.map(String::from),
                    date: None,
                    rounds: *rounds,
                })
                .collect(),
            rules: TournamentRules::default(),
        }
    }

    #[test]
    fn test_rounds_are_numbered_globally() {
        let t = tournament(&[(Some("Qualifiers"), 2), (None, 3)]);
        let rounds = t.rounds();

        assert_eq!(rounds.len(), 5);
        assert_eq!(t.total_rounds(), 5);
        assert_eq!(rounds[0].label, "Qualifiers - Round 1");
        assert_eq!(rounds[2].number, 3);
        assert_eq!(rounds[2].label, "Day 2 - Round 1");
        assert_eq!(rounds[4].round_in_day, 3);
    }

    #[test]
    fn test_day_range_skips_prior_days() {
        let t = tournament(&[(None, 2), (None, 2)]);
        let range = t.day_range(1);

        assert_eq!(range, RoundRange::Span { first: 3, last: 4 });
        assert!(!range.contains(2));
        assert!(range.contains(3));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_out_of_range_day_is_empty() {
        let t = tournament(&[(None, 2)]);
        assert!(t.day_range(4).is_empty());
        assert!(!t.day_range(4).contains(1));
    }

    #[test]
    fn test_day_without_rounds_is_empty() {
        let t = tournament(&[(None, 2), (None, 0)]);
        assert!(t.day_range(1).is_empty());
    }

    #[test]
    fn test_round_keys() {
        assert_eq!(round_key(7), "round7");
        assert_eq!(parse_round_key("round12"), Some(12));
        assert_eq!(parse_round_key("r12"), None);
    }
}
