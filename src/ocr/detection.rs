use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::parser::ParsedLine;
use crate::config::layout::RegionLabel;
use crate::domain::{Player, PlayerId, Roster, TeamId};
use crate::matching::{MatchOutcome, NameMatcher};

/// One name read off a screenshot, carried through operator review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionItem {
    pub id: String,
    pub raw_text: String,
    pub cleaned_text: String,
    pub edited_text: String,
    /// `None` is the "unknown rank" marker; such items wait for the operator.
    pub rank: Option<u32>,
    pub kills: Option<u32>,
    pub matched: MatchOutcome,
    pub team_id: Option<TeamId>,
    pub source_image: usize,
    pub source_region: Option<RegionLabel>,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default)]
    pub is_manual: bool,
}

/// Matcher and roster shared by every line of a scan
pub struct LineResolver<'a> {
    matcher: &'a NameMatcher,
    roster: &'a Roster,
    players: Vec<Player>,
}

impl<'a> LineResolver<'a> {
    pub fn new(matcher: &'a NameMatcher, roster: &'a Roster) -> Self {
        Self {
            matcher,
            roster,
            players: roster.registered_players(),
        }
    }

    fn resolve(&self, name: &str) -> (MatchOutcome, Option<TeamId>) {
        let matched = self.matcher.match_name(name, &self.players);
        let team_id = team_for(&matched, self.roster);
        (matched, team_id)
    }
}

impl DetectionItem {
    pub fn from_line(
        line: &ParsedLine,
        rank: Option<u32>,
        source_image: usize,
        source_region: RegionLabel,
        line_index: usize,
        resolver: &LineResolver,
    ) -> Self {
        let (matched, team_id) = resolver.resolve(&line.name);

        Self {
            id: format!("img{}-{}-{}", source_image + 1, source_region.code(), line_index),
            raw_text: line.raw_text.clone(),
            cleaned_text: line.name.clone(),
            edited_text: line.name.clone(),
            rank,
            kills: line.kills,
            matched,
            team_id,
            source_image,
            source_region: Some(source_region),
            is_duplicate: false,
            is_manual: false,
        }
    }

    /// Blank entry the operator fills in by hand.
    pub fn manual(id: String, rank: Option<u32>) -> Self {
        Self {
            id,
            raw_text: String::new(),
            cleaned_text: String::new(),
            edited_text: String::new(),
            rank,
            kills: None,
            matched: MatchOutcome::unknown(""),
            team_id: None,
            source_image: 0,
            source_region: None,
            is_duplicate: false,
            is_manual: true,
        }
    }

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.matched.player().map(|p| &p.id)
    }

    fn text_key(&self) -> String {
        self.edited_text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    fn same_entry(&self, other: &DetectionItem) -> bool {
        let same_player = matches!((self.player_id(), other.player_id()), (Some(a), Some(b)) if a == b);
        same_player || self.text_key() == other.text_key()
    }
}

pub fn team_for(matched: &MatchOutcome, roster: &Roster) -> Option<TeamId> {
    matched
        .player()
        .and_then(|p| roster.team_of(&p.id))
        .map(|t| t.id.clone())
}

/// Groups items by detected rank, dropping repeats inside a rank group and
/// flagging players claimed by an earlier group. Items are expected in
/// image order; unranked items follow the ranked ones.
pub fn group_detections(items: Vec<DetectionItem>, capacity: usize) -> Vec<DetectionItem> {
    let mut groups: BTreeMap<u32, Vec<DetectionItem>> = BTreeMap::new();
    let mut unranked = Vec::new();

    for item in items {
        let Some(rank) = item.rank else {
            unranked.push(item);
            continue;
        };

        let group = groups.entry(rank).or_default();
        let repeated = group.iter().any(|kept| kept.same_entry(&item));
        if !repeated && group.len() < capacity {
            group.push(item);
        }
    }

    let mut grouped: Vec<DetectionItem> = groups.into_values().flatten().collect();
    grouped.extend(unranked);
    mark_duplicates(&mut grouped);
    grouped
}

/// Re-derives `is_duplicate`: walking ranks in ascending order, the first
/// item naming a player claims them and later ranked items naming the same
/// player are flagged.
pub fn mark_duplicates(items: &mut [DetectionItem]) {
    let mut order: Vec<usize> = (0..items.len()).filter(|&i| items[i].rank.is_some()).collect();
    order.sort_by_key(|&i| items[i].rank);

    for item in items.iter_mut() {
        item.is_duplicate = false;
    }

    let mut claimed: HashSet<PlayerId> = HashSet::new();
    for index in order {
        if let Some(player_id) = items[index].player_id().cloned() {
            if !claimed.insert(player_id) {
                items[index].is_duplicate = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Team;

    fn item(id: &str, rank: Option<u32>, text: &str, player: Option<&str>) -> DetectionItem {
        let mut item = DetectionItem::manual(id.to_string(), rank);
        item.is_manual = false;
        item.edited_text = text.to_string();
        item.matched = match player {
            Some(pid) => MatchOutcome::manual(Player {
                id: pid.to_string(),
                name: text.to_string(),
                tags: vec![],
            }),
            None => MatchOutcome::unknown(text),
        };
        item
    }

    fn ids(items: &[DetectionItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_lines_resolve_against_one_roster_snapshot() {
        let roster = Roster::new(
            vec![Team {
                id: "alpha".to_string(),
                name: "Alpha".to_string(),
                tag: None,
                member_ids: vec!["p1".to_string()],
                owner_id: None,
                tournament_id: "t1".to_string(),
                icon: None,
            }],
            vec![Player {
                id: "p1".to_string(),
                name: "Ghost".to_string(),
                tags: vec![],
            }],
        );
        let matcher = NameMatcher::new(crate::config::settings::MatcherSettings::default());
        let resolver = LineResolver::new(&matcher, &roster);

        let lines = [("Ghost", Some(4)), ("Stranger", None)];
        let items: Vec<DetectionItem> = lines
            .iter()
            .enumerate()
            .map(|(index, (name, kills))| {
                let line = ParsedLine {
                    raw_text: name.to_string(),
                    name: name.to_string(),
                    kills: *kills,
                };
                DetectionItem::from_line(&line, Some(1), 0, RegionLabel::LeftTop, index, &resolver)
            })
            .collect();

        assert_eq!(ids(&items), vec!["img1-LT-0", "img1-LT-1"]);
        assert_eq!(items[0].player_id().map(String::as_str), Some("p1"));
        assert_eq!(items[0].team_id.as_deref(), Some("alpha"));
        assert!(items[1].matched.is_unknown());
        assert_eq!(items[1].team_id, None);
    }

    #[test]
    fn test_groups_are_ordered_by_rank_with_unranked_last() {
        let grouped = group_detections(
            vec![
                item("a", Some(3), "Ghost", None),
                item("b", None, "Mystery", None),
                item("c", Some(1), "Ace", None),
            ],
            4,
        );
        assert_eq!(ids(&grouped), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_repeats_inside_a_group_are_dropped() {
        let grouped = group_detections(
            vec![
                item("a", Some(1), "CRX Ace", Some("p1")),
                item("b", Some(1), "crxace", None),
                item("c", Some(1), "Ace!!", Some("p1")),
                item("d", Some(1), "Bolt", Some("p2")),
            ],
            4,
        );
        assert_eq!(ids(&grouped), vec!["a", "d"]);
    }

    #[test]
    fn test_group_capacity() {
        let items = (0..6)
            .map(|n| item(&format!("i{n}"), Some(2), &format!("name{n}"), None))
            .collect();
        assert_eq!(group_detections(items, 4).len(), 4);
    }

    #[test]
    fn test_duplicate_flag_only_on_later_rank() {
        let grouped = group_detections(
            vec![
                item("late", Some(5), "Ace", Some("p1")),
                item("early", Some(2), "Ace", Some("p1")),
            ],
            4,
        );

        assert_eq!(ids(&grouped), vec!["early", "late"]);
        assert!(!grouped[0].is_duplicate);
        assert!(grouped[1].is_duplicate);
    }

    #[test]
    fn test_unknown_players_are_never_duplicates() {
        let grouped = group_detections(
            vec![item("a", Some(1), "???", None), item("b", Some(2), "???", None)],
            4,
        );
        assert!(grouped.iter().all(|i| !i.is_duplicate));
    }

    #[test]
    fn test_mark_duplicates_after_rank_change() {
        let mut items = vec![
            item("a", Some(1), "Ace", Some("p1")),
            item("b", Some(4), "Ace", Some("p1")),
        ];
        mark_duplicates(&mut items);
        assert!(items[1].is_duplicate);

        items[1].rank = None;
        mark_duplicates(&mut items);
        assert!(!items[1].is_duplicate);
    }
}
