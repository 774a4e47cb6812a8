use serde::{Deserialize, Serialize};

use super::tables::{self, KANA_FOLDS, NOISE_SYMBOLS, OCR_MISREADS, TAG_MISREADS};
use crate::config::settings::MatcherSettings;
use crate::domain::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Normalized,
    Contain,
    Fuzzy,
    /// Chosen by the operator, not by the matcher.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MatchOutcome {
    Matched {
        player: Player,
        distance: usize,
        match_type: MatchType,
    },
    Unknown {
        original_text: String,
    },
}

impl MatchOutcome {
    pub fn unknown(text: &str) -> Self {
        MatchOutcome::Unknown {
            original_text: text.to_string(),
        }
    }

    pub fn manual(player: Player) -> Self {
        MatchOutcome::Matched {
            player,
            distance: 0,
            match_type: MatchType::Manual,
        }
    }

    pub fn player(&self) -> Option<&Player> {
        match self {
            MatchOutcome::Matched { player, .. } => Some(player),
            MatchOutcome::Unknown { .. } => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, MatchOutcome::Unknown { .. })
    }
}

/// Maps noisy recognizer output onto roster players
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    settings: MatcherSettings,
}

struct Candidate<'a> {
    player: &'a Player,
    cleaned: String,
    normalized: String,
}

impl NameMatcher {
    pub fn new(settings: MatcherSettings) -> Self {
        Self { settings }
    }

    /// Finds the roster player closest to `text`.
    ///
    /// Stages run over the whole roster in order (exact, tag-normalized,
    /// containment, edit distance) and the first stage with a hit decides.
    /// In the edit-distance stage the earliest roster entry wins ties.
    pub fn match_name(&self, text: &str, roster: &[Player]) -> MatchOutcome {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.settings.min_candidate_len {
            return MatchOutcome::unknown(text);
        }

        let cleaned = clean_candidate(trimmed);
        if cleaned.is_empty() {
            return MatchOutcome::unknown(text);
        }
        let normalized = tables::apply_all(TAG_MISREADS, &cleaned);

        let candidates: Vec<Candidate> = roster
            .iter()
            .filter_map(|player| {
                let cleaned = clean_roster_name(&player.name);
                if cleaned.is_empty() {
                    return None;
                }
                let normalized = tables::apply_all(TAG_MISREADS, &cleaned);
                Some(Candidate {
                    player,
                    cleaned,
                    normalized,
                })
            })
            .collect();

        if let Some(c) = candidates.iter().find(|c| c.cleaned == cleaned) {
            return matched(c.player, 0, MatchType::Exact);
        }

        if let Some(c) = candidates.iter().find(|c| c.normalized == normalized) {
            return matched(c.player, 0, MatchType::Normalized);
        }

        if cleaned.chars().count() >= self.settings.min_contain_len {
            if let Some(c) = candidates
                .iter()
                .find(|c| c.cleaned.contains(&cleaned) || cleaned.contains(&c.cleaned))
            {
                return matched(c.player, 0, MatchType::Contain);
            }
        }

        let mut best: Option<(&Candidate, usize)> = None;
        for c in &candidates {
            let distance = strsim::levenshtein(&cleaned, &c.cleaned);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((c, distance));
            }
        }

        let max_distance = self.max_distance(&cleaned);
        match best {
            Some((c, distance)) if distance <= max_distance => {
                matched(c.player, distance, MatchType::Fuzzy)
            }
            _ => MatchOutcome::unknown(text),
        }
    }

    /// Largest accepted edit distance for a cleaned candidate. Halves round
    /// up, so a ten-character name tolerates five edits, not four.
    pub fn max_distance(&self, cleaned: &str) -> usize {
        (cleaned.chars().count() as f64 * self.settings.fuzzy_ratio).round() as usize
    }
}

fn matched(player: &Player, distance: usize, match_type: MatchType) -> MatchOutcome {
    MatchOutcome::Matched {
        player: player.clone(),
        distance,
        match_type,
    }
}

fn strip_noise(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !NOISE_SYMBOLS.contains(c) && !c.is_whitespace())
        .collect()
}

/// Cleaned form of recognizer output.
pub fn clean_candidate(text: &str) -> String {
    let stripped = strip_noise(text);
    let repaired = tables::apply_all(OCR_MISREADS, &stripped);
    tables::apply_all(KANA_FOLDS, &repaired)
}

/// Cleaned form of a registered player name.
pub fn clean_roster_name(name: &str) -> String {
    tables::apply_all(KANA_FOLDS, &strip_noise(name))
}
