use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tables::{self, KILL_SUFFIX, LINE_GLYPHS, NAME_ARTIFACTS, SYSTEM_LABELS};
use crate::config::layout::RegionLabel;
use crate::config::settings::OcrSettings;
use crate::matching::tables::apply_all;

/// One name line read from a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLine {
    pub raw_text: String,
    pub name: String,
    /// `None` until a kill count is read; distinct from a read zero.
    pub kills: Option<u32>,
}

/// Parsed contents of one results-card region
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionText {
    pub rank: Option<u32>,
    pub entries: Vec<ParsedLine>,
}

/// Turns recognizer output for a single region into a rank and name lines
pub struct RegionParser {
    rank_line: Regex,
    rank_prefix: Regex,
    lone_number: Regex,
    kill_marker: Regex,
    kill_suffix: Regex,
    leading_fragment: Regex,
    leading_number: Regex,
    leading_symbols: Regex,
    trailing_symbols: Regex,
    artifacts: Vec<Regex>,
    max_lone_kills: u32,
    rank_header_lines: usize,
}

impl RegionParser {
    pub fn new(settings: &OcrSettings) -> Result<Self> {
        Ok(Self {
            rank_line: compile(r"^[\s*]*([0-9ab]{1,2})[\s*]*$")?,
            rank_prefix: compile(r"(?i)^([0-9ab]{1,2})\s+")?,
            lone_number: compile(r"^[0-9]{1,2}$")?,
            kill_marker: compile(&format!(r"(?i)((?-i:[0-9ロワB]|IL)+)\s*({})", KILL_SUFFIX))?,
            kill_suffix: compile(&format!(r"(?i)({})$", KILL_SUFFIX))?,
            leading_fragment: compile(r"(?i)^[a-z]{1,2}\s+")?,
            leading_number: compile(r"^[0-9]+\s+")?,
            leading_symbols: compile(r"^[*|!‡_@#%&§=~«\-\[\](){}.:とにて]+\s*")?,
            trailing_symbols: compile(r"\s*[*|!‡_@#%&§=~«\-\[\](){}.:DLs]+$")?,
            artifacts: NAME_ARTIFACTS
                .iter()
                .map(|pattern| compile(pattern))
                .collect::<Result<Vec<_>>>()?,
            max_lone_kills: settings.max_lone_kills,
            rank_header_lines: settings.rank_header_lines,
        })
    }

    pub fn parse(&self, text: &str, label: RegionLabel) -> RegionText {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let rank = self.detect_rank(&lines).or_else(|| label.fallback_rank());
        let mut entries: Vec<ParsedLine> = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if Self::is_system_label(line) {
                continue;
            }

            if self.lone_number.is_match(line) {
                self.attach_lone_kills(line, index, rank, &mut entries);
                continue;
            }

            let (name, kills) = self.split_kills(line);
            let name = self.clean_name(&name);

            if name.is_empty() || tables::is_hallucination(&name) {
                continue;
            }

            entries.push(ParsedLine {
                raw_text: line.to_string(),
                name,
                kills,
            });
        }

        RegionText { rank, entries }
    }

    // --- Rank Detection ---

    fn detect_rank(&self, lines: &[&str]) -> Option<u32> {
        let standalone = lines.iter().find_map(|line| {
            let lowered = line.to_lowercase();
            self.rank_line
                .captures(&lowered)
                .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        });

        // A standalone token that reads as nothing still blocks the prefix scan.
        if let Some(token) = standalone {
            return Self::parse_rank_token(&token);
        }

        lines.iter().find_map(|line| {
            let token = self.rank_prefix.captures(line)?.get(1)?.as_str().to_lowercase();
            match token.as_str() {
                "b" => Some(6),
                _ => leading_number(&token).filter(|rank| *rank > 0),
            }
        })
    }

    fn parse_rank_token(token: &str) -> Option<u32> {
        match token {
            "a" => Some(4),
            "b" => Some(6),
            _ => leading_number(token).filter(|rank| *rank > 0),
        }
    }

    // --- Line Handling ---

    fn is_system_label(line: &str) -> bool {
        let upper = line.to_uppercase();
        SYSTEM_LABELS.iter().any(|label| upper.contains(label))
    }

    fn attach_lone_kills(
        &self,
        line: &str,
        index: usize,
        rank: Option<u32>,
        entries: &mut [ParsedLine],
    ) {
        let Ok(number) = line.parse::<u32>() else {
            return;
        };

        // The rank label itself near the top of the block.
        if Some(number) == rank && index < self.rank_header_lines {
            return;
        }

        if number > self.max_lone_kills {
            return;
        }

        if let Some(last) = entries.last_mut() {
            if last.kills.is_none() {
                last.kills = Some(number);
            }
        }
    }

    /// Splits a trailing kill count off a name line. The count may be read
    /// through glyph misreads; the name keeps the characters as recognized.
    fn split_kills(&self, line: &str) -> (String, Option<u32>) {
        if let Some(caps) = self.kill_marker.captures(line) {
            if let (Some(whole), Some(count)) = (caps.get(0), caps.get(1)) {
                let name = format!("{}{}", &line[..whole.start()], &line[whole.end()..]);
                let count = apply_all(LINE_GLYPHS, count.as_str()).parse().ok();
                return (name.trim().to_string(), count);
            }
        }

        match self.kill_suffix.find(line) {
            Some(suffix) => (line[..suffix.start()].trim().to_string(), None),
            None => (line.to_string(), None),
        }
    }

    fn clean_name(&self, name: &str) -> String {
        let mut name = self.leading_fragment.replace(name, "").to_string();
        name = self.leading_number.replace(name.trim(), "").trim().to_string();
        name = self.leading_symbols.replace(&name, "").trim().to_string();
        name = self.trailing_symbols.replace(&name, "").trim().to_string();

        for artifact in &self.artifacts {
            name = artifact.replace_all(&name, "").to_string();
        }
        let name = name.trim();

        let mut chars = name.chars();
        match chars.next() {
            Some(first) if !tables::is_name_start(first) && name.chars().count() > 1 => {
                chars.as_str().trim().to_string()
            }
            _ => name.to_string(),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Failed to compile OCR pattern {}", pattern))
}

fn leading_number(text: &str) -> Option<u32> {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse().ok()
}
