//! Terminal rendering for the CLI commands.

use colored::{ColoredString, Colorize};

use crate::domain::{PlayerStandingsRow, ScheduledRound, StandingsRow};
use crate::ocr::{DetectionItem, ScanSession};
use crate::services::commit::CommitReport;
use crate::services::standings::StandingsReport;

fn podium(rank: usize, text: String) -> ColoredString {
    match rank {
        1 => text.yellow().bold(),
        2 => text.white().bold(),
        3 => text.red().bold(),
        _ => text.normal(),
    }
}

pub fn standings_table(report: &StandingsReport) -> String {
    let mut out = format!("{} ({})\n", report.tournament_name.bold(), report.scope);
    out.push_str(&format!(
        "{:>4}  {:<24} {:<6} {:>6} {:>6} {:>6} {:>6} {:>5} {:>5}\n",
        "#", "Team", "Tag", "Total", "Place", "Kill", "Bonus", "Wins", "Games"
    ));

    for row in &report.teams {
        let line = team_line(row);
        out.push_str(&format!("{}\n", podium(row.rank, line)));
    }
    out
}

fn team_line(row: &StandingsRow) -> String {
    format!(
        "{:>4}  {:<24} {:<6} {:>6} {:>6} {:>6} {:>6} {:>5} {:>5}",
        row.rank,
        truncate(&row.team_name, 24),
        row.tag.as_deref().unwrap_or("-"),
        row.total_points,
        row.placement_points,
        row.kill_points,
        row.bonus_points - row.penalty_points,
        row.wins,
        row.played_rounds
    )
}

pub fn player_table(rows: &[PlayerStandingsRow]) -> String {
    let mut out = format!("{:>4}  {:<24} {:<24} {:>5}\n", "#", "Player", "Team", "Kills");
    for row in rows {
        let line = format!(
            "{:>4}  {:<24} {:<24} {:>5}",
            row.rank,
            truncate(&row.name, 24),
            truncate(&row.team_name, 24),
            row.total_kills
        );
        out.push_str(&format!("{}\n", podium(row.rank, line)));
    }
    out
}

pub fn round_list(rounds: &[ScheduledRound]) -> String {
    rounds
        .iter()
        .map(|round| match &round.date {
            Some(date) => format!("{:>3}  {} ({})\n", round.number, round.label, date),
            None => format!("{:>3}  {}\n", round.number, round.label),
        })
        .collect()
}

pub fn session_summary(session: &ScanSession) -> String {
    let mut out = format!(
        "Round {} of {}: {} items\n",
        session.round,
        session.tournament_id,
        session.items.len()
    );

    for (rank, items) in session.ranked_groups() {
        let adjustment = session.adjustments.get(&rank);
        let bonus = adjustment.and_then(|a| a.bonus).unwrap_or(0);
        let penalty = adjustment.and_then(|a| a.penalty).unwrap_or(0);
        out.push_str(&format!("{}", format!("Rank {}", rank).bold()));
        if bonus != 0 || penalty != 0 {
            out.push_str(&format!("  (+{} / -{})", bonus, penalty));
        }
        out.push('\n');
        for item in items {
            out.push_str(&format!("  {}\n", item_line(item)));
        }
    }

    let unranked: Vec<&DetectionItem> = session.items.iter().filter(|item| item.rank.is_none()).collect();
    if !unranked.is_empty() {
        out.push_str(&format!("{}\n", "Unknown rank".yellow().bold()));
        for item in unranked {
            out.push_str(&format!("  {}\n", item_line(item)));
        }
    }
    out
}

fn item_line(item: &DetectionItem) -> String {
    let kills = item.kills.map(|k| k.to_string()).unwrap_or_else(|| "-".to_string());
    let player = match item.matched.player() {
        Some(player) => player.name.green().to_string(),
        None => "unknown".red().to_string(),
    };
    let team = item.team_id.as_deref().unwrap_or("-");

    let mut line = format!(
        "{:<14} {:<20} → {} [{}] kills {}",
        item.id,
        truncate(&item.edited_text, 20),
        player,
        team,
        kills
    );
    if item.is_duplicate {
        line.push_str(&format!(" {}", "duplicate".magenta()));
    }
    line
}

pub fn commit_summary(report: &CommitReport) -> String {
    let mut out = format!("Round {}: saved {} teams\n", report.round, report.saved.len());
    for team_id in &report.saved {
        if let Some(result) = report.results.get(team_id) {
            out.push_str(&format!(
                "  {:<16} rank {:>2}  kills {:>3}  total {:>4}\n",
                team_id, result.rank, result.kills, result.total_points
            ));
        }
    }
    for unresolved in &report.unresolved {
        out.push_str(&format!("  {} {} ({:?})\n", "skipped".yellow(), unresolved.entry_id, unresolved.reason));
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width.saturating_sub(1)).chain(['…']).collect()
    }
}
