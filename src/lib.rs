pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod matching;
pub mod ocr;
pub mod report;
pub mod scoring;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::Cache;
use crate::cli::{Cli, Command, ReviewAction};
use crate::config::settings::AppConfig;
use crate::database::DbPool;
use crate::database::setup::open_database;
use crate::ocr::TesseractRecognizer;
use crate::services::commit::CommitService;
use crate::services::review::{ReviewEdit, ReviewService};
use crate::services::roster::RosterService;
use crate::services::scan::ScanService;
use crate::services::server::ServerService;
use crate::services::standings::StandingsService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open(config: &AppConfig) -> Result<DbPool> {
    open_database(&config.storage.database_path)
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_import(path: &Path) -> Result<()> {
    let config = AppConfig::new();
    let service = RosterService::new(open(&config)?);
    let summary = service.run(path)?;
    println!("Imported {} teams and {} players", summary.teams, summary.players);
    Ok(())
}

pub fn handle_rounds(tournament: &str) -> Result<()> {
    let config = AppConfig::new();
    let service = StandingsService::new(open(&config)?);
    print!("{}", report::round_list(&service.rounds(tournament)?));
    Ok(())
}

pub fn handle_standings(tournament: &str, day: Option<usize>, players: bool, json: bool) -> Result<()> {
    let config = AppConfig::new();
    let service = StandingsService::new(open(&config)?);
    let standings = service.run(tournament, day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
        return Ok(());
    }

    print!("{}", report::standings_table(&standings));
    if players {
        println!();
        print!("{}", report::player_table(&standings.players));
    }
    Ok(())
}

pub fn handle_scan(tournament: &str, round: u32, images: &[PathBuf], workers: Option<usize>) -> Result<()> {
    let mut config = AppConfig::new();
    if let Some(workers) = workers {
        config.ocr.workers = workers;
    }

    let pool = open(&config)?;
    let cache = Cache::new(&config.storage.cache_dir)?;
    let recognizer = Arc::new(TesseractRecognizer::new(&config.ocr));

    let runtime = tokio::runtime::Runtime::new()?;
    let session = runtime.block_on(async {
        let service = ScanService::new(config, pool, cache, recognizer);
        service.run(tournament, round, images).await
    })?;

    print!("{}", report::session_summary(&session));
    Ok(())
}

pub fn handle_review(tournament: &str, round: u32, action: &ReviewAction) -> Result<()> {
    let config = AppConfig::new();
    let cache = Cache::new(&config.storage.cache_dir)?;
    let service = ReviewService::new(open(&config)?, cache, config.matcher.clone());

    let session = match review_edit(action) {
        Some(edit) => service.apply(tournament, round, edit)?,
        None => service.load(tournament, round)?,
    };

    print!("{}", report::session_summary(&session));
    Ok(())
}

fn review_edit(action: &ReviewAction) -> Option<ReviewEdit> {
    let edit = match action.clone() {
        ReviewAction::Show => return None,
        ReviewAction::Edit { id, text } => ReviewEdit::Text { id, text },
        ReviewAction::Rematch { id } => ReviewEdit::Rematch { id },
        ReviewAction::AssignPlayer { id, player } => ReviewEdit::AssignPlayer { id, player_id: player },
        ReviewAction::AssignTeam { id, team } => ReviewEdit::AssignTeam { id, team_id: team },
        ReviewAction::Kills { id, kills } => ReviewEdit::Kills { id, kills },
        ReviewAction::Rank { id, rank } => ReviewEdit::Rank { id, rank },
        ReviewAction::Add { rank } => ReviewEdit::Add { rank },
        ReviewAction::Remove { id } => ReviewEdit::Remove { id },
        ReviewAction::Adjust { rank, bonus, penalty } => ReviewEdit::Adjust { rank, bonus, penalty },
    };
    Some(edit)
}

pub fn handle_commit(tournament: &str, round: u32) -> Result<()> {
    let config = AppConfig::new();
    let cache = Cache::new(&config.storage.cache_dir)?;
    let service = CommitService::new(open(&config)?);

    let outcome = service.commit_session(&cache, tournament, round)?;
    print!("{}", report::commit_summary(&outcome));
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
