use anyhow::Result;

use squad_standings::cli::Command;
use squad_standings::{
    handle_commit, handle_completions, handle_import, handle_review, handle_rounds, handle_scan, handle_serve,
    handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Import { path } => handle_import(path),
        Command::Rounds { tournament } => handle_rounds(tournament),
        Command::Standings {
            tournament,
            day,
            players,
            json,
        } => handle_standings(tournament, *day, *players, *json),
        Command::Scan {
            tournament,
            round,
            images,
            workers,
        } => handle_scan(tournament, *round, images, *workers),
        Command::Review {
            tournament,
            round,
            action,
        } => handle_review(tournament, *round, action),
        Command::Commit { tournament, round } => handle_commit(tournament, *round),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
