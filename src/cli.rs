use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "squad-standings", author, version, about = "Squad tournament scoring from result screenshots")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Import a tournament with its teams and players from a JSON file
    Import {
        /// Roster file
        path: PathBuf,
    },
    /// List the scheduled rounds of a tournament
    Rounds {
        tournament: String,
    },
    /// Show team standings
    Standings {
        tournament: String,
        /// Only count the rounds of this schedule day (1-based)
        #[arg(short, long)]
        day: Option<usize>,
        /// Show the player kill leaderboard as well
        #[arg(long)]
        players: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Read result screenshots of a round into a review session
    Scan {
        tournament: String,
        #[arg(short, long)]
        round: u32,
        /// Screenshot files
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Images recognized at the same time
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Inspect or correct a scan session
    Review {
        tournament: String,
        #[arg(short, long)]
        round: u32,
        #[clap(subcommand)]
        action: ReviewAction,
    },
    /// Add a reviewed scan session to the stored results
    Commit {
        tournament: String,
        #[arg(short, long)]
        round: u32,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum ReviewAction {
    /// Print the session grouped by rank
    Show,
    /// Replace the recognized text of an item and match it again
    Edit { id: String, text: String },
    /// Match an item's text against the roster again
    Rematch { id: String },
    /// Credit an item to a registered player
    AssignPlayer { id: String, player: String },
    /// Credit an item to a team without naming a player
    AssignTeam { id: String, team: String },
    /// Set the kill count; omit the value to clear it
    Kills { id: String, kills: Option<u32> },
    /// Set the rank; omit the value or pass 0 for unknown
    Rank { id: String, rank: Option<u32> },
    /// Add a blank entry
    Add {
        #[arg(long)]
        rank: Option<u32>,
    },
    /// Delete an entry
    Remove { id: String },
    /// Bonus and penalty for every team at a rank
    Adjust {
        rank: u32,
        #[arg(long)]
        bonus: Option<i64>,
        #[arg(long)]
        penalty: Option<i64>,
    },
}
