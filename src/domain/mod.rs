pub mod lenient;
pub mod models;
pub mod roster;
pub mod schedule;

pub use models::*;
pub use roster::Roster;
pub use schedule::{RoundRange, ScheduledRound, parse_round_key, round_key};
