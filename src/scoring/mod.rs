pub mod aggregator;
pub mod entry;
pub mod ranking;
pub mod standings;

pub use aggregator::{Aggregation, RankAdjustment, ResultEntry, Unresolved, UnresolvedReason, aggregate, batch_id, merge_round};
pub use entry::{TeamEntry, apply_manual_entries};
pub use standings::{compute_player_standings, compute_standings};
