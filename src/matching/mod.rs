pub mod fuzzy;
pub mod tables;

pub use fuzzy::{MatchOutcome, MatchType, NameMatcher};
