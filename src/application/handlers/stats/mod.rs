//! Participation stats query handlers.

mod build_stats;

pub use build_stats::{BuildStatsHandler, BuildStatsQuery, BuildStatsResult, StatsScope};
