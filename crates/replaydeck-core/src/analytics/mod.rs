//! Cross-game analytics over analysis artifacts
//!
//! [`StatsAggregator`] builds the per-player report along with the
//! corpus-wide race and hero views the dashboard shows.

pub mod player_stats;


pub use player_stats::{AggregateRun, StatsAggregator};
