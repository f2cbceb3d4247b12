//! replaydeck-core - Core library for replaydeck
//!
//! Keeps replay analyses cached next to their replays, lists replay folders
//! with game previews, and aggregates per-player statistics.

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod parsers;
pub mod provider;
pub mod root;
pub mod store;

pub use cache::{CacheGate, CacheOutcome, ConversionSummary};
pub use config::DeckConfig;
pub use error::{CoreError, FailureLog};
pub use names::NameAliases;
pub use provider::AnalysisProvider;
pub use root::BrowseRoot;
pub use store::ReplayDeck;
