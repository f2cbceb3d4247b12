//! Analysis cache for replay files
//!
//! Artifacts live next to their replays as JSON sidecars; the filesystem is
//! the only store and nothing is kept in memory between requests.

pub mod gate;
pub mod layout;

pub use gate::{CacheGate, CacheOutcome, ConversionSummary};
pub use layout::{artifact_is_fresh, is_fresh, ArtifactLayout};
