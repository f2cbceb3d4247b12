//! Data models for replaydeck

pub mod artifact;
pub mod inventory;
pub mod stats;

pub use artifact::{
    effective_race, AnalysisArtifact, GameInfo, HeroEntry, HeroUsage, NamedCounts, PlayerRecord,
    ReplayHeader, TeamSlot, HERO_ORDER_KEY, UNKNOWN_MAP, UNKNOWN_RACE,
};
pub use inventory::{
    FolderEntry, InventoryEntry, PreviewGame, PreviewPlayer, PreviewWinner, ReplayFileEntry,
    ReplayPreview,
};
pub use stats::{PlayerStatAggregate, RaceRecord, StatsReport};
