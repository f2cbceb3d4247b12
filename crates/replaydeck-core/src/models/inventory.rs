//! Directory inventory entries and replay previews served to the browser

use super::artifact::effective_race;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One immediate child of a browsed directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InventoryEntry {
    Folder(FolderEntry),
    File(ReplayFileEntry),
}

impl InventoryEntry {
    pub fn name(&self) -> &str {
        match self {
            InventoryEntry::Folder(folder) => &folder.name,
            InventoryEntry::File(file) => &file.name,
        }
    }

    /// Root-relative path with `/` separators
    pub fn path(&self) -> &str {
        match self {
            InventoryEntry::Folder(folder) => &folder.path,
            InventoryEntry::File(file) => &file.path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, InventoryEntry::Folder(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Whether the sibling analysis artifact exists (fresh or not)
    pub has_analysis: bool,
    pub preview: Option<ReplayPreview>,
}

/// Compact summary of an analysis artifact for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPreview {
    pub game: PreviewGame,
    pub players: Vec<PreviewPlayer>,
    pub winners: Vec<PreviewWinner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewGame {
    pub player_count: u32,
    pub map: String,
    /// Game length in milliseconds
    pub duration: u64,
    pub winner_team: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPlayer {
    pub name: Option<String>,
    /// Canonical name, only set when it differs from `name`
    pub normalized_name: Option<String>,
    pub race: Option<String>,
    pub race_detected: Option<String>,
    pub color: Option<Value>,
    pub team: Option<i32>,
    pub apm: u64,
}

impl PreviewPlayer {
    /// Same race rule the statistics use
    pub fn effective_race(&self) -> &str {
        effective_race(self.race_detected.as_deref(), self.race.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewWinner {
    pub name: Option<String>,
    pub normalized_name: Option<String>,
    pub color: Option<Value>,
}
