//! Analysis artifact model (the `.json` sidecar next to every replay)
//!
//! Field names follow the classic W3G analysis layout produced by the
//! external decoder. Sections and fields this crate does not use are kept in
//! `extra` maps so that writing an artifact back never drops decoder output.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key inside a player's `heroes` map that holds the pick order, not a hero
pub const HERO_ORDER_KEY: &str = "order";

/// Map name shown when the artifact carries no map identifier
pub const UNKNOWN_MAP: &str = "Unknown";

/// Race label used when neither the nominal nor the detected race is known
pub const UNKNOWN_RACE: &str = "Unknown";

/// Generic named-counts map (action categories, pick counts, ...)
pub type NamedCounts = BTreeMap<String, u64>;

/// Missing keys and explicit `null` both read as `T::default()`
///
/// Decoders written in JavaScript emit `null` for NaN/Infinity numbers.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One decoded game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    pub game: GameInfo,

    #[serde(default)]
    pub header: ReplayHeader,

    /// Team slots in order; `None` marks a slot with no team
    pub teams: Vec<Option<TeamSlot>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Players of one team keyed by in-game player slot id
///
/// Keys stay strings on the Rust side: integer map keys do not survive the
/// buffering that `#[serde(flatten)]` on the parent struct performs.
pub type TeamSlot = BTreeMap<String, PlayerRecord>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_count: u32,

    /// Map path as stored in the replay, e.g. `Maps\FrozenThrone\(2)EchoIsles.w3x`
    #[serde(default)]
    pub map: Option<String>,

    #[serde(default)]
    pub winner_team: Option<i32>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    /// Game length in milliseconds
    #[serde(default, alias = "duration", deserialize_with = "null_as_default")]
    pub length: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub race: Option<String>,

    /// Race inferred from units/heroes; refines `race` for random picks
    #[serde(default)]
    pub race_detected: Option<String>,

    /// `None` when the decoder recorded no team; such a player never wins
    #[serde(default)]
    pub team: Option<i32>,

    #[serde(default)]
    pub color: Option<Value>,

    /// Total recorded actions; zero marks an observer or empty slot
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub apm: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub actions_details: NamedCounts,

    #[serde(default, deserialize_with = "null_as_default")]
    pub heroes: BTreeMap<String, HeroEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Value of a `heroes` map entry
///
/// Real heroes carry usage details; the `order` sentinel (and anything else
/// the decoder puts there) is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeroEntry {
    Usage(HeroUsage),
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroUsage {
    #[serde(default)]
    pub level: u32,

    #[serde(default)]
    pub revivals: u32,

    /// Game time (ms) of the last retrain, if any
    #[serde(default)]
    pub retraining_time: Option<u64>,

    #[serde(default)]
    pub abilities: BTreeMap<String, Value>,
}

impl AnalysisArtifact {
    /// Every player across all team slots, in team order then numeric slot id
    pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.teams.iter().flatten().flat_map(|slot| {
            let mut players: Vec<_> = slot.iter().collect();
            players.sort_by_key(|(id, _)| (id.parse::<u32>().unwrap_or(u32::MAX), id.as_str()));
            players.into_iter().map(|(_, player)| player)
        })
    }

    /// Players with at least one recorded action
    pub fn active_players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players().filter(|p| p.is_active())
    }

    /// Whether `player` belongs to the recorded winning team
    ///
    /// Without a winning team id, or without a team on the player, nobody wins.
    pub fn is_winner(&self, player: &PlayerRecord) -> bool {
        self.game.winner_team.is_some() && player.team == self.game.winner_team
    }

    /// Human readable map name: last path segment without the map extension
    pub fn map_name(&self) -> String {
        let Some(map) = self.game.map.as_deref().filter(|m| !m.trim().is_empty()) else {
            return UNKNOWN_MAP.to_string();
        };

        let file = map.rsplit(['/', '\\']).next().unwrap_or(map);
        let lower = file.to_ascii_lowercase();
        let stem = if lower.ends_with(".w3x") || lower.ends_with(".w3m") {
            &file[..file.len() - 4]
        } else {
            file
        };

        if stem.is_empty() {
            UNKNOWN_MAP.to_string()
        } else {
            stem.to_string()
        }
    }
}

/// First non-empty of `detected` and `nominal`, else [`UNKNOWN_RACE`]
pub fn effective_race<'a>(detected: Option<&'a str>, nominal: Option<&'a str>) -> &'a str {
    detected
        .filter(|r| !r.is_empty())
        .or_else(|| nominal.filter(|r| !r.is_empty()))
        .unwrap_or(UNKNOWN_RACE)
}

impl PlayerRecord {
    pub fn is_active(&self) -> bool {
        self.actions > 0
    }

    /// Detected race when present, else the nominal race
    pub fn effective_race(&self) -> &str {
        effective_race(self.race_detected.as_deref(), self.race.as_deref())
    }

    /// Names of the heroes this player picked (the `order` sentinel is skipped)
    pub fn hero_names(&self) -> impl Iterator<Item = &str> {
        self.heroes
            .keys()
            .map(String::as_str)
            .filter(|name| *name != HERO_ORDER_KEY)
    }

    /// APM rounded to the nearest whole action
    pub fn rounded_apm(&self) -> u64 {
        if self.apm.is_finite() && self.apm > 0.0 {
            self.apm.round() as u64
        } else {
            0
        }
    }
}
