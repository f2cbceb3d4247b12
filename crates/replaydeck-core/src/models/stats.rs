//! Cross-game player statistics
//!
//! A [`StatsReport`] is a pure projection of the artifacts on disk. It is
//! rebuilt in full on every request and never merged incrementally.

use super::artifact::NamedCounts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated statistics for every player found under a root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Artifacts that parsed successfully
    pub total_games: u64,

    /// Canonical player name -> aggregate
    pub player_stats: BTreeMap<String, PlayerStatAggregate>,

    /// Player-games per effective race, everyone included
    #[serde(default)]
    pub race_distribution: NamedCounts,

    /// Total picks per hero, everyone included
    #[serde(default)]
    pub hero_usage: NamedCounts,
}

/// Win/loss split for one race
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub wins: u64,
    pub losses: u64,
}

impl RaceRecord {
    pub fn games(&self) -> u64 {
        self.wins + self.losses
    }
}

/// Cumulative statistics for one canonical player name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatAggregate {
    pub wins: u64,
    pub losses: u64,

    /// Effective race -> win/loss split
    pub races: BTreeMap<String, RaceRecord>,

    /// Effective race -> hero name -> pick count
    pub heroes: BTreeMap<String, NamedCounts>,
}

impl PlayerStatAggregate {
    pub fn games(&self) -> u64 {
        self.wins + self.losses
    }

    /// Fraction of games won, 0.0 when no games were played
    pub fn win_rate(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        self.wins as f64 / games as f64
    }

    /// Race played most often (ties broken by name)
    pub fn main_race(&self) -> Option<&str> {
        self.races
            .iter()
            .max_by(|(a_name, a), (b_name, b)| a.games().cmp(&b.games()).then(b_name.cmp(a_name)))
            .map(|(name, _)| name.as_str())
    }

    /// Total picks of each hero across all races
    pub fn hero_picks(&self) -> NamedCounts {
        let mut picks = NamedCounts::new();
        for heroes in self.heroes.values() {
            for (hero, count) in heroes {
                *picks.entry(hero.clone()).or_insert(0) += count;
            }
        }
        picks
    }

    pub(crate) fn record_result(&mut self, race: &str, won: bool) {
        let bucket = self.races.entry(race.to_string()).or_default();
        if won {
            self.wins += 1;
            bucket.wins += 1;
        } else {
            self.losses += 1;
            bucket.losses += 1;
        }
    }

    pub(crate) fn record_hero_pick(&mut self, race: &str, hero: &str) {
        *self
            .heroes
            .entry(race.to_string())
            .or_default()
            .entry(hero.to_string())
            .or_insert(0) += 1;
    }
}

impl StatsReport {
    /// Record one game of `name` and keep the corpus-wide views in step
    pub(crate) fn record_game<'h>(
        &mut self,
        name: &str,
        race: &str,
        won: bool,
        heroes: impl IntoIterator<Item = &'h str>,
    ) {
        let stats = self.player_stats.entry(name.to_string()).or_default();
        stats.record_result(race, won);
        *self.race_distribution.entry(race.to_string()).or_insert(0) += 1;

        for hero in heroes {
            stats.record_hero_pick(race, hero);
            *self.hero_usage.entry(hero.to_string()).or_insert(0) += 1;
        }
    }

    /// Most picked heroes, ties broken by name
    pub fn top_heroes(&self, n: usize) -> Vec<(&str, u64)> {
        let mut heroes: Vec<_> = self
            .hero_usage
            .iter()
            .map(|(hero, picks)| (hero.as_str(), *picks))
            .collect();
        heroes.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));
        heroes.truncate(n);
        heroes
    }

    pub fn player(&self, name: &str) -> Option<&PlayerStatAggregate> {
        self.player_stats.get(name)
    }

    /// Players ordered by games played (desc), then by name
    pub fn leaderboard(&self) -> Vec<(&str, &PlayerStatAggregate)> {
        let mut players: Vec<_> = self
            .player_stats
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        players.sort_by(|(a_name, a), (b_name, b)| {
            b.games().cmp(&a.games()).then_with(|| a_name.cmp(b_name))
        });
        players
    }
}
