//! Per-player statistics across every analyzed game under a root
//!
//! The report is recomputed from the artifacts on disk on every call. Player
//! names are canonicalized first, so aliases of one person share a single
//! entry. Hero statistics are pick counts only; no win/loss is attributed to
//! individual heroes.

use crate::cache::ArtifactLayout;
use crate::error::{CoreError, FailureLog};
use crate::models::{AnalysisArtifact, StatsReport};
use crate::names::NameAliases;
use crate::parsers::artifact::read_artifact_graceful;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Folds analysis artifacts into a [`StatsReport`]
pub struct StatsAggregator<'a> {
    layout: &'a ArtifactLayout,
    names: &'a NameAliases,
}

/// A report plus the artifacts that had to be skipped
#[derive(Debug, Default)]
pub struct AggregateRun {
    pub report: StatsReport,
    pub skipped: FailureLog,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(layout: &'a ArtifactLayout, names: &'a NameAliases) -> Self {
        Self { layout, names }
    }

    /// Every artifact below `root`, sorted by path
    pub fn discover_artifacts(&self, root: &Path, failures: &mut FailureLog) -> Vec<PathBuf> {
        let mut artifacts = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    failures.record(path, e.to_string());
                    continue;
                }
            };
            if entry.file_type().is_file() && self.layout.is_artifact(entry.path()) {
                artifacts.push(entry.into_path());
            }
        }

        artifacts.sort();
        debug!(count = artifacts.len(), "Discovered analysis artifacts");
        artifacts
    }

    /// Aggregate every artifact below `root`
    pub fn aggregate(&self, root: &Path) -> Result<StatsReport, CoreError> {
        self.aggregate_with_failures(root).map(|run| run.report)
    }

    /// Like [`aggregate`](Self::aggregate), also returning what was skipped
    pub fn aggregate_with_failures(&self, root: &Path) -> Result<AggregateRun, CoreError> {
        if !root.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut run = AggregateRun::default();
        let paths = self.discover_artifacts(root, &mut run.skipped);

        for path in &paths {
            if let Some(artifact) = read_artifact_graceful(path, &mut run.skipped) {
                self.fold(&mut run.report, &artifact);
            }
        }

        info!(
            root = %root.display(),
            games = run.report.total_games,
            players = run.report.player_stats.len(),
            skipped = run.skipped.len(),
            "Player statistics computed"
        );

        Ok(run)
    }

    /// Add one parsed game to `report`
    pub fn fold(&self, report: &mut StatsReport, artifact: &AnalysisArtifact) {
        report.total_games += 1;

        for player in artifact.active_players() {
            let Some(raw_name) = player.name.as_deref().filter(|n| !n.is_empty()) else {
                debug!("Active player without a name, not attributed");
                continue;
            };

            let name = self.names.canonical(raw_name);
            report.record_game(
                name,
                player.effective_race(),
                artifact.is_winner(player),
                player.hero_names(),
            );
        }
    }
}
