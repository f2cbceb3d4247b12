//! Replay deck: the request-level entry point
//!
//! Holds the immutable startup state (root, layout, aliases, decoder) and
//! exposes the four operations served to clients. Nothing read from disk is
//! kept between calls; every request sees the current state of the tree.

use crate::analytics::{AggregateRun, StatsAggregator};
use crate::cache::{ArtifactLayout, CacheGate, ConversionSummary};
use crate::config::DeckConfig;
use crate::error::CoreError;
use crate::models::{AnalysisArtifact, InventoryEntry, StatsReport};
use crate::names::NameAliases;
use crate::parsers::TreeScanner;
use crate::provider::{self, AnalysisProvider};
use crate::root::BrowseRoot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ReplayDeck {
    root: BrowseRoot,
    names: NameAliases,
    gate: CacheGate,
}

impl ReplayDeck {
    /// Build from configuration, using the configured decoder
    pub fn from_config(config: &DeckConfig) -> Result<Self, CoreError> {
        Self::with_provider(config, provider::from_config(&config.decoder))
    }

    /// Build from configuration with an explicit decoder
    pub fn with_provider(
        config: &DeckConfig,
        provider: Arc<dyn AnalysisProvider>,
    ) -> Result<Self, CoreError> {
        let root = BrowseRoot::new(&config.root)?;
        let names = config.name_aliases();
        let layout = ArtifactLayout::from(&config.layout);

        info!(
            root = %root.path().display(),
            aliases = names.len(),
            decoder = config.decoder.command.as_deref().unwrap_or("none"),
            "Replay deck ready"
        );

        Ok(Self {
            root,
            names,
            gate: CacheGate::new(layout, provider),
        })
    }

    pub fn root(&self) -> &BrowseRoot {
        &self.root
    }

    pub fn names(&self) -> &NameAliases {
        &self.names
    }

    pub fn layout(&self) -> &ArtifactLayout {
        self.gate.layout()
    }

    /// List a root-relative directory
    pub fn list(&self, relative: &str) -> Result<Vec<InventoryEntry>, CoreError> {
        let dir = self.resolve_dir(relative)?;
        let relative = self.root.relative_of(&dir).unwrap_or_default();
        TreeScanner::new(self.layout(), &self.names).list(&dir, &relative)
    }

    /// Analysis of a root-relative replay file, from cache or freshly decoded
    pub fn analyze(&self, relative: &str) -> Result<AnalysisArtifact, CoreError> {
        let replay = self.root.resolve(relative)?;
        if !self.layout().is_replay(&replay) {
            return Err(CoreError::InvalidPath {
                path: replay,
                reason: "not a replay file".to_string(),
            });
        }
        self.gate.load_or_analyze(&replay)
    }

    /// Bulk-convert every replay below a root-relative directory
    pub fn convert(&self, relative: &str) -> Result<ConversionSummary, CoreError> {
        let dir = self.resolve_dir(relative)?;
        self.gate.convert_tree(&dir)
    }

    /// Player statistics over the whole root
    pub fn stats(&self) -> Result<StatsReport, CoreError> {
        self.stats_with_failures().map(|run| run.report)
    }

    pub fn stats_with_failures(&self) -> Result<AggregateRun, CoreError> {
        StatsAggregator::new(self.layout(), &self.names).aggregate_with_failures(self.root.path())
    }

    fn resolve_dir(&self, relative: &str) -> Result<PathBuf, CoreError> {
        let dir = self.root.resolve(relative)?;
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound { path: dir });
        }
        debug!(dir = %dir.display(), "Resolved directory");
        Ok(dir)
    }

    /// Absolute path of a root-relative path (validated)
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, CoreError> {
        self.root.resolve(relative)
    }
}
