//! Cache gate: reuse a fresh analysis artifact or decode the replay again
//!
//! Invalidation is purely mtime based (see [`layout`](super::layout)). Decoding
//! and writing one artifact happens under a per-artifact lock so that two
//! concurrent requests for the same replay decode it once.

use super::layout::{artifact_is_fresh, ArtifactLayout};
use crate::error::{CoreError, FailureLog};
use crate::models::AnalysisArtifact;
use crate::parsers::artifact::read_artifact;
use crate::provider::AnalysisProvider;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Result of [`CacheGate::refresh`] for one replay
#[derive(Debug)]
pub enum CacheOutcome {
    /// Artifact was already fresh; the decoder was not called
    Reused,
    /// Replay was decoded and its artifact (re)written
    Converted,
    /// Decoding or persisting failed; the replay is untouched
    Failed(CoreError),
}

/// Counts produced by a bulk conversion
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: FailureLog,
}

impl ConversionSummary {
    fn add(&mut self, replay: &Path, outcome: CacheOutcome) {
        self.total += 1;
        match outcome {
            CacheOutcome::Reused => self.skipped += 1,
            CacheOutcome::Converted => self.converted += 1,
            CacheOutcome::Failed(e) => {
                self.failed += 1;
                self.errors.record(replay, e.to_string());
            }
        }
    }
}

/// Decides per replay whether the cached artifact is reusable
pub struct CacheGate {
    layout: ArtifactLayout,
    provider: Arc<dyn AnalysisProvider>,
    /// Artifact path -> write lock
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl CacheGate {
    pub fn new(layout: ArtifactLayout, provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            layout,
            provider,
            locks: DashMap::new(),
        }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Make sure `replay` has a fresh artifact on disk
    pub fn refresh(&self, replay: &Path) -> CacheOutcome {
        let artifact_path = match self.artifact_path_for(replay) {
            Ok(path) => path,
            Err(e) => return CacheOutcome::Failed(e),
        };

        if artifact_is_fresh(replay, &artifact_path) {
            debug!(replay = %replay.display(), "Cache hit");
            return CacheOutcome::Reused;
        }

        self.with_artifact_lock(&artifact_path, || {
            // Another caller may have finished the same replay while we waited
            if artifact_is_fresh(replay, &artifact_path) {
                debug!(replay = %replay.display(), "Cache hit after wait");
                return CacheOutcome::Reused;
            }

            let artifact = match self.decode(replay) {
                Ok(artifact) => artifact,
                Err(e) => return CacheOutcome::Failed(e),
            };

            match persist_artifact(&artifact_path, &artifact) {
                Ok(()) => CacheOutcome::Converted,
                Err(e) => {
                    warn!(replay = %replay.display(), error = %e, "Failed to store analysis");
                    CacheOutcome::Failed(e)
                }
            }
        })
    }

    /// Artifact for `replay`, served from cache when fresh, decoded otherwise
    ///
    /// A fresh artifact that no longer parses is treated as stale. When the
    /// decoded result cannot be written the result is still returned.
    pub fn load_or_analyze(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError> {
        let metadata = std::fs::metadata(replay).map_err(|e| CoreError::from_read(replay, e))?;
        if !metadata.is_file() {
            return Err(CoreError::InvalidPath {
                path: replay.to_path_buf(),
                reason: "not a file".to_string(),
            });
        }

        let artifact_path = self.artifact_path_for(replay)?;

        if let Some(cached) = self.read_fresh(replay, &artifact_path) {
            return Ok(cached);
        }

        self.with_artifact_lock(&artifact_path, || {
            if let Some(cached) = self.read_fresh(replay, &artifact_path) {
                return Ok(cached);
            }

            let artifact = self.decode(replay)?;
            if let Err(e) = persist_artifact(&artifact_path, &artifact) {
                warn!(
                    replay = %replay.display(),
                    error = %e,
                    "Failed to store analysis, returning it uncached"
                );
            }
            Ok(artifact)
        })
    }

    /// Refresh every replay below `dir`
    ///
    /// Per-replay failures are counted and recorded; only a missing `dir`
    /// fails the whole call.
    pub fn convert_tree(&self, dir: &Path) -> Result<ConversionSummary, CoreError> {
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut summary = ConversionSummary::default();

        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    summary.errors.record(path, e.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.layout.is_replay(entry.path()) {
                continue;
            }

            let outcome = self.refresh(entry.path());
            summary.add(entry.path(), outcome);
        }

        info!(
            dir = %dir.display(),
            total = summary.total,
            converted = summary.converted,
            skipped = summary.skipped,
            failed = summary.failed,
            "Bulk conversion complete"
        );

        Ok(summary)
    }

    fn artifact_path_for(&self, replay: &Path) -> Result<PathBuf, CoreError> {
        self.layout
            .artifact_path(replay)
            .ok_or_else(|| CoreError::InvalidPath {
                path: replay.to_path_buf(),
                reason: "not a replay file".to_string(),
            })
    }

    fn read_fresh(&self, replay: &Path, artifact_path: &Path) -> Option<AnalysisArtifact> {
        if !artifact_is_fresh(replay, artifact_path) {
            return None;
        }
        match read_artifact(artifact_path) {
            Ok(artifact) => {
                debug!(replay = %replay.display(), "Cache hit");
                Some(artifact)
            }
            Err(e) => {
                warn!(
                    artifact = %artifact_path.display(),
                    error = %e,
                    "Cached analysis unreadable, decoding again"
                );
                None
            }
        }
    }

    fn decode(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError> {
        debug!(replay = %replay.display(), "Cache miss, decoding replay");
        self.provider.analyze(replay).map_err(|e| {
            warn!(replay = %replay.display(), error = %e, "Failed to decode replay");
            e
        })
    }

    fn with_artifact_lock<T>(&self, artifact_path: &Path, f: impl FnOnce() -> T) -> T {
        let lock = Arc::clone(
            self.locks
                .entry(artifact_path.to_path_buf())
                .or_default()
                .value(),
        );

        let result = {
            let _guard = lock.lock();
            f()
        };

        drop(lock);
        // Drop the entry unless someone else is queued on it
        self.locks
            .remove_if(artifact_path, |_, lock| Arc::strong_count(lock) == 1);

        result
    }
}

/// Write `artifact` as indented JSON, replacing any previous file atomically
fn persist_artifact(path: &Path, artifact: &AnalysisArtifact) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| CoreError::JsonSerialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, json).map_err(|e| CoreError::FileWrite {
        path: tmp_path.clone(),
        source: e,
    })?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(CoreError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        });
    }

    debug!(path = %path.display(), "Analysis stored");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn counting_gate(calls: Arc<AtomicUsize>) -> CacheGate {
        let provider = move |_: &Path| -> Result<AnalysisArtifact, CoreError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_str(r#"{"game": {"player_count": 2}, "teams": []}"#).unwrap())
        };
        CacheGate::new(ArtifactLayout::default(), Arc::new(provider))
    }

    #[test]
    fn test_refresh_then_reuse() {
        let dir = tempdir().unwrap();
        let replay = dir.path().join("game.w3g");
        std::fs::write(&replay, b"W3G").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let gate = counting_gate(calls.clone());

        assert!(matches!(gate.refresh(&replay), CacheOutcome::Converted));
        assert!(dir.path().join("game.json").exists());
        assert!(matches!(gate.refresh(&replay), CacheOutcome::Reused));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_replay_path_fails() {
        let gate = counting_gate(Arc::new(AtomicUsize::new(0)));
        let outcome = gate.refresh(Path::new("/tmp/readme.txt"));
        assert!(matches!(
            outcome,
            CacheOutcome::Failed(CoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_persisted_artifact_is_indented() {
        let dir = tempdir().unwrap();
        let replay = dir.path().join("game.w3g");
        std::fs::write(&replay, b"W3G").unwrap();

        let gate = counting_gate(Arc::new(AtomicUsize::new(0)));
        gate.refresh(&replay);

        let written = std::fs::read_to_string(dir.path().join("game.json")).unwrap();
        assert!(written.contains("\n  \"game\""));
        assert!(!dir.path().join("game.json.tmp").exists());
    }

    #[test]
    fn test_lock_entries_are_released() {
        let dir = tempdir().unwrap();
        let replay = dir.path().join("game.w3g");
        std::fs::write(&replay, b"W3G").unwrap();

        let gate = counting_gate(Arc::new(AtomicUsize::new(0)));
        gate.refresh(&replay);
        assert!(gate.locks.is_empty());
    }
}
