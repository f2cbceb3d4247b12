//! Sidecar naming and freshness rules
//!
//! Every replay `game.w3g` owns exactly one artifact at a deterministic
//! sibling path (`game.json` with the default layout). The artifact is fresh
//! while its mtime is at least the replay's mtime. Timestamps, not content
//! hashes, decide freshness: a replay rewritten within the filesystem's
//! timestamp granularity keeps its stale artifact.

use crate::config::LayoutConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Replay/artifact naming scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Lowercased replay suffix including the dot, e.g. `.w3g`
    replay_suffix: String,
    artifact_suffix: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for ArtifactLayout {
    fn from(config: &LayoutConfig) -> Self {
        Self::new(&config.replay_extension, &config.artifact_suffix)
    }
}

impl ArtifactLayout {
    pub fn new(replay_extension: &str, artifact_suffix: &str) -> Self {
        Self {
            replay_suffix: format!(".{}", replay_extension.trim_start_matches('.')).to_lowercase(),
            artifact_suffix: artifact_suffix.to_string(),
        }
    }

    /// File name ends with the replay extension (any case)
    pub fn is_replay(&self, path: &Path) -> bool {
        file_name_lossy(path)
            .map(|name| self.strip_replay_suffix(&name).is_some())
            .unwrap_or(false)
    }

    /// File name ends with the artifact suffix
    pub fn is_artifact(&self, path: &Path) -> bool {
        file_name_lossy(path)
            .map(|name| {
                name.len() > self.artifact_suffix.len() && name.ends_with(&self.artifact_suffix)
            })
            .unwrap_or(false)
    }

    /// Sibling artifact path for a replay
    ///
    /// Returns `None` when `replay` does not carry the replay extension.
    pub fn artifact_path(&self, replay: &Path) -> Option<PathBuf> {
        let name = file_name_lossy(replay)?;
        let stem = self.strip_replay_suffix(&name)?;

        let mut artifact_name = OsString::from(stem);
        artifact_name.push(&self.artifact_suffix);
        Some(replay.with_file_name(artifact_name))
    }

    fn strip_replay_suffix<'a>(&self, name: &'a str) -> Option<&'a str> {
        let cut = name.len().checked_sub(self.replay_suffix.len())?;
        if cut == 0 || !name.is_char_boundary(cut) {
            return None;
        }
        name[cut..]
            .eq_ignore_ascii_case(&self.replay_suffix)
            .then(|| &name[..cut])
    }
}

fn file_name_lossy(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Modification time of `path`, `None` if it cannot be read
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Freshness rule: the artifact is reusable iff `artifact_mtime >= replay_mtime`
pub fn is_fresh(replay_mtime: SystemTime, artifact_mtime: SystemTime) -> bool {
    artifact_mtime >= replay_mtime
}

/// Whether the artifact at `artifact` is fresh relative to `replay`
///
/// A missing artifact is never fresh. If the replay's mtime cannot be read
/// the artifact is considered stale so the caller re-decodes (and surfaces
/// the real I/O error).
pub fn artifact_is_fresh(replay: &Path, artifact: &Path) -> bool {
    match (modified_time(replay), modified_time(artifact)) {
        (Some(replay_mtime), Some(artifact_mtime)) => is_fresh(replay_mtime, artifact_mtime),
        _ => false,
    }
}
