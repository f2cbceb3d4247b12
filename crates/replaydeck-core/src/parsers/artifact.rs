//! Reading analysis artifacts back from disk

use crate::error::{CoreError, FailureLog};
use crate::models::AnalysisArtifact;
use std::path::Path;
use tracing::warn;

/// Read and parse one artifact
pub fn read_artifact(path: &Path) -> Result<AnalysisArtifact, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::from_read(path, e))?;

    serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
        path: path.to_path_buf(),
        message: e.to_string(),
        source: e,
    })
}

/// Read an artifact, recording (not propagating) any failure
pub fn read_artifact_graceful(path: &Path, failures: &mut FailureLog) -> Option<AnalysisArtifact> {
    match read_artifact(path) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable analysis artifact");
            failures.record(path, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_valid_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(
            &path,
            r#"{"game": {"player_count": 2, "winner_team": 1}, "header": {"length": 1000}, "teams": [null, null]}"#,
        )
        .unwrap();

        let artifact = read_artifact(&path).unwrap();
        assert_eq!(artifact.game.winner_team, Some(1));
        assert_eq!(artifact.teams.len(), 2);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        let err = read_artifact(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_artifact_is_recorded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut failures = FailureLog::new();
        assert!(read_artifact_graceful(&path, &mut failures).is_none());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.failures[0].path, path);
    }

    #[test]
    fn test_structurally_wrong_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shape.json");
        std::fs::write(&path, r#"{"game": {"player_count": 1}}"#).unwrap();

        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(err, CoreError::JsonParse { .. }));
    }
}
