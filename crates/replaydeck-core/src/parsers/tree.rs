//! Directory inventory for browsing
//!
//! Lists the immediate children of one directory: sub-folders and replay
//! files (with a preview of their cached analysis). Everything else is
//! ignored. Callers must have validated `dir` against the browsing root.

use super::preview::preview_file;
use crate::cache::ArtifactLayout;
use crate::error::CoreError;
use crate::models::{FolderEntry, InventoryEntry, ReplayFileEntry};
use crate::names::NameAliases;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Lists directories as [`InventoryEntry`] values
pub struct TreeScanner<'a> {
    layout: &'a ArtifactLayout,
    names: &'a NameAliases,
}

impl<'a> TreeScanner<'a> {
    pub fn new(layout: &'a ArtifactLayout, names: &'a NameAliases) -> Self {
        Self { layout, names }
    }

    /// Immediate children of `dir`, whose root-relative path is `relative`
    ///
    /// Folders come first, then replay files, each sorted by name
    /// (case-insensitive).
    pub fn list(&self, dir: &Path, relative: &str) -> Result<Vec<InventoryEntry>, CoreError> {
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let base = normalize_relative(relative);
        let mut entries = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(CoreError::DirectoryRead {
                        path: dir.to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let path = join_relative(&base, &name);
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping entry without metadata");
                    continue;
                }
            };
            let modified = metadata.modified().ok().map(to_utc);

            if metadata.is_dir() {
                entries.push(InventoryEntry::Folder(FolderEntry {
                    name,
                    path,
                    modified,
                }));
            } else if metadata.is_file() && self.layout.is_replay(entry.path()) {
                let artifact_path = self.layout.artifact_path(entry.path());
                let has_analysis = artifact_path.as_deref().is_some_and(Path::is_file);
                let preview = match (&artifact_path, has_analysis) {
                    (Some(artifact), true) => preview_file(artifact, self.names),
                    _ => None,
                };

                entries.push(InventoryEntry::File(ReplayFileEntry {
                    name,
                    path,
                    size: metadata.len(),
                    modified,
                    has_analysis,
                    preview,
                }));
            }
        }

        entries.sort_by(compare_entries);

        debug!(dir = %dir.display(), count = entries.len(), "Directory listed");
        Ok(entries)
    }
}

fn compare_entries(a: &InventoryEntry, b: &InventoryEntry) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        .then_with(|| a.name().cmp(b.name()))
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// `/`-separated relative path without leading/trailing separators
pub fn normalize_relative(relative: &str) -> String {
    relative
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn join_relative(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_game(path: &Path) {
        std::fs::write(
            path,
            r#"{"game": {"player_count": 2, "map": "Maps\\(2)Amazonia.w3x", "winner_team": 0},
                "teams": [{"1": {"name": "Neko", "team": 0, "actions": 10, "apm": 50.0}}]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_list_orders_folders_then_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("season2")).unwrap();
        std::fs::create_dir(dir.path().join("Archive")).unwrap();
        std::fs::write(dir.path().join("b.w3g"), b"W3G").unwrap();
        std::fs::write(dir.path().join("A.W3G"), b"W3G").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let layout = ArtifactLayout::default();
        let names = NameAliases::new();
        let entries = TreeScanner::new(&layout, &names)
            .list(dir.path(), "")
            .unwrap();

        let listed: Vec<_> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(listed, vec!["Archive", "season2", "A.W3G", "b.w3g"]);
    }

    #[test]
    fn test_artifacts_are_not_listed_but_previewed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("game.w3g"), b"W3G").unwrap();
        write_game(&dir.path().join("game.json"));
        std::fs::write(dir.path().join("fresh.w3g"), b"W3G").unwrap();

        let layout = ArtifactLayout::default();
        let names = NameAliases::new();
        let entries = TreeScanner::new(&layout, &names)
            .list(dir.path(), "ladder/")
            .unwrap();

        assert_eq!(entries.len(), 2);
        let InventoryEntry::File(fresh) = &entries[0] else {
            panic!("expected file entry");
        };
        assert_eq!(fresh.path, "ladder/fresh.w3g");
        assert!(!fresh.has_analysis);
        assert!(fresh.preview.is_none());

        let InventoryEntry::File(game) = &entries[1] else {
            panic!("expected file entry");
        };
        assert_eq!(game.size, 3);
        assert!(game.has_analysis);
        let preview = game.preview.as_ref().unwrap();
        assert_eq!(preview.game.map, "(2)Amazonia");
        assert_eq!(preview.winners.len(), 1);
    }

    #[test]
    fn test_corrupt_artifact_still_lists() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("game.w3g"), b"W3G").unwrap();
        std::fs::write(dir.path().join("game.json"), b"garbage").unwrap();

        let layout = ArtifactLayout::default();
        let names = NameAliases::new();
        let entries = TreeScanner::new(&layout, &names)
            .list(dir.path(), "")
            .unwrap();

        let InventoryEntry::File(game) = &entries[0] else {
            panic!("expected file entry");
        };
        assert!(game.has_analysis);
        assert!(game.preview.is_none());
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let layout = ArtifactLayout::default();
        let names = NameAliases::new();
        let err = TreeScanner::new(&layout, &names)
            .list(&dir.path().join("nope"), "nope")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_folder_paths_use_forward_slashes() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("finals")).unwrap();

        let layout = ArtifactLayout::default();
        let names = NameAliases::new();
        let entries = TreeScanner::new(&layout, &names)
            .list(dir.path(), "2024\\cup")
            .unwrap();

        assert_eq!(entries[0].path(), "2024/cup/finals");
        assert!(entries[0].is_folder());
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative(""), "");
        assert_eq!(normalize_relative("/a//b/"), "a/b");
        assert_eq!(normalize_relative("./a\\b"), "a/b");
    }
}
