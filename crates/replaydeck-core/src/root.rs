//! Browsing root: the only directory tree requests may touch
//!
//! Every path coming from a client is resolved through [`BrowseRoot::resolve`]
//! before it reaches the scanner, the cache gate or the aggregator.

use crate::error::CoreError;
use crate::parsers::tree::normalize_relative;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BrowseRoot {
    /// Canonical root directory
    root: PathBuf,
}

impl BrowseRoot {
    /// Canonicalize `root`; it must be an existing directory
    pub fn new(root: &Path) -> Result<Self, CoreError> {
        let canonical = root.canonicalize().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::DirectoryNotFound {
                    path: root.to_path_buf(),
                }
            } else {
                CoreError::DirectoryRead {
                    path: root.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !canonical.is_dir() {
            return Err(CoreError::InvalidPath {
                path: root.to_path_buf(),
                reason: "browsing root is not a directory".to_string(),
            });
        }

        Ok(Self { root: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a root-relative `relative` path
    ///
    /// Symlinks and `..` are resolved first; anything that lands outside the
    /// root is rejected with `AccessDenied`.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, CoreError> {
        let normalized = normalize_relative(relative);
        let joined = self.root.join(&normalized);

        let canonical = joined
            .canonicalize()
            .map_err(|e| CoreError::from_read(&joined, e))?;

        if !canonical.starts_with(&self.root) {
            return Err(CoreError::AccessDenied {
                path: PathBuf::from(relative),
            });
        }

        Ok(canonical)
    }

    /// Root-relative, `/`-separated form of an absolute path inside the root
    pub fn relative_of(&self, absolute: &Path) -> Option<String> {
        let rest = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}
