//! replaydeck configuration (`replaydeck.toml`)
//!
//! ```toml
//! root = "/srv/replays"
//!
//! [layout]
//! replay_extension = "w3g"
//! artifact_suffix = ".json"
//!
//! [decoder]
//! command = "w3g-analyze"
//! args = ["--json"]
//!
//! [aliases]
//! NekoChan = "Neko"
//! ```

use crate::error::CoreError;
use crate::names::NameAliases;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "replaydeck.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Browsing root; every served path must resolve inside it
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Alias -> canonical player name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_root() -> PathBuf {
    PathBuf::from("replays")
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            layout: LayoutConfig::default(),
            decoder: DecoderConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

/// File naming of replays and their analysis sidecars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Replay file extension without the dot, matched case-insensitively
    #[serde(default = "default_replay_extension")]
    pub replay_extension: String,

    /// Suffix that replaces the replay extension to name the artifact
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,
}

fn default_replay_extension() -> String {
    "w3g".to_string()
}

fn default_artifact_suffix() -> String {
    ".json".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            replay_extension: default_replay_extension(),
            artifact_suffix: default_artifact_suffix(),
        }
    }
}

/// External replay decoder invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Executable that prints the analysis JSON of one replay on stdout
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed before the replay path
    #[serde(default)]
    pub args: Vec<String>,
}

impl DeckConfig {
    /// Load from `path`; a missing file yields the defaults
    ///
    /// A relative `root` in the file is taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(CoreError::from_read(path, e)),
        };

        let mut config = Self::from_toml(&content).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        if config.root.is_relative() {
            if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                config.root = base.join(&config.root);
            }
        }
        debug!(
            root = %config.root.display(),
            path = %path.display(),
            aliases = config.aliases.len(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CoreError> {
        let ext = self.layout.replay_extension.trim_start_matches('.');
        if ext.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "layout.replay_extension must not be empty".to_string(),
            });
        }
        if self.layout.artifact_suffix.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "layout.artifact_suffix must not be empty".to_string(),
            });
        }
        if self
            .decoder
            .command
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(CoreError::InvalidConfig {
                message: "decoder.command must not be blank".to_string(),
            });
        }
        Ok(())
    }

    /// Alias table for the normalizer
    pub fn name_aliases(&self) -> NameAliases {
        NameAliases::from(&self.aliases)
    }
}
