//! Replay decoders
//!
//! replaydeck never parses the binary replay format itself. An
//! [`AnalysisProvider`] turns one replay file into an [`AnalysisArtifact`];
//! the production provider shells out to an external decoder executable.

use crate::config::DecoderConfig;
use crate::error::CoreError;
use crate::models::AnalysisArtifact;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, trace};

/// Longest stderr excerpt carried into a decode error
const STDERR_EXCERPT_CHARS: usize = 500;

/// Decodes one replay file into a structured record
pub trait AnalysisProvider: Send + Sync {
    fn analyze(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError>;
}

impl<F> AnalysisProvider for F
where
    F: Fn(&Path) -> Result<AnalysisArtifact, CoreError> + Send + Sync,
{
    fn analyze(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError> {
        self(replay)
    }
}

/// Runs an external decoder and reads the analysis JSON from its stdout
///
/// Invocation: `<program> <args...> <replay path>`.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl AnalysisProvider for CommandProvider {
    fn analyze(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError> {
        debug!(
            program = %self.program.display(),
            replay = %replay.display(),
            "Running replay decoder"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(replay)
            .output()
            .map_err(|e| CoreError::Decode {
                path: replay.to_path_buf(),
                message: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
            return Err(CoreError::Decode {
                path: replay.to_path_buf(),
                message: format!("decoder exited with {}: {}", output.status, excerpt),
            });
        }

        trace!(bytes = output.stdout.len(), "Decoder output received");

        serde_json::from_slice(&output.stdout).map_err(|e| CoreError::Decode {
            path: replay.to_path_buf(),
            message: format!("decoder produced invalid analysis: {}", e),
        })
    }
}

/// Provider used when no decoder is configured; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoder;

impl AnalysisProvider for NoDecoder {
    fn analyze(&self, replay: &Path) -> Result<AnalysisArtifact, CoreError> {
        Err(CoreError::DecoderUnavailable {
            path: replay.to_path_buf(),
        })
    }
}

/// Build the provider described by the config
pub fn from_config(config: &DecoderConfig) -> Arc<dyn AnalysisProvider> {
    match config.command.as_deref() {
        Some(command) => Arc::new(CommandProvider::new(command).with_args(config.args.clone())),
        None => Arc::new(NoDecoder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_provider() {
        let provider = |_: &Path| -> Result<AnalysisArtifact, CoreError> {
            Ok(serde_json::from_str(r#"{"game": {"player_count": 2}, "teams": []}"#).unwrap())
        };
        let artifact = provider.analyze(Path::new("a.w3g")).unwrap();
        assert_eq!(artifact.game.player_count, 2);
    }

    #[test]
    fn test_no_decoder_fails() {
        let err = NoDecoder.analyze(Path::new("a.w3g")).unwrap_err();
        assert!(matches!(err, CoreError::DecoderUnavailable { .. }));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_from_config_without_command() {
        let provider = from_config(&DecoderConfig::default());
        assert!(provider.analyze(Path::new("a.w3g")).is_err());
    }

    #[test]
    fn test_missing_program_is_decode_error() {
        let provider = CommandProvider::new("/nonexistent/replaydeck-decoder");
        let err = provider.analyze(Path::new("a.w3g")).unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_provider_reads_stdout() {
        let provider = CommandProvider::new("sh").with_args([
            "-c",
            r#"echo '{"game": {"player_count": 4, "winner_team": 1}, "teams": [null]}'"#,
        ]);
        let artifact = provider.analyze(Path::new("ignored.w3g")).unwrap();
        assert_eq!(artifact.game.player_count, 4);
        assert_eq!(artifact.game.winner_team, Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_provider_nonzero_exit() {
        let provider =
            CommandProvider::new("sh").with_args(["-c", "echo 'bad header' >&2; exit 3"]);
        let err = provider.analyze(Path::new("broken.w3g")).unwrap_err();
        assert!(err.to_string().contains("bad header"));
    }
}
