//! replaydeck - Replay browser and player statistics

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use replaydeck_core::config::CONFIG_FILE_NAME;
use replaydeck_core::parsers::build_preview;
use replaydeck_core::{DeckConfig, ReplayDeck};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "replaydeck",
    version,
    about = "Browse Warcraft III replays and aggregate player statistics",
    long_about = "Browse a folder tree of replays, keep their analyses cached next to them,\n\
                  and compute per-player statistics across every analyzed game.\n\
                  \n\
                  Analyses are produced by an external decoder configured in replaydeck.toml\n\
                  ([decoder] command = ...) and stored as <replay>.json beside each replay.\n\
                  \n\
                  Examples:\n\
                    replaydeck web                   # Serve the HTTP API on port 3333\n\
                    replaydeck ls 2024/cup           # List a folder with game previews\n\
                    replaydeck convert               # Analyze every new or changed replay\n\
                    replaydeck analyze cup/final.w3g # Show one game\n\
                    replaydeck stats --limit 20      # Leaderboard\n\
                  \n\
                  Environment Variables:\n\
                    REPLAYDECK_CONFIG                # Config file path\n\
                    REPLAYDECK_ROOT                  # Override browsing root\n\
                    REPLAYDECK_NO_COLOR              # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (default: replaydeck=info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Config file (default: ./replaydeck.toml, then the user config dir)
    #[arg(long, env = "REPLAYDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Browsing root, overrides the config file
    #[arg(long, env = "REPLAYDECK_ROOT")]
    root: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "REPLAYDECK_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the HTTP API
    Web {
        /// Port for web server
        #[arg(long, default_value = "3333")]
        port: u16,
        /// Serve a built frontend from this directory
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// List a folder (root-relative) with previews of analyzed replays
    Ls {
        #[arg(default_value = "")]
        path: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze every replay below a folder whose analysis is missing or stale
    Convert {
        #[arg(default_value = "")]
        path: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the analysis of one replay, decoding it if needed
    Analyze {
        /// Replay path, relative to the root
        file: String,
        /// Output the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the player leaderboard
    Stats {
        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
        /// Max players shown
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.root)?;
    let deck = Arc::new(ReplayDeck::from_config(&config).with_context(|| {
        format!("Failed to open browsing root {}", config.root.display())
    })?);
    let no_color = cli.no_color;

    match cli.mode {
        Mode::Web { port, static_dir } => {
            println!("Browsing root: {}", deck.root().path().display());
            replaydeck_web::run(deck, port, static_dir).await?;
        }
        Mode::Ls { path, json } => {
            let entries = deck
                .list(&path)
                .with_context(|| format!("Failed to list '{}'", path))?;
            println!("{}", cli::format_listing(&entries, json, no_color));
        }
        Mode::Convert { path, json } => {
            let summary = blocking(&deck, move |deck| deck.convert(&path)).await?;
            println!("{}", cli::format_conversion(&summary, json));
        }
        Mode::Analyze { file, json } => {
            let label = file.clone();
            let artifact = blocking(&deck, move |deck| deck.analyze(&file))
                .await
                .with_context(|| format!("Failed to analyze '{}'", label))?;
            let preview = build_preview(&artifact, deck.names());
            println!(
                "{}",
                cli::format_analysis(&artifact, &preview, json, no_color)
            );
        }
        Mode::Stats { json, limit } => {
            let run = blocking(&deck, |deck| deck.stats_with_failures()).await?;
            if !run.skipped.is_empty() {
                eprintln!("Skipped {} unreadable analyses", run.skipped.len());
            }
            println!(
                "{}",
                cli::format_stats_table(&run.report, limit, json, no_color)
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("replaydeck=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config`, else `./replaydeck.toml`, else the user config dir
fn load_config(explicit: Option<&PathBuf>, root: Option<PathBuf>) -> Result<DeckConfig> {
    let path = match explicit {
        Some(path) => path.clone(),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.is_file() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("replaydeck").join(CONFIG_FILE_NAME))
                    .unwrap_or(local)
            }
        }
    };

    let mut config = DeckConfig::load(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    if let Some(root) = root {
        config.root = root;
    }

    debug!(config = %path.display(), root = %config.root.display(), "Configuration resolved");
    Ok(config)
}

/// Run a blocking deck call on the blocking pool
async fn blocking<T, F>(deck: &Arc<ReplayDeck>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ReplayDeck) -> Result<T, replaydeck_core::CoreError> + Send + 'static,
{
    let deck = Arc::clone(deck);
    let result = tokio::task::spawn_blocking(move || f(&deck))
        .await
        .context("Blocking task failed")?;
    Ok(result?)
}
