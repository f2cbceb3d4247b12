//! Web router using Axum

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use replaydeck_core::models::{AnalysisArtifact, InventoryEntry, StatsReport};
use replaydeck_core::{ConversionSummary, CoreError, ReplayDeck};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::error::ApiError;

type DeckState = State<Arc<ReplayDeck>>;

/// `?path=` parameter, root-relative; missing means the root itself
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct Listing {
    pub path: String,
    pub entries: Vec<InventoryEntry>,
}

/// Create the API router
pub fn create_router(deck: Arc<ReplayDeck>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/files", get(files_handler))
        .route("/api/replay", get(replay_handler))
        .route("/api/convert", post(convert_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .with_state(deck)
}

/// API router plus a static frontend served from `dir`
///
/// Unknown paths fall back to `dir/index.html` so client-side routes work.
pub fn with_static_dir(router: Router, dir: PathBuf) -> Router {
    let index = dir.join("index.html");
    info!(dir = %dir.display(), "Serving static files");
    router.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)))
}

/// Run a blocking deck call off the async runtime
async fn blocking<T, F>(deck: Arc<ReplayDeck>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ReplayDeck) -> Result<T, CoreError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || f(&deck)).await?;
    Ok(result?)
}

async fn files_handler(
    State(deck): DeckState,
    Query(query): Query<PathQuery>,
) -> Result<Json<Listing>, ApiError> {
    let listing = blocking(deck, move |deck| {
        let entries = deck.list(&query.path)?;
        let dir = deck.resolve(&query.path)?;
        Ok(Listing {
            path: deck.root().relative_of(&dir).unwrap_or_default(),
            entries,
        })
    })
    .await?;
    Ok(Json(listing))
}

async fn replay_handler(
    State(deck): DeckState,
    Query(query): Query<PathQuery>,
) -> Result<Json<AnalysisArtifact>, ApiError> {
    let artifact = blocking(deck, move |deck| deck.analyze(&query.path)).await?;
    Ok(Json(artifact))
}

async fn convert_handler(
    State(deck): DeckState,
    Query(query): Query<PathQuery>,
) -> Result<Json<ConversionSummary>, ApiError> {
    let summary = blocking(deck, move |deck| deck.convert(&query.path)).await?;
    Ok(Json(summary))
}

async fn stats_handler(State(deck): DeckState) -> Result<Json<StatsReport>, ApiError> {
    let report = blocking(deck, |deck| deck.stats()).await?;
    Ok(Json(report))
}

async fn health_handler(State(deck): DeckState) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "root": deck.root().path().display().to_string(),
        "aliases": deck.names().len(),
    }))
}
