//! replaydeck-web - HTTP API for replaydeck using Axum

pub mod error;
pub mod router;

pub use error::ApiError;
pub use router::create_router;

use anyhow::{Context, Result};
use replaydeck_core::ReplayDeck;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server
pub async fn run(deck: Arc<ReplayDeck>, port: u16, static_dir: Option<PathBuf>) -> Result<()> {
    let mut router = create_router(deck);
    if let Some(dir) = static_dir {
        router = router::with_static_dir(router, dir);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Web server listening on http://{}", addr);
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
