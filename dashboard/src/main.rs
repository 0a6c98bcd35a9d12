use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use volume::visibility::VisibilityNotifier;

use crate::source::HttpEventSource;
use crate::state::AppState;

mod background;
mod charts;
mod config;
mod routes;
mod sink;
mod source;
mod state;
mod styles;
mod views;

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let source_config = shared::load_source_config!()?;

    let config_path = config::session_config_path();
    let session_config = volume::config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let (notifier, visibility) = VisibilityNotifier::new();
    let state = Arc::new(AppState::new(
        notifier,
        session_config.presentation.max_width,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let session = background::spawn_session(
        Arc::clone(&state),
        session_config,
        HttpEventSource::new(&source_config),
        visibility,
        shutdown_rx,
    );

    let bind = config::bind_address();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {bind}"))?;
    info!("Listening on {bind}");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tx.send_replace(true);
    if let Err(e) = session.await {
        warn!("Session task ended abnormally: {e}");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
