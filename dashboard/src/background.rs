use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};
use volume::SessionConfig;
use volume::clock::SystemClock;
use volume::runtime::{Channels, run_session};

use crate::sink::SvgSink;
use crate::source::HttpEventSource;
use crate::state::AppState;

/// Runs the aggregation session for the lifetime of the server.
pub fn spawn_session(
    state: Arc<AppState>,
    config: SessionConfig,
    source: HttpEventSource,
    visibility: watch::Receiver<bool>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let sink = SvgSink::new(Arc::clone(&state.chart));
        let channels = Channels {
            visibility: Some(visibility),
            shutdown,
        };

        match run_session(config, &source, sink, None, channels, &SystemClock).await {
            Ok(session) => info!(
                buckets = session.snapshot().map(|s| s.len()).unwrap_or(0),
                "Session stopped"
            ),
            Err(e) => {
                error!("Session failed: {e}");
                state.fail(e.to_string());
            }
        }
    })
}
