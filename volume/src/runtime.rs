//! Drives a [`Session`] on tokio: initial fetch, live polling, visibility and timers.

use std::pin::{Pin, pin};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::{RequestType, SessionError, SourceError};
use crate::session::{Session, SessionEvent};
use crate::sink::RenderSink;
use crate::source::{Batch, EventSource};

/// Host-side channels a running session listens to.
pub struct Channels {
    /// Show/hide transitions; `None` on hosts without visibility support.
    pub visibility: Option<watch::Receiver<bool>>,
    /// Flips to `true` (or is dropped) to end the session.
    pub shutdown: watch::Receiver<bool>,
}

/// Runs a session until shutdown or a fatal error.
///
/// `prefetched` skips the initial request and resumes live updates from its
/// cursor. The session is torn down on every exit path; on a clean shutdown
/// it is handed back for inspection.
pub async fn run_session<E, S, C>(
    config: SessionConfig,
    source: &E,
    sink: S,
    prefetched: Option<Batch>,
    mut channels: Channels,
    clock: &C,
) -> Result<Session<S>, SessionError>
where
    E: EventSource,
    S: RenderSink,
    C: Clock,
{
    let mut session = Session::new(config, sink)?;
    let result = drive(&mut session, source, prefetched, &mut channels, clock).await;
    session.teardown();
    info!("Session ended");
    result.map(|()| session)
}

async fn drive<E, S, C>(
    session: &mut Session<S>,
    source: &E,
    prefetched: Option<Batch>,
    channels: &mut Channels,
    clock: &C,
) -> Result<(), SessionError>
where
    E: EventSource,
    S: RenderSink,
    C: Clock,
{
    let query = session.config().query().ok_or(SessionError::MissingTarget)?;
    let query = query.as_str();
    let poll_period = session.config().live_poll_interval();

    if let Some(rx) = channels.visibility.as_mut()
        && !*rx.borrow_and_update()
    {
        session.handle(SessionEvent::VisibilityChanged(false), clock.now())?;
    }

    let batch = match prefetched {
        Some(batch) => batch,
        None => {
            let fetched = tokio::select! {
                fetched = source.fetch_initial(query) => fetched,
                () = shutdown_requested(&mut channels.shutdown) => {
                    debug!("Shutdown requested during initial fetch");
                    return Ok(());
                }
            };
            match fetched {
                Ok(batch) => batch,
                Err(mut err) => {
                    err.request_type = RequestType::Initial;
                    session.handle(SessionEvent::SourceFailed(err.clone()), clock.now())?;
                    return Err(SessionError::InitialFetch(err));
                }
            }
        }
    };
    info!(entries = batch.entries.len(), "Initial batch received");
    let mut cursor = batch.next_since;
    session.handle(SessionEvent::InitialData(batch.entries), clock.now())?;

    let mut poll = interval_at(Instant::now() + poll_period, poll_period);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // At most one live request is outstanding; it runs alongside the timers.
    let start_poll = move |since: Option<String>| poll_once(source, query, since);
    let mut in_flight = pin!(None);

    loop {
        let advance = sleep_until_due(session.advance_due(), clock);
        let render = sleep_until_due(session.render_due(), clock);

        tokio::select! {
            () = shutdown_requested(&mut channels.shutdown) => {
                debug!("Shutdown requested");
                return Ok(());
            }
            Some(visible) = next_visibility(&mut channels.visibility) => {
                session.handle(SessionEvent::VisibilityChanged(visible), clock.now())?;
            }
            _ = poll.tick() => {
                if in_flight.is_some() {
                    debug!("Previous live poll still pending, skipping tick");
                } else {
                    in_flight.set(Some(start_poll(cursor.clone())));
                }
            }
            result = poll_in_flight(in_flight.as_mut()) => {
                in_flight.set(None);
                match result {
                    Ok(batch) => {
                        if batch.next_since.is_some() {
                            cursor = batch.next_since;
                        }
                        session.handle(SessionEvent::LiveUpdate(batch.entries), clock.now())?;
                    }
                    Err(mut err) => {
                        err.request_type = RequestType::Live;
                        session.handle(SessionEvent::SourceFailed(err), clock.now())?;
                    }
                }
            }
            _ = advance => {
                session.handle(SessionEvent::TimerTick, clock.now())?;
            }
            _ = render => {
                session.handle(SessionEvent::RenderTick, clock.now())?;
            }
        }
    }
}

async fn poll_once<E: EventSource>(
    source: &E,
    query: &str,
    since: Option<String>,
) -> Result<Batch, SourceError> {
    source.poll_updates(query, since.as_deref()).await
}

/// Resolves with the outstanding request's result; pends while there is none.
async fn poll_in_flight<F: Future>(slot: Pin<&mut Option<F>>) -> F::Output {
    match slot.as_pin_mut() {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}

/// Resolves once shutdown is signalled or the sender is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn sleep_until_due<C: Clock>(due: Option<DateTime<Utc>>, clock: &C) {
    match due {
        Some(due) => sleep((due - clock.now()).to_std().unwrap_or_default()).await,
        None => std::future::pending().await,
    }
}

/// Next visibility value; yields `None` once (and then pends forever) when the
/// notifier is gone.
async fn next_visibility(rx: &mut Option<watch::Receiver<bool>>) -> Option<bool> {
    let Some(receiver) = rx.as_mut() else {
        return std::future::pending().await;
    };
    if receiver.changed().await.is_err() {
        debug!("Visibility notifier dropped");
        *rx = None;
        return None;
    }
    Some(*receiver.borrow_and_update())
}
