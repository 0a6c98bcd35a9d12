//! One aggregation session: owns the ledger, its timers and the sink.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::advance::AdvanceTimer;
use crate::classifier::{ClassifiedEntry, RawEvent, classify};
use crate::coalescer::RenderCoalescer;
use crate::config::SessionConfig;
use crate::error::{LedgerError, RequestType, SessionError, SourceError};
use crate::ledger::BucketLedger;
use crate::placement::place;
use crate::resolution::Resolution;
use crate::sink::{RenderSink, Series, StyleConfig};
use crate::source::RetainedEntries;
use crate::visibility::VisibilityGate;

/// Everything that can happen to a session, delivered through [`Session::handle`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    InitialData(Vec<RawEvent>),
    LiveUpdate(Vec<RawEvent>),
    VisibilityChanged(bool),
    /// The window advancement timer's wake time has passed.
    TimerTick,
    /// The render coalescer's quiet period has passed.
    RenderTick,
    SourceFailed(SourceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingData,
    Running,
    /// An invariant broke; the series can no longer be trusted.
    Halted,
    TornDown,
}

pub struct Session<S: RenderSink> {
    config: SessionConfig,
    style: StyleConfig,
    sink: S,
    visibility: VisibilityGate,
    ledger: Option<BucketLedger>,
    /// The initial batch had nothing countable; the next data re-selects the resolution.
    awaiting_first_data: bool,
    /// Set once the sink holds a full render that incremental updates can patch.
    chart_ready: bool,
    advance: AdvanceTimer,
    coalescer: RenderCoalescer,
    retained: RetainedEntries,
    phase: Phase,
}

impl<S: RenderSink> Session<S> {
    /// Fails with [`SessionError::MissingTarget`] when no source is configured.
    pub fn new(config: SessionConfig, sink: S) -> Result<Self, SessionError> {
        if config.target().is_none() {
            error!("Unable to retrieve data, target URL is not specified");
            return Err(SessionError::MissingTarget);
        }

        Ok(Session {
            style: StyleConfig::from(&config.presentation),
            coalescer: RenderCoalescer::new(config.chart_update_delay()),
            retained: RetainedEntries::new(config.max_items_to_retrieve),
            config,
            sink,
            visibility: VisibilityGate::default(),
            ledger: None,
            awaiting_first_data: false,
            chart_ready: false,
            advance: AdvanceTimer::new(),
            phase: Phase::AwaitingData,
        })
    }

    pub fn handle(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Result<(), SessionError> {
        match self.phase {
            Phase::TornDown => return Err(SessionError::TornDown),
            Phase::Halted => {
                debug!("Ignoring event on halted session");
                return Ok(());
            }
            Phase::AwaitingData | Phase::Running => {}
        }

        let result = match event {
            SessionEvent::InitialData(events) => self.on_initial_data(&events, now),
            SessionEvent::LiveUpdate(events) => self.on_live_update(&events, now),
            SessionEvent::VisibilityChanged(visible) => {
                self.on_visibility_change(visible);
                Ok(())
            }
            SessionEvent::TimerTick => self.on_timer_tick(now),
            SessionEvent::RenderTick => {
                self.on_render_tick(now);
                Ok(())
            }
            SessionEvent::SourceFailed(err) => return self.on_source_error(err),
        };

        result.map_err(|err| self.halt(err))
    }

    fn on_initial_data(&mut self, events: &[RawEvent], now: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.phase != Phase::AwaitingData {
            debug!("Initial data after the session started, ignoring");
            return Ok(());
        }

        self.retained.prepend(events);
        let entries = classify(events);
        self.awaiting_first_data = entries.is_empty();

        self.start_ledger(&entries, now)?;
        if let (Some(min_window), Some(ledger)) = (self.config.min_window(), self.ledger.as_mut()) {
            let trimmed = ledger.trim_leading_empty(min_window);
            debug!(trimmed, "Trimmed leading empty buckets");
        }

        self.phase = Phase::Running;
        self.render_full();
        Ok(())
    }

    fn on_live_update(&mut self, events: &[RawEvent], now: DateTime<Utc>) -> Result<(), LedgerError> {
        if self.phase != Phase::Running {
            debug!("Live update before initial data, ignoring");
            return Ok(());
        }

        self.retained.prepend(events);
        let entries = classify(events);
        if entries.is_empty() {
            return Ok(());
        }

        if self.awaiting_first_data {
            info!("First countable entries arrived, re-selecting resolution");
            self.awaiting_first_data = false;
            // Rebuild from everything retained, not just this batch.
            let entries = classify(self.retained.entries());
            self.start_ledger(&entries, now)?;
            if self.visibility.is_visible() {
                self.render_full();
            }
            return Ok(());
        }

        let Some(ledger) = self.ledger.as_mut() else {
            return Ok(());
        };
        let placement = place(ledger, &entries)?;
        debug!(
            placed = placement.placed,
            appended = placement.appended,
            dropped = placement.dropped,
            "Placed live entries"
        );

        if !self.visibility.is_visible() || !self.chart_ready {
            return Ok(());
        }
        for op in &placement.ops {
            op.apply(&mut self.sink);
        }
        if placement.has_updates() {
            self.coalescer.request(now);
        }
        Ok(())
    }

    fn on_visibility_change(&mut self, visible: bool) {
        if !visible {
            if self.visibility.hide() {
                info!("Surface hidden, suspending redraws");
            }
            return;
        }

        if self.visibility.show() {
            info!("Surface visible again, resyncing");
            self.coalescer.cancel();
            if self.chart_ready {
                self.render_full();
            }
        }
    }

    fn on_timer_tick(&mut self, now: DateTime<Utc>) -> Result<(), LedgerError> {
        let Some(ledger) = self.ledger.as_mut() else {
            return Ok(());
        };
        let Some(advance) = self.advance.advance(ledger, now)? else {
            return Ok(());
        };

        if self.visibility.is_visible() && self.chart_ready {
            self.sink.append_point(0, &advance.label);
            if advance.evicted {
                self.sink.remove_oldest_point();
            }
            self.coalescer.request(now);
        }
        Ok(())
    }

    fn on_render_tick(&mut self, now: DateTime<Utc>) {
        if !self.coalescer.fire(now) {
            return;
        }
        if self.visibility.is_visible() && self.chart_ready {
            self.sink.redraw();
        } else {
            debug!("Coalesced redraw suppressed while hidden");
        }
    }

    fn on_source_error(&mut self, err: SourceError) -> Result<(), SessionError> {
        match err.request_type {
            RequestType::Initial => {
                error!("Initial fetch failed: {err}");
                self.teardown();
                Err(SessionError::InitialFetch(err))
            }
            RequestType::Live if err.is_critical() => {
                error!("Live update failed: {err}");
                Ok(())
            }
            RequestType::Live => {
                warn!("Live update failed: {err}");
                Ok(())
            }
        }
    }

    /// Selects the resolution for `entries`, lays out a fresh window, counts
    /// the entries into it and restarts the advancement timer.
    fn start_ledger(
        &mut self,
        entries: &[ClassifiedEntry],
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let tz = self.config.time_zone();
        let resolution = Resolution::select(entries, &now.with_timezone(&tz));
        info!(
            kind = ?resolution.kind,
            interval = resolution.interval,
            anchor = resolution.start,
            "Selected resolution"
        );

        let max_window = self.config.max_window();
        let mut ledger = BucketLedger::initialize(
            resolution,
            resolution.kind.window_size(max_window),
            max_window,
            tz,
        );
        place(&mut ledger, entries)?;
        ledger.validate()?;

        self.advance.start(&ledger, now)?;
        self.ledger = Some(ledger);
        Ok(())
    }

    fn render_full(&mut self) {
        if let Some(ledger) = &self.ledger {
            self.sink.render(&ledger.series(), &self.style);
            self.chart_ready = true;
        }
    }

    fn halt(&mut self, err: LedgerError) -> SessionError {
        error!("Halting aggregation: {err}");
        self.advance.stop();
        self.coalescer.cancel();
        self.phase = Phase::Halted;
        SessionError::Invariant(err)
    }

    /// Stops every timer. No further events are accepted.
    pub fn teardown(&mut self) {
        self.advance.stop();
        self.coalescer.cancel();
        self.phase = Phase::TornDown;
    }

    /// When the advancement timer next wants a [`SessionEvent::TimerTick`].
    pub fn advance_due(&self) -> Option<DateTime<Utc>> {
        self.advance.wake_at()
    }

    /// When the coalescer next wants a [`SessionEvent::RenderTick`].
    pub fn render_due(&self) -> Option<DateTime<Utc>> {
        self.coalescer.due()
    }

    pub fn snapshot(&self) -> Option<Series> {
        self.ledger.as_ref().map(BucketLedger::series)
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.ledger.as_ref().map(BucketLedger::resolution)
    }

    pub fn ledger(&self) -> Option<&BucketLedger> {
        self.ledger.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == Phase::TornDown
    }

    /// Raw entries seen so far, newest first, capped at twice the page size.
    ///
    /// Enough history for a consumer to rebuild the series from scratch; the
    /// session itself rebuilds from it when the first countable entries arrive.
    pub fn retained_entries(&self) -> &[RawEvent] {
        self.retained.entries()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
