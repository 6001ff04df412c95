// Refresh scheduler - periodic polling of the current and history feeds
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::application::renderer::{CurrentValuesRenderer, SeriesRenderer};
use crate::application::series_builder::SeriesBuilder;
use crate::application::telemetry_source::TelemetrySource;
use crate::domain::telemetry::TelemetryRecord;
use crate::error::{DashboardError, Feed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    Idle,
    Fetching,
}

/// Bookkeeping for one feed.
///
/// Sequence numbers are handed out when a fetch is submitted. A response is
/// only applied when its sequence is newer than `last_applied`, so a slow
/// response can never overwrite a newer one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedStatus {
    #[serde(skip)]
    next_seq: u64,
    pub in_flight: usize,
    pub last_applied: Option<u64>,
    pub successes: u64,
    pub failures: u64,
    pub stale_discarded: u64,
    pub cancelled: u64,
    pub last_error: Option<String>,
}

impl FeedStatus {
    pub fn phase(&self) -> FeedPhase {
        if self.in_flight > 0 {
            FeedPhase::Fetching
        } else {
            FeedPhase::Idle
        }
    }

    pub fn submitted(&self) -> u64 {
        self.next_seq
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    running: bool,
    epoch: u64,
    current: FeedStatus,
    history: FeedStatus,
}

impl SchedulerState {
    fn feed_mut(&mut self, feed: Feed) -> &mut FeedStatus {
        match feed {
            Feed::Current => &mut self.current,
            Feed::History => &mut self.history,
        }
    }

    /// Decide whether a finished fetch may touch rendered state.
    fn admit<T>(
        &mut self,
        feed: Feed,
        seq: u64,
        epoch: u64,
        result: Result<T, DashboardError>,
    ) -> Option<T> {
        let active = self.running && self.epoch == epoch;
        let status = self.feed_mut(feed);
        status.in_flight = status.in_flight.saturating_sub(1);

        if !active {
            status.cancelled += 1;
            tracing::debug!("Dropping {} response #{} received after stop", feed, seq);
            return None;
        }

        match result {
            Err(e) => {
                status.failures += 1;
                status.last_error = Some(e.to_string());
                tracing::warn!("Refresh of {} feed (request #{}) failed: {}", feed, seq, e);
                None
            }
            Ok(_) if status.last_applied.is_some_and(|last| last >= seq) => {
                status.stale_discarded += 1;
                tracing::debug!(
                    "Discarding stale {} response #{} (already showing #{:?})",
                    feed,
                    seq,
                    status.last_applied
                );
                None
            }
            Ok(value) => {
                status.successes += 1;
                status.last_applied = Some(seq);
                Some(value)
            }
        }
    }
}

struct Inner {
    source: Arc<dyn TelemetrySource>,
    current_renderer: Arc<dyn CurrentValuesRenderer>,
    series_renderer: Arc<dyn SeriesRenderer>,
    builder: SeriesBuilder,
    state: Mutex<SchedulerState>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(self: &Arc<Self>, feed: Feed) -> Option<JoinHandle<()>> {
        let (seq, epoch) = {
            let mut state = self.lock_state();
            if !state.running {
                return None;
            }
            let epoch = state.epoch;
            let status = state.feed_mut(feed);
            let seq = status.next_seq;
            status.next_seq += 1;
            status.in_flight += 1;
            (seq, epoch)
        };

        tracing::debug!("Requesting {} feed (request #{})", feed, seq);
        let inner = Arc::clone(self);
        Some(tokio::spawn(async move {
            match feed {
                Feed::Current => {
                    let result = inner.source.fetch_current().await;
                    inner.apply_current(seq, epoch, result);
                }
                Feed::History => {
                    let result = inner.source.fetch_history().await;
                    inner.apply_history(seq, epoch, result);
                }
            }
        }))
    }

    fn apply_current(&self, seq: u64, epoch: u64, result: Result<TelemetryRecord, DashboardError>) {
        let result = result.map(|record| self.builder.prepare_record(record));

        let mut state = self.lock_state();
        let Some(record) = state.admit(Feed::Current, seq, epoch, result) else {
            return;
        };
        self.current_renderer.render_current_values(&record);
    }

    fn apply_history(
        &self,
        seq: u64,
        epoch: u64,
        result: Result<Vec<TelemetryRecord>, DashboardError>,
    ) {
        let result = result.map(|records| {
            tracing::debug!("Building series from {} records", records.len());
            self.builder.build(&records)
        });

        let mut state = self.lock_state();
        let Some(series) = state.admit(Feed::History, seq, epoch, result) else {
            return;
        };
        self.series_renderer.render_series(&series);
    }
}

/// Drives both feeds on a fixed interval.
///
/// Stopping (or dropping) the scheduler cancels the timer, and responses
/// that arrive afterwards are thrown away at apply time.
pub struct RefreshScheduler {
    inner: Arc<Inner>,
    fetch_on_start: bool,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        current_renderer: Arc<dyn CurrentValuesRenderer>,
        series_renderer: Arc<dyn SeriesRenderer>,
        builder: SeriesBuilder,
        fetch_on_start: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                current_renderer,
                series_renderer,
                builder,
                state: Mutex::new(SchedulerState::default()),
            }),
            fetch_on_start,
            ticker: Mutex::new(None),
        }
    }

    /// Begin ticking both feeds every `interval`. Restarts the timer if the
    /// scheduler is already running.
    pub fn start(&self, interval: Duration) -> Result<(), DashboardError> {
        if interval.is_zero() {
            return Err(DashboardError::InvalidInterval);
        }

        self.inner.lock_state().running = true;

        let first_tick = if self.fetch_on_start {
            Instant::now()
        } else {
            Instant::now() + interval
        };
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(first_tick, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(timer);
            while ticks.next().await.is_some() {
                inner.dispatch(Feed::Current);
                inner.dispatch(Feed::History);
            }
        });

        if let Some(previous) = self.lock_ticker().replace(handle) {
            previous.abort();
        }

        tracing::info!("Refresh scheduler started (every {:?})", interval);
        Ok(())
    }

    pub fn stop(&self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }

        let mut state = self.inner.lock_state();
        if state.running {
            state.running = false;
            state.epoch += 1;
            tracing::info!("Refresh scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_state().running
    }

    /// Fetch one feed right away, outside the timer.
    pub fn refresh_feed(&self, feed: Feed) -> Option<JoinHandle<()>> {
        self.inner.dispatch(feed)
    }

    pub fn refresh_now(&self) -> Vec<JoinHandle<()>> {
        [Feed::Current, Feed::History]
            .into_iter()
            .filter_map(|feed| self.refresh_feed(feed))
            .collect()
    }

    pub fn status(&self, feed: Feed) -> FeedStatus {
        let mut state = self.inner.lock_state();
        state.feed_mut(feed).clone()
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
