//! Periodic fetch of the current metrics into a bounded history.
//!
//! Each fetch runs as its own task so stopping the poller never cancels a
//! request already on the wire. Responses that land after `stop()` (or after
//! a restart) carry a stale generation and are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::history::MetricHistory;
use super::sample::{MetricReading, MetricSample};
use crate::error::ApiError;
use crate::events::Event;
use crate::storage::kv::{get_json, set_json};
use crate::storage::KeyValueStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const HISTORY_CACHE_KEY: &str = "wellpulse.metrics.history";

const CURRENT_PATH: &str = "/metrics/current";
const EVENT_CAPACITY: usize = 64;

/// Where metric readings come from.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn current(&self) -> Result<MetricReading, ApiError>;

    /// Up to `limit` recent readings, oldest first.
    async fn history(&self, limit: usize) -> Result<Vec<MetricReading>, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum PollerStatus {
    /// No data yet and no failure yet.
    Loading,
    Ready,
    /// No data, and the last fetch failed.
    Unavailable(String),
}

struct PollState {
    history: MetricHistory,
    last_error: Option<ApiError>,
    generation: u64,
    interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

struct Inner {
    source: Arc<dyn MetricsSource>,
    store: Arc<dyn KeyValueStore>,
    state: Mutex<PollState>,
    history_tx: watch::Sender<MetricHistory>,
    events: broadcast::Sender<Event>,
}

pub struct MetricsPoller {
    inner: Arc<Inner>,
}

impl MetricsPoller {
    /// Create a stopped poller, seeding history from the cache.
    pub fn new(source: Arc<dyn MetricsSource>, store: Arc<dyn KeyValueStore>, cap: usize) -> Self {
        let seed = match get_json::<Vec<MetricSample>>(store.as_ref(), HISTORY_CACHE_KEY) {
            Ok(seed) => seed.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read cached metrics history");
                Vec::new()
            }
        };
        let history = MetricHistory::from_samples(cap, seed);
        if !history.is_empty() {
            tracing::debug!(len = history.len(), "seeded metrics history from cache");
        }
        let (history_tx, _) = watch::channel(history.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                source,
                store,
                state: Mutex::new(PollState {
                    history,
                    last_error: None,
                    generation: 0,
                    interval: DEFAULT_POLL_INTERVAL,
                    ticker: None,
                }),
                history_tx,
                events,
            }),
        }
    }

    /// Fetch now, then every `interval`. Restarts the loop if already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        let mut state = self.inner.lock();
        stop_ticker(&mut state);
        state.interval = interval;
        let generation = state.generation;

        let weak = Arc::downgrade(&self.inner);
        state.ticker = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                tokio::spawn(async move { inner.fetch(generation).await });
            }
        }));
        tracing::info!(interval_ms = interval.as_millis() as u64, "metrics polling started");
    }

    /// Stop scheduling fetches. In-flight requests finish but are ignored.
    pub fn stop(&self) {
        let mut state = self.inner.lock();
        if state.ticker.is_some() {
            tracing::info!("metrics polling stopped");
        }
        stop_ticker(&mut state);
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .ticker
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Fetch once outside the loop.
    pub async fn poll_once(&self) {
        let generation = self.inner.lock().generation;
        self.inner.fetch(generation).await;
    }

    /// Fill an empty history from the backend's recent readings.
    ///
    /// Readings are stamped backwards from now, one poll interval apart.
    /// Returns how many samples were added; zero when history already has data.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; history is left untouched.
    pub async fn backfill(&self, limit: usize) -> Result<usize, ApiError> {
        if !self.inner.lock().history.is_empty() {
            return Ok(0);
        }
        let readings = self.inner.source.history(limit).await?;
        let now = Utc::now();

        let mut state = self.inner.lock();
        if !state.history.is_empty() {
            return Ok(0);
        }
        let step = chrono::Duration::from_std(state.interval).unwrap_or(chrono::Duration::seconds(2));
        let count = readings.len();
        let mut added = 0;
        for (i, reading) in readings.into_iter().enumerate() {
            let back = i32::try_from(count - 1 - i).unwrap_or(i32::MAX);
            match reading.into_sample(now - step * back) {
                Ok(sample) => {
                    state.history.push(sample);
                    added += 1;
                }
                Err(e) => tracing::warn!(error = %e, "skipping invalid history reading"),
            }
        }
        if added > 0 {
            self.inner.persist(&state);
            self.inner.history_tx.send_replace(state.history.clone());
            let _ = self.inner.events.send(Event::MetricsUpdated {
                len: state.history.len(),
                at: now,
            });
        }
        Ok(added)
    }

    pub fn history(&self) -> MetricHistory {
        self.inner.lock().history.clone()
    }

    pub fn latest(&self) -> Option<MetricSample> {
        self.inner.lock().history.latest().copied()
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.inner.lock().last_error.clone()
    }

    pub fn status(&self) -> PollerStatus {
        let state = self.inner.lock();
        match (&state.last_error, state.history.is_empty()) {
            (_, false) => PollerStatus::Ready,
            (Some(e), true) => PollerStatus::Unavailable(e.to_string()),
            (None, true) => PollerStatus::Loading,
        }
    }

    pub fn watch(&self) -> watch::Receiver<MetricHistory> {
        self.inner.history_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }
}

impl Drop for MetricsPoller {
    fn drop(&mut self) {
        stop_ticker(&mut self.inner.lock());
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, generation: u64) {
        let result = self.source.current().await;
        let at = Utc::now();

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!("discarding metrics response from a stopped poll loop");
            return;
        }
        let result = result.and_then(|reading| {
            reading
                .into_sample(at)
                .map_err(|e| ApiError::parse(CURRENT_PATH, e))
        });

        match result {
            Ok(sample) => {
                state.history.push(sample);
                state.last_error = None;
                self.persist(&state);
                self.history_tx.send_replace(state.history.clone());
                let _ = self.events.send(Event::MetricsUpdated {
                    len: state.history.len(),
                    at,
                });
            }
            Err(e) => {
                if state.history.is_empty() {
                    tracing::warn!(error = %e, "metrics unavailable");
                } else {
                    tracing::debug!(error = %e, "metrics fetch failed, keeping history");
                }
                let _ = self.events.send(Event::MetricsFetchFailed {
                    message: e.to_string(),
                    at,
                });
                state.last_error = Some(e);
            }
        }
    }

    fn persist(&self, state: &PollState) {
        if let Err(e) = set_json(self.store.as_ref(), HISTORY_CACHE_KEY, &state.history.to_vec()) {
            tracing::warn!(error = %e, "failed to cache metrics history");
        }
    }
}

fn stop_ticker(state: &mut PollState) {
    state.generation = state.generation.wrapping_add(1);
    if let Some(handle) = state.ticker.take() {
        handle.abort();
    }
}
