use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::cache::{MetricsCache, MetricsSnapshot, PruneOutcome};
use super::clock::{Clock, SystemClock};
use super::{MetricsConfig, RequestRecord, ResponseRecord};
use crate::util::generate_hex;

/// Thread-safe request/response tracker.
///
/// The request-handling layer calls `track_request()` on the way in and
/// `track_response()` with the returned correlation id on the way out;
/// the dashboard reads `get_metrics()`. A background task started by
/// `init()` prunes anything older than the retention window.
///
/// Every read and write goes through the one cache lock.
pub struct MetricsTracker {
    cache: Mutex<MetricsCache>,
    clock: Arc<dyn Clock>,
    config: MetricsConfig,
    prune_task: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("metrics prune task is already running")]
    AlreadyInitialized,
    #[error("prune interval must be non-zero")]
    ZeroPruneInterval,
}

// ─── MetricsTracker impl ─────────────────────────────────────────

impl MetricsTracker {
    pub fn new(config: MetricsConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MetricsConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: Mutex::new(MetricsCache::new()),
            clock,
            config,
            prune_task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Start the periodic prune task. Must be called from inside a tokio
    /// runtime, once; call `close()` first to restart it.
    pub fn init(self: &Arc<Self>) -> Result<(), TrackerError> {
        if self.config.prune_interval.is_zero() {
            return Err(TrackerError::ZeroPruneInterval);
        }

        let mut task = self.prune_task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("metrics tracker init() called twice, ignoring");
            return Err(TrackerError::AlreadyInitialized);
        }

        *task = Some(tokio::spawn(prune_loop(
            Arc::downgrade(self),
            self.config.prune_interval,
        )));

        info!(
            retention_secs = self.config.retention_window.as_secs(),
            prune_interval_secs = self.config.prune_interval.as_secs(),
            "metrics tracker initialized"
        );
        Ok(())
    }

    /// Stop the prune task. Safe to call more than once.
    pub fn close(&self) {
        if let Some(handle) = self.prune_task.lock().take() {
            handle.abort();
            debug!("metrics prune task stopped");
        }
    }

    /// Record an inbound request; the returned id must be handed to
    /// `track_response()` for the same request.
    pub fn track_request(&self, path: &str) -> String {
        let correlation_id = generate_hex(self.config.correlation_id_bytes);

        // Stamp under the lock so insertion order matches timestamp order
        let mut cache = self.cache.lock();
        let timestamp = self.clock.now();
        cache.push_request(RequestRecord {
            path: path.to_owned(),
            timestamp,
            correlation_id: correlation_id.clone(),
        });

        correlation_id
    }

    /// Record the response for a previously tracked request. Unknown or
    /// already-pruned ids are logged and dropped.
    pub fn track_response(&self, status_code: u16, correlation_id: &str) {
        let mut cache = self.cache.lock();
        let timestamp = self.clock.now();

        let Some(request) = cache.find_request(correlation_id) else {
            warn!(
                %correlation_id,
                status_code,
                "track_response() with unknown correlation id, discarding metrics"
            );
            return;
        };

        let duration_ms = (timestamp - request.timestamp).num_milliseconds().max(0) as u64;
        let path = request.path.clone();

        cache.push_response(ResponseRecord {
            status_code,
            path,
            timestamp,
            duration_ms,
            correlation_id: correlation_id.to_owned(),
        });
    }

    /// Everything tracked within the retention window.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let cache = self.cache.lock();
        cache.snapshot(self.cutoff(self.clock.now()))
    }

    /// One prune pass. Normally driven by the task `init()` starts.
    pub(crate) fn prune_cache(&self) -> PruneOutcome {
        let mut cache = self.cache.lock();
        let outcome = cache.prune(self.cutoff(self.clock.now()));

        if !outcome.is_empty() {
            debug!(
                requests_removed = outcome.requests_removed,
                responses_removed = outcome.responses_removed,
                requests_kept = cache.request_count(),
                responses_kept = cache.response_count(),
                "pruned metrics cache"
            );
        }
        outcome
    }

    /// Oldest timestamp still inside the retention window.
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.config.retention_window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Drop for MetricsTracker {
    fn drop(&mut self) {
        self.close();
    }
}

/// Runs `prune_cache()` every `period` until the tracker is dropped or
/// the task is aborted.
async fn prune_loop(tracker: Weak<MetricsTracker>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(tracker) = tracker.upgrade() else {
            break;
        };
        tracker.prune_cache();
    }
}
