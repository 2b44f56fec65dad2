pub mod cache;
pub mod clock;
pub mod stream;
pub mod tracker;

use std::time::Duration;

use chrono::{DateTime, Utc};

pub use cache::{MetricsCache, MetricsSnapshot, PruneOutcome, RequestMetric, ResponseMetric};
pub use clock::{Clock, SystemClock};
pub use tracker::{MetricsTracker, TrackerError};

// ─── Defaults ────────────────────────────────────────────────────

/// How long tracked requests/responses stay visible (5 minutes).
pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Cadence of the background prune task.
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Random bytes per correlation id (4 bytes → 8 hex characters).
pub const DEFAULT_CORRELATION_ID_BYTES: usize = 4;

/// Tunables for [`MetricsTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    pub retention_window: Duration,
    pub prune_interval: Duration,
    pub correlation_id_bytes: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            retention_window: DEFAULT_RETENTION_WINDOW,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
            correlation_id_bytes: DEFAULT_CORRELATION_ID_BYTES,
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────

/// An inbound request, stored until it ages out of the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: String,
}

/// A response matched to its request. `path` is copied from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub status_code: u16,
    pub path: String,
    pub timestamp: DateTime<Utc>,
    /// Milliseconds between the request and this response
    pub duration_ms: u64,
    pub correlation_id: String,
}
