//! PPL challenge-queue API.
//!
//! Service shell (config, logging, error tables, router) around the
//! request/response metrics tracker in [`metrics`].

use std::sync::Arc;

pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod util;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: config::Config,

    /// Request/response tracker; the middleware writes, `/api/metrics` reads.
    pub metrics: Arc<metrics::MetricsTracker>,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let metrics = Arc::new(metrics::MetricsTracker::new(config.metrics));
        Self { config, metrics }
    }
}
