use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::AppState;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Long-lived responses that never "finish" and would skew latency.
const UNTRACKED_PATHS: &[&str] = &["/api/metrics/stream"];

/// Feeds every request through the metrics tracker and adds two headers:
///
///   X-Correlation-Id  — the id the request was tracked under
///   Server-Timing     — handler wall time in the standard format
pub async fn tracking_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if UNTRACKED_PATHS.contains(&path.as_str()) {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let correlation_id = state.metrics.track_request(&path);

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    state.metrics.track_response(status, &correlation_id);

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, val);
    }

    let server_timing =
        format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("server-timing", val);
    }

    debug!(
        %method,
        %path,
        status,
        elapsed_us = elapsed.as_micros() as u64,
        %correlation_id,
        "request handled"
    );

    response
}
