use axum::{extract::State, middleware as axum_mw, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::constants::ResultCode;
use crate::errors::{AppError, Audience};
use crate::metrics::stream;
use crate::middleware::tracking;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Metrics ─────────────────────────────────────────────
        .route("/api/metrics", get(stream::get_metrics))
        .route("/api/metrics/stream", get(stream::metrics_stream))
        .fallback(not_found)
        // ── Request/response tracking (covers the fallback too) ─
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            tracking::tracking_middleware,
        ))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn not_found(State(state): State<Arc<AppState>>) -> AppError {
    AppError::api(ResultCode::NotFound, Audience::Challenger, &state.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::load(Some("test"), None).unwrap()))
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_is_a_tracked_404() {
        let state = test_state();
        let router = create_router(state.clone());

        let resp = router.oneshot(get_req("/queue/nope")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let id = resp
            .headers()
            .get(tracking::CORRELATION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        assert_eq!(id.len(), 8);
        assert!(resp.headers().contains_key("server-timing"));

        let body = json_body(resp).await;
        assert_eq!(body["code"], 10);

        let snap = state.metrics.get_metrics();
        assert_eq!(snap.requests.len(), 1);
        assert_eq!(snap.requests[0].path, "/queue/nope");
        assert_eq!(snap.responses.len(), 1);
        assert_eq!(snap.responses[0].status_code, 404);
        assert_eq!(snap.responses[0].path, "/queue/nope");
    }

    #[tokio::test]
    async fn metrics_endpoint_reports_earlier_traffic() {
        let state = test_state();
        let router = create_router(state);

        let resp = router
            .clone()
            .oneshot(get_req("/queue/join"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = router.oneshot(get_req("/api/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;

        // The metrics call itself is tracked before its handler runs
        let paths: Vec<&str> = body["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["/queue/join", "/api/metrics"]);

        let responses = body["responses"].as_array().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["path"], "/queue/join");
        assert_eq!(responses[0]["statusCode"], 404);
        assert!(responses[0]["duration"].as_u64().is_some());
        assert!(responses[0]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn sse_stream_is_not_tracked() {
        let state = test_state();
        let router = create_router(state.clone());

        let resp = router
            .oneshot(get_req("/api/metrics/stream"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(tracking::CORRELATION_ID_HEADER).is_none());
        assert!(state.metrics.get_metrics().requests.is_empty());
    }
}
