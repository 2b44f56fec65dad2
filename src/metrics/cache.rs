use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RequestRecord, ResponseRecord};

// ─── Public types ────────────────────────────────────────────────

/// Both tracked sequences, oldest first.
///
/// Plain data: callers serialise access (see `MetricsTracker`). Records
/// must be appended in non-decreasing timestamp order; pruning relies on it.
#[derive(Debug, Default)]
pub struct MetricsCache {
    requests: VecDeque<RequestRecord>,
    responses: VecDeque<ResponseRecord>,
}

/// Request entry as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetric {
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

/// Response entry as shown on the dashboard. `duration` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetric {
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    pub duration: u64,
}

/// Everything still inside the retention window, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: Vec<RequestMetric>,
    pub responses: Vec<ResponseMetric>,
}

/// How many records one prune pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub requests_removed: usize,
    pub responses_removed: usize,
}

impl PruneOutcome {
    pub fn is_empty(&self) -> bool {
        self.requests_removed == 0 && self.responses_removed == 0
    }
}

// ─── MetricsCache impl ───────────────────────────────────────────

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request(&mut self, record: RequestRecord) {
        self.requests.push_back(record);
    }

    pub fn push_response(&mut self, record: ResponseRecord) {
        self.responses.push_back(record);
    }

    /// Looks up a tracked request by correlation id. On a token collision
    /// the most recent request wins.
    pub fn find_request(&self, correlation_id: &str) -> Option<&RequestRecord> {
        self.requests
            .iter()
            .rev()
            .find(|r| r.correlation_id == correlation_id)
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Drop every record older than `cutoff`. Records stamped exactly at
    /// the cutoff are kept; a sequence with nothing fresh is emptied.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> PruneOutcome {
        PruneOutcome {
            requests_removed: evict_before(&mut self.requests, cutoff, |r| r.timestamp),
            responses_removed: evict_before(&mut self.responses, cutoff, |r| r.timestamp),
        }
    }

    /// Read-only projection of the records stamped at or after `cutoff`.
    pub fn snapshot(&self, cutoff: DateTime<Utc>) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self
                .requests
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .map(|r| RequestMetric {
                    path: r.path.clone(),
                    timestamp: r.timestamp,
                })
                .collect(),
            responses: self
                .responses
                .iter()
                .filter(|r| r.timestamp >= cutoff)
                .map(|r| ResponseMetric {
                    path: r.path.clone(),
                    timestamp: r.timestamp,
                    status_code: r.status_code,
                    duration: r.duration_ms,
                })
                .collect(),
        }
    }
}

/// Remove the stale prefix of an ascending sequence, returning how many
/// records went.
fn evict_before<T>(
    records: &mut VecDeque<T>,
    cutoff: DateTime<Utc>,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> usize {
    let keep_from = records.partition_point(|r| timestamp(r) < cutoff);
    records.drain(..keep_from);
    keep_from
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::clock::millis;

    fn request(path: &str, at_ms: i64, id: &str) -> RequestRecord {
        RequestRecord {
            path: path.into(),
            timestamp: millis(at_ms),
            correlation_id: id.into(),
        }
    }

    fn response(path: &str, at_ms: i64, status_code: u16, id: &str) -> ResponseRecord {
        ResponseRecord {
            status_code,
            path: path.into(),
            timestamp: millis(at_ms),
            duration_ms: 5,
            correlation_id: id.into(),
        }
    }

    #[test]
    fn prune_drops_only_the_stale_prefix() {
        let mut cache = MetricsCache::new();
        cache.push_request(request("/a", 0, "01"));
        cache.push_request(request("/b", 1_000, "02"));
        cache.push_request(request("/c", 2_000, "03"));
        cache.push_response(response("/a", 500, 200, "01"));
        cache.push_response(response("/c", 2_500, 200, "03"));

        let outcome = cache.prune(millis(1_000));

        assert_eq!(
            outcome,
            PruneOutcome {
                requests_removed: 1,
                responses_removed: 1,
            }
        );
        let paths: Vec<_> = cache
            .snapshot(millis(0))
            .requests
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(paths, vec!["/b", "/c"]);
        assert_eq!(cache.response_count(), 1);
    }

    #[test]
    fn prune_keeps_records_exactly_at_cutoff() {
        let mut cache = MetricsCache::new();
        cache.push_request(request("/edge", 1_000, "01"));

        let outcome = cache.prune(millis(1_000));

        assert!(outcome.is_empty());
        assert_eq!(cache.request_count(), 1);
    }

    #[test]
    fn prune_empties_an_all_stale_sequence() {
        let mut cache = MetricsCache::new();
        cache.push_request(request("/old", 0, "01"));
        cache.push_request(request("/older-ish", 10, "02"));
        cache.push_response(response("/old", 5, 200, "01"));

        let outcome = cache.prune(millis(60_000));

        assert_eq!(outcome.requests_removed, 2);
        assert_eq!(outcome.responses_removed, 1);
        assert_eq!(cache.request_count(), 0);
        assert_eq!(cache.response_count(), 0);
    }

    #[test]
    fn prune_on_empty_cache_is_a_no_op() {
        let mut cache = MetricsCache::new();
        assert!(cache.prune(millis(1_000)).is_empty());
    }

    #[test]
    fn snapshot_filters_and_projects_without_mutating() {
        let mut cache = MetricsCache::new();
        cache.push_request(request("/stale", 0, "01"));
        cache.push_request(request("/fresh", 2_000, "02"));
        cache.push_response(response("/stale", 100, 500, "01"));
        cache.push_response(response("/fresh", 2_050, 201, "02"));

        let snap = cache.snapshot(millis(1_000));

        assert_eq!(
            snap.requests,
            vec![RequestMetric {
                path: "/fresh".into(),
                timestamp: millis(2_000),
            }]
        );
        assert_eq!(
            snap.responses,
            vec![ResponseMetric {
                path: "/fresh".into(),
                timestamp: millis(2_050),
                status_code: 201,
                duration: 5,
            }]
        );
        assert_eq!(cache.request_count(), 2);
        assert_eq!(cache.response_count(), 2);
    }

    #[test]
    fn find_request_prefers_the_latest_on_collision() {
        let mut cache = MetricsCache::new();
        cache.push_request(request("/first", 0, "dup"));
        cache.push_request(request("/second", 10, "dup"));

        assert_eq!(
            cache.find_request("dup").map(|r| r.path.as_str()),
            Some("/second")
        );
        assert!(cache.find_request("missing").is_none());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut cache = MetricsCache::new();
        cache.push_response(response("/queue/join", 50, 200, "01"));

        let json = serde_json::to_value(cache.snapshot(millis(0))).unwrap();

        assert_eq!(json["responses"][0]["statusCode"], 200);
        assert_eq!(json["responses"][0]["duration"], 5);
        assert_eq!(json["responses"][0]["path"], "/queue/join");
        assert!(json["requests"].as_array().unwrap().is_empty());
    }
}
