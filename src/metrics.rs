// ABOUTME: Per-route request metrics with latency and status histograms
// ABOUTME: Accumulates for the process lifetime and derives averages on demand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! # Request Metrics
//!
//! Observes every completed HTTP request independently of the AI pipeline:
//! global counter, per-path count/latency-sum/latency-max, and a per-status
//! histogram. Paths are keyed by `uri.path()` (query string never included).
//! Recording is infallible and never affects response content; latencies over
//! the slow threshold additionally log a warning.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use dashmap::DashMap;
use serde::Serialize;
use tracing::warn;

/// Latency above which a completed request logs a warning, in milliseconds
const SLOW_REQUEST_MS: f64 = 1200.0;

/// Accumulated metrics for one route
#[derive(Debug, Clone, Default)]
pub struct RouteMetric {
    /// Completed requests
    pub count: u64,
    /// Sum of latencies in milliseconds
    pub sum_ms: f64,
    /// Maximum observed latency in milliseconds
    pub max_ms: f64,
    /// Completed requests per status code
    pub status: HashMap<u16, u64>,
}

/// Read-side summary for one route, averages derived from the accumulators
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Completed requests
    pub count: u64,
    /// Mean latency in milliseconds, rounded to 2 decimals
    pub avg_ms: f64,
    /// Maximum observed latency in milliseconds, rounded to 2 decimals
    pub max_ms: f64,
    /// Completed requests per status code
    pub status: HashMap<u16, u64>,
}

/// Process-wide metrics snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Seconds since the collector was created
    pub uptime_seconds: u64,
    /// Total completed requests
    pub requests: u64,
    /// Per-route summaries
    pub routes: HashMap<String, RouteSummary>,
}

/// Per-route latency/status aggregator
pub struct RequestMetricsCollector {
    started_at: Instant,
    total_requests: AtomicU64,
    routes: DashMap<String, RouteMetric>,
}

impl RequestMetricsCollector {
    /// Create a collector; uptime counts from here
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_requests: AtomicU64::new(0),
            routes: DashMap::new(),
        }
    }

    /// Record one completed request
    pub fn record(&self, method: &str, path: &str, status: u16, latency: Duration) {
        let ms = latency.as_secs_f64() * 1000.0;
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut metric = self.routes.entry(path.to_owned()).or_default();
        metric.count += 1;
        metric.sum_ms += ms;
        metric.max_ms = metric.max_ms.max(ms);
        *metric.status.entry(status).or_insert(0) += 1;
        drop(metric);

        if ms > SLOW_REQUEST_MS {
            warn!("[slow] {method} {path} {ms:.1}ms");
        }
    }

    /// Total completed requests so far
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Snapshot of all accumulators with derived averages
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let routes = self
            .routes
            .iter()
            .map(|entry| {
                let metric = entry.value();
                let avg_ms = if metric.count == 0 {
                    0.0
                } else {
                    metric.sum_ms / metric.count as f64
                };
                (
                    entry.key().clone(),
                    RouteSummary {
                        count: metric.count,
                        avg_ms: round2(avg_ms),
                        max_ms: round2(metric.max_ms),
                        status: metric.status.clone(),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            requests: self.total_requests(),
            routes,
        }
    }
}

impl Default for RequestMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Axum middleware observing every completed request
pub async fn track_requests(
    State(metrics): State<Arc<RequestMetricsCollector>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_sum_to_requests() {
        let collector = RequestMetricsCollector::new();
        for status in [200, 200, 404, 500, 200] {
            collector.record("GET", "/api/pets", status, Duration::from_millis(10));
        }
        let snapshot = collector.snapshot();
        let route = &snapshot.routes["/api/pets"];
        assert_eq!(route.count, 5);
        assert_eq!(route.status.values().sum::<u64>(), 5);
        assert_eq!(route.status[&200], 3);
    }

    #[test]
    fn max_latency_dominates_average() {
        let collector = RequestMetricsCollector::new();
        for ms in [5_u64, 10, 100] {
            collector.record("GET", "/api/status", 200, Duration::from_millis(ms));
        }
        let snapshot = collector.snapshot();
        let route = &snapshot.routes["/api/status"];
        assert!(route.max_ms >= route.avg_ms);
        assert!(route.max_ms >= 100.0);
    }
}
