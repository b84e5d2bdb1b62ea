use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::sample::Sample;
use crate::metrics::stats::{self, P95_MIN_SAMPLES};
use crate::metrics::window::SampleWindow;

// ---------------------------------------------------------------------------
// AggregateCounters
// ---------------------------------------------------------------------------

/// Process-wide totals, independent of the bounded window. Counters are
/// monotonic within a run; `total_requests == successful_requests +
/// failed_requests` holds after every record operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AggregateCounters {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Failure counts keyed by outcome label; keys appear on first occurrence.
    pub error_breakdown: BTreeMap<String, u64>,
}

// ---------------------------------------------------------------------------
// LiveSnapshot
// ---------------------------------------------------------------------------

/// Cheap point-in-time figures for the live monitor line. Latency figures
/// come from the bounded window, totals from the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LiveSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub error_rate_pct: f64,
    pub current_rps: f64,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// The single mutable shared-state structure of a run.
///
/// Designed to be held behind an `Arc<RwLock<_>>` so the drain loop can write
/// while the monitor and the final report read. `record` updates the counters,
/// the error breakdown, and the window together, so any reader holding the
/// lock observes the pair atomically.
pub struct MetricsCollector {
    counters: AggregateCounters,
    window: SampleWindow,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl MetricsCollector {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            counters: AggregateCounters::default(),
            window: SampleWindow::new(window_capacity),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record one completed request attempt.
    pub fn record(&mut self, sample: Sample) {
        self.counters.total_requests += 1;
        if sample.outcome.is_success() {
            self.counters.successful_requests += 1;
        } else {
            self.counters.failed_requests += 1;
            *self
                .counters
                .error_breakdown
                .entry(sample.outcome.label())
                .or_insert(0) += 1;
        }
        self.window.record(sample);
    }

    pub fn counters(&self) -> &AggregateCounters {
        &self.counters
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Requests per second averaged over the elapsed collection time.
    pub fn current_rps(&self) -> f64 {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        if elapsed_secs < 0.001 {
            return 0.0;
        }
        self.counters.total_requests as f64 / elapsed_secs
    }

    pub fn live_snapshot(&self) -> LiveSnapshot {
        let total = self.counters.total_requests;
        let error_rate_pct = if total > 0 {
            self.counters.failed_requests as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut sorted = self.window.latencies();
        sorted.sort_by(|a, b| a.total_cmp(b));

        LiveSnapshot {
            total_requests: total,
            successful_requests: self.counters.successful_requests,
            failed_requests: self.counters.failed_requests,
            avg_latency_ms: stats::mean_of(&sorted),
            p95_latency_ms: stats::percentile_or_median(&sorted, 0.95, P95_MIN_SAMPLES),
            error_rate_pct,
            current_rps: self.current_rps(),
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
        }
    }
}
