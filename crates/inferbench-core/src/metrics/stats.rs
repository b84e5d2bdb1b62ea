use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Percentile sample minimums
// ---------------------------------------------------------------------------

/// Minimum sample counts for a stable tail estimate. Below these the
/// percentile degrades to the median instead of reporting a noisy
/// single-sample value.
pub const P75_MIN_SAMPLES: usize = 4;
pub const P90_MIN_SAMPLES: usize = 10;
pub const P95_MIN_SAMPLES: usize = 20;
pub const P99_MIN_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// LatencySummary
// ---------------------------------------------------------------------------

/// Full latency statistics derived from one window snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencySummary {
    pub avg_ms: f64,
    pub p50_ms: f64,
    pub p75_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
}

/// Compute the full summary over a set of latencies. Returns `None` when no
/// samples were recorded.
pub fn summarize(latencies: &[f64]) -> Option<LatencySummary> {
    if latencies.is_empty() {
        return None;
    }
    let mut sorted = latencies.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let avg = mean_of(&sorted);
    Some(LatencySummary {
        avg_ms: avg,
        p50_ms: median_of(&sorted),
        p75_ms: percentile_or_median(&sorted, 0.75, P75_MIN_SAMPLES),
        p90_ms: percentile_or_median(&sorted, 0.90, P90_MIN_SAMPLES),
        p95_ms: percentile_or_median(&sorted, 0.95, P95_MIN_SAMPLES),
        p99_ms: percentile_or_median(&sorted, 0.99, P99_MIN_SAMPLES),
        min_ms: sorted[0],
        max_ms: sorted[sorted.len() - 1],
        std_dev_ms: sample_std_dev(&sorted, avg),
    })
}

/// Percentile at index `floor(p * n)` over `sorted` (ascending), clamped to
/// the last element. Falls back to the median below `min_samples`. Returns 0
/// for an empty slice.
pub fn percentile_or_median(sorted: &[f64], p: f64, min_samples: usize) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() < min_samples {
        return median_of(sorted);
    }
    let idx = ((p * sorted.len() as f64) as usize).min(sorted.len() - 1);
    sorted[idx]
}

pub(crate) fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median over a sorted slice; even lengths average the two middle values.
fn median_of(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Sample standard deviation (n − 1 divisor); 0 with fewer than two values.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
