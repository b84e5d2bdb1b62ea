use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Threshold tables
// ---------------------------------------------------------------------------

/// One row of an upper-bound table: the label applies while the metric stays
/// below `bound` (`inclusive` admits equality). Rows are evaluated in order.
struct UpperBand {
    bound: f64,
    inclusive: bool,
    label: &'static str,
}

/// One row of a lower-bound table: the label applies while the metric stays
/// strictly above `bound`. Rows are evaluated in order.
struct LowerBand {
    bound: f64,
    label: &'static str,
}

const RELIABILITY_BANDS: &[UpperBand] = &[
    UpperBand {
        bound: 0.0,
        inclusive: true,
        label: "EXCELLENT - 100% Reliability",
    },
    UpperBand {
        bound: 0.1,
        inclusive: false,
        label: "VERY GOOD - High Reliability",
    },
    UpperBand {
        bound: 1.0,
        inclusive: false,
        label: "GOOD - Production Ready",
    },
    UpperBand {
        bound: 5.0,
        inclusive: false,
        label: "ACCEPTABLE - Needs Monitoring",
    },
    UpperBand {
        bound: f64::INFINITY,
        inclusive: true,
        label: "POOR - Requires Investigation",
    },
];

const LATENCY_BANDS: &[UpperBand] = &[
    UpperBand {
        bound: 10.0,
        inclusive: false,
        label: "EXCELLENT - Sub-10ms Performance",
    },
    UpperBand {
        bound: 50.0,
        inclusive: false,
        label: "VERY GOOD - Real-time Ready",
    },
    UpperBand {
        bound: 100.0,
        inclusive: false,
        label: "GOOD - Production Suitable",
    },
    UpperBand {
        bound: 500.0,
        inclusive: false,
        label: "ACCEPTABLE - Monitor Closely",
    },
    UpperBand {
        bound: f64::INFINITY,
        inclusive: true,
        label: "POOR - Performance Issues",
    },
];

const THROUGHPUT_BANDS: &[LowerBand] = &[
    LowerBand {
        bound: 200.0,
        label: "OUTSTANDING - High Scalability",
    },
    LowerBand {
        bound: 100.0,
        label: "EXCELLENT - Good Scalability",
    },
    LowerBand {
        bound: 50.0,
        label: "GOOD - Adequate Capacity",
    },
    LowerBand {
        bound: 10.0,
        label: "LIMITED - Consider Scaling",
    },
    LowerBand {
        bound: f64::NEG_INFINITY,
        label: "POOR - Capacity Issues",
    },
];

/// One overall-verdict rule; all three bounds must admit their metric.
struct VerdictRule {
    max_error_pct: f64,
    error_inclusive: bool,
    max_avg_latency_ms: f64,
    min_rps: f64,
    label: &'static str,
}

const VERDICT_RULES: &[VerdictRule] = &[
    VerdictRule {
        max_error_pct: 0.0,
        error_inclusive: true,
        max_avg_latency_ms: 50.0,
        min_rps: 50.0,
        label: "PRODUCTION READY - Excellent Performance",
    },
    VerdictRule {
        max_error_pct: 1.0,
        error_inclusive: false,
        max_avg_latency_ms: 100.0,
        min_rps: 20.0,
        label: "PRODUCTION SUITABLE - Good Performance",
    },
    VerdictRule {
        max_error_pct: 5.0,
        error_inclusive: false,
        max_avg_latency_ms: 500.0,
        min_rps: f64::NEG_INFINITY,
        label: "ACCEPTABLE - Needs Optimization",
    },
    VerdictRule {
        max_error_pct: f64::INFINITY,
        error_inclusive: true,
        max_avg_latency_ms: f64::INFINITY,
        min_rps: f64::NEG_INFINITY,
        label: "REQUIRES IMPROVEMENT - Investigate Issues",
    },
];

fn classify_upper(bands: &[UpperBand], value: f64) -> &'static str {
    bands
        .iter()
        .find(|b| {
            if b.inclusive {
                value <= b.bound
            } else {
                value < b.bound
            }
        })
        .map(|b| b.label)
        .unwrap_or("UNRATED")
}

fn classify_lower(bands: &[LowerBand], value: f64) -> &'static str {
    bands
        .iter()
        .find(|b| value > b.bound)
        .map(|b| b.label)
        .unwrap_or("UNRATED")
}

fn overall_verdict(error_rate_pct: f64, avg_latency_ms: f64, actual_rps: f64) -> &'static str {
    VERDICT_RULES
        .iter()
        .find(|r| {
            let error_ok = if r.error_inclusive {
                error_rate_pct <= r.max_error_pct
            } else {
                error_rate_pct < r.max_error_pct
            };
            error_ok && avg_latency_ms < r.max_avg_latency_ms && actual_rps > r.min_rps
        })
        .map(|r| r.label)
        .unwrap_or("UNRATED")
}

// ---------------------------------------------------------------------------
// PerformanceAssessment
// ---------------------------------------------------------------------------

/// Human-readable tiers for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PerformanceAssessment {
    pub reliability: String,
    pub latency: String,
    pub throughput: String,
    pub overall: String,
}

/// Map the run's headline numbers onto the qualitative tier tables.
pub fn assess(error_rate_pct: f64, avg_latency_ms: f64, actual_rps: f64) -> PerformanceAssessment {
    PerformanceAssessment {
        reliability: classify_upper(RELIABILITY_BANDS, error_rate_pct).to_string(),
        latency: classify_upper(LATENCY_BANDS, avg_latency_ms).to_string(),
        throughput: classify_lower(THROUGHPUT_BANDS, actual_rps).to_string(),
        overall: overall_verdict(error_rate_pct, avg_latency_ms, actual_rps).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reliability_zero_errors_is_excellent() {
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 0.0),
            "EXCELLENT - 100% Reliability"
        );
    }

    #[test]
    fn reliability_band_boundaries() {
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 0.05),
            "VERY GOOD - High Reliability"
        );
        // Exactly 0.1 falls through to the next band.
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 0.1),
            "GOOD - Production Ready"
        );
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 3.0),
            "ACCEPTABLE - Needs Monitoring"
        );
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 5.0),
            "POOR - Requires Investigation"
        );
        assert_eq!(
            classify_upper(RELIABILITY_BANDS, 100.0),
            "POOR - Requires Investigation"
        );
    }

    #[test]
    fn latency_band_boundaries() {
        assert_eq!(
            classify_upper(LATENCY_BANDS, 9.9),
            "EXCELLENT - Sub-10ms Performance"
        );
        assert_eq!(
            classify_upper(LATENCY_BANDS, 10.0),
            "VERY GOOD - Real-time Ready"
        );
        assert_eq!(
            classify_upper(LATENCY_BANDS, 99.9),
            "GOOD - Production Suitable"
        );
        assert_eq!(
            classify_upper(LATENCY_BANDS, 499.0),
            "ACCEPTABLE - Monitor Closely"
        );
        assert_eq!(
            classify_upper(LATENCY_BANDS, 500.0),
            "POOR - Performance Issues"
        );
    }

    #[test]
    fn throughput_band_boundaries() {
        assert_eq!(
            classify_lower(THROUGHPUT_BANDS, 250.0),
            "OUTSTANDING - High Scalability"
        );
        // Exactly 200 does not clear the strict bound.
        assert_eq!(
            classify_lower(THROUGHPUT_BANDS, 200.0),
            "EXCELLENT - Good Scalability"
        );
        assert_eq!(
            classify_lower(THROUGHPUT_BANDS, 60.0),
            "GOOD - Adequate Capacity"
        );
        assert_eq!(
            classify_lower(THROUGHPUT_BANDS, 15.0),
            "LIMITED - Consider Scaling"
        );
        assert_eq!(
            classify_lower(THROUGHPUT_BANDS, 0.0),
            "POOR - Capacity Issues"
        );
    }

    #[test]
    fn overall_production_ready() {
        let a = assess(0.0, 5.0, 100.0);
        assert_eq!(a.overall, "PRODUCTION READY - Excellent Performance");
    }

    #[test]
    fn overall_production_suitable() {
        let a = assess(0.5, 80.0, 30.0);
        assert_eq!(a.overall, "PRODUCTION SUITABLE - Good Performance");
    }

    #[test]
    fn overall_acceptable_ignores_throughput() {
        let a = assess(3.0, 300.0, 0.1);
        assert_eq!(a.overall, "ACCEPTABLE - Needs Optimization");
    }

    #[test]
    fn overall_worst_tier_on_total_failure() {
        // An all-timeout run: 100% errors, latency pinned at the timeout bound.
        let a = assess(100.0, 10_000.0, 1.0);
        assert_eq!(a.overall, "REQUIRES IMPROVEMENT - Investigate Issues");
        assert_eq!(a.reliability, "POOR - Requires Investigation");
        assert_eq!(a.latency, "POOR - Performance Issues");
    }

    #[test]
    fn zero_requests_is_acceptable_not_a_panic() {
        // No requests at all: defined boundary values, not an error.
        let a = assess(0.0, 0.0, 0.0);
        assert_eq!(a.reliability, "EXCELLENT - 100% Reliability");
        assert_eq!(a.overall, "ACCEPTABLE - Needs Optimization");
    }

    #[test]
    fn assessment_serializes() {
        let a = assess(0.0, 5.0, 300.0);
        let json = serde_json::to_string(&a).expect("serialize should succeed");
        assert!(json.contains("OUTSTANDING"));
    }
}
