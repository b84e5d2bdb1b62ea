use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InferbenchError;
use crate::metrics::collector::AggregateCounters;
use crate::metrics::stats::{self, LatencySummary};
use crate::metrics::tiers::{self, PerformanceAssessment};
use crate::metrics::MetricsCollector;

// ---------------------------------------------------------------------------
// Derived summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ThroughputSummary {
    pub actual_rps: f64,
    pub success_rps: f64,
    /// Wall-clock duration of the whole run as measured by the orchestrator.
    pub duration_secs: f64,
}

impl ThroughputSummary {
    pub fn from_counters(counters: &AggregateCounters, wall: Duration) -> Self {
        let duration_secs = wall.as_secs_f64();
        if duration_secs <= 0.0 {
            return Self {
                actual_rps: 0.0,
                success_rps: 0.0,
                duration_secs,
            };
        }
        Self {
            actual_rps: counters.total_requests as f64 / duration_secs,
            success_rps: counters.successful_requests as f64 / duration_secs,
            duration_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReliabilitySummary {
    pub error_rate_pct: f64,
    pub success_rate_pct: f64,
    pub availability_pct: f64,
}

impl ReliabilitySummary {
    /// Rates are defined at the zero-request boundary instead of erroring:
    /// 0% error, 0% success, 100% availability.
    pub fn from_counters(counters: &AggregateCounters) -> Self {
        if counters.total_requests == 0 {
            return Self {
                error_rate_pct: 0.0,
                success_rate_pct: 0.0,
                availability_pct: 100.0,
            };
        }
        let total = counters.total_requests as f64;
        let error_rate_pct = counters.failed_requests as f64 / total * 100.0;
        Self {
            error_rate_pct,
            success_rate_pct: counters.successful_requests as f64 / total * 100.0,
            availability_pct: 100.0 - error_rate_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// TestRunResult
// ---------------------------------------------------------------------------

/// Complete results of a finished run. Immutable once built; serializable as
/// a single JSON document with ISO-8601 timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestRunResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counters: AggregateCounters,
    /// `None` when no request attempts were recorded.
    pub latency: Option<LatencySummary>,
    pub throughput: ThroughputSummary,
    pub reliability: ReliabilitySummary,
    pub assessment: PerformanceAssessment,
}

impl TestRunResult {
    pub fn build(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        wall: Duration,
        collector: &MetricsCollector,
    ) -> Self {
        let counters = collector.counters().clone();
        let latency = stats::summarize(&collector.window().latencies());
        let throughput = ThroughputSummary::from_counters(&counters, wall);
        let reliability = ReliabilitySummary::from_counters(&counters);
        let avg_latency_ms = latency.as_ref().map(|l| l.avg_ms).unwrap_or(0.0);
        let assessment = tiers::assess(
            reliability.error_rate_pct,
            avg_latency_ms,
            throughput.actual_rps,
        );

        Self {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at,
            counters,
            latency,
            throughput,
            reliability,
            assessment,
        }
    }

    pub fn to_json(&self) -> Result<String, InferbenchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the final console report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", "=".repeat(62)));
        out.push_str("LOAD TEST REPORT\n");
        out.push_str(&format!("{}\n", "=".repeat(62)));

        out.push_str("\nTest window\n");
        out.push_str(&format!(
            "  started:  {}\n",
            self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        out.push_str(&format!(
            "  finished: {}\n",
            self.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
        out.push_str(&format!(
            "  duration: {:.2}s\n",
            self.throughput.duration_secs
        ));

        out.push_str("\nThroughput\n");
        out.push_str(&format!(
            "  total requests: {}\n",
            self.counters.total_requests
        ));
        out.push_str(&format!(
            "  successful:     {}\n",
            self.counters.successful_requests
        ));
        out.push_str(&format!(
            "  failed:         {}\n",
            self.counters.failed_requests
        ));
        out.push_str(&format!(
            "  actual rps:     {:.2}\n",
            self.throughput.actual_rps
        ));
        out.push_str(&format!(
            "  success rps:    {:.2}\n",
            self.throughput.success_rps
        ));

        out.push_str("\nReliability\n");
        out.push_str(&format!(
            "  success rate: {:.3}%\n",
            self.reliability.success_rate_pct
        ));
        out.push_str(&format!(
            "  error rate:   {:.3}%\n",
            self.reliability.error_rate_pct
        ));
        out.push_str(&format!(
            "  availability: {:.3}%\n",
            self.reliability.availability_pct
        ));
        if !self.counters.error_breakdown.is_empty() {
            out.push_str("  error breakdown:\n");
            for (kind, count) in &self.counters.error_breakdown {
                let pct = *count as f64 / self.counters.total_requests as f64 * 100.0;
                out.push_str(&format!("    - {kind}: {count} ({pct:.2}%)\n"));
            }
        }

        out.push_str("\nLatency (ms)\n");
        match &self.latency {
            Some(l) => {
                out.push_str(&format!("  average: {:.2}\n", l.avg_ms));
                out.push_str(&format!("  p50:     {:.2}\n", l.p50_ms));
                out.push_str(&format!("  p75:     {:.2}\n", l.p75_ms));
                out.push_str(&format!("  p90:     {:.2}\n", l.p90_ms));
                out.push_str(&format!("  p95:     {:.2}\n", l.p95_ms));
                out.push_str(&format!("  p99:     {:.2}\n", l.p99_ms));
                out.push_str(&format!("  min:     {:.2}\n", l.min_ms));
                out.push_str(&format!("  max:     {:.2}\n", l.max_ms));
                out.push_str(&format!("  std dev: {:.2}\n", l.std_dev_ms));
            }
            None => {
                out.push_str("  no samples recorded\n");
            }
        }

        out.push_str("\nAssessment\n");
        out.push_str(&format!("  reliability: {}\n", self.assessment.reliability));
        out.push_str(&format!("  latency:     {}\n", self.assessment.latency));
        out.push_str(&format!("  throughput:  {}\n", self.assessment.throughput));
        out.push_str(&format!("\n  overall: {}\n", self.assessment.overall));

        out
    }
}
