use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::http::InferenceClient;
use crate::metrics::MetricsCollector;

/// Poll the service's metrics endpoint every `poll_interval` and rewrite one
/// live console line until cancelled.
///
/// A failed poll is never fatal: the line degrades to the local collector's
/// figures with an unreachable marker and polling continues.
pub async fn run_monitor(
    client: Arc<InferenceClient>,
    collector: Arc<RwLock<MetricsCollector>>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let line = render_tick(&client, &collector).await;
                print!("\r{line}");
                let _ = std::io::stdout().flush();
            }
            _ = cancel.cancelled() => break,
        }
    }
    // Leave the last live line intact and move to a fresh line.
    println!();
}

async fn render_tick(
    client: &InferenceClient,
    collector: &Arc<RwLock<MetricsCollector>>,
) -> String {
    match client.metrics().await {
        Ok(m) => format!(
            "live: {} req | latency {:.1}ms | errors {:.1}% | {:.1} rps",
            m.total_requests, m.avg_latency_ms, m.error_rate_percentage, m.throughput_rps
        ),
        Err(err) => {
            tracing::warn!("metrics endpoint unreachable: {err}");
            let snap = collector.read().await.live_snapshot();
            format!(
                "live [metrics endpoint unreachable, local view]: {} req | latency {:.1}ms | errors {:.1}% | {:.1} rps",
                snap.total_requests, snap.avg_latency_ms, snap.error_rate_pct, snap.current_rps
            )
        }
    }
}
