use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::http::InferenceClient;
use crate::metrics::Sample;

/// Shared inputs for a single load-generation worker.
pub struct WorkerContext {
    /// Shared HTTP client; all workers reuse one connection pool.
    pub client: Arc<InferenceClient>,
    /// Payload rotation, indexed by the shared rotation counter.
    pub payloads: Arc<Vec<String>>,
    /// Global request counter driving exact round-robin payload selection
    /// interleaved across all workers.
    pub rotation: Arc<AtomicU64>,
    /// Channel into the collector drain loop.
    pub sample_tx: mpsc::Sender<Sample>,
    pub cancel: CancellationToken,
}

/// Issue paced requests for `duration` at `rate` requests per second.
///
/// The deadline and the cancellation token are checked at the top of each
/// iteration; an in-flight request is never aborted, so the worker may outlive
/// the deadline by up to one request timeout.
///
/// Pacing sleeps `interval - elapsed` after each request. A request slower
/// than the interval is not delayed further, and later requests do not speed
/// up to compensate.
pub async fn run_worker(worker_id: u32, ctx: WorkerContext, duration: Duration, rate: f64) {
    let deadline = Instant::now() + duration;
    let interval = Duration::from_secs_f64(1.0 / rate);

    while Instant::now() < deadline {
        if ctx.cancel.is_cancelled() {
            tracing::debug!(worker_id, "worker observed cancellation");
            return;
        }

        let started = Instant::now();
        let idx = ctx.rotation.fetch_add(1, Ordering::Relaxed) as usize;
        let text = &ctx.payloads[idx % ctx.payloads.len()];

        let sample = ctx.client.predict(text).await;

        // A closed channel means the run is tearing down.
        if ctx.sample_tx.send(sample).await.is_err() {
            return;
        }

        let elapsed = started.elapsed();
        if elapsed < interval {
            tokio::select! {
                _ = sleep(interval - elapsed) => {}
                _ = ctx.cancel.cancelled() => return,
            }
        }
    }
}
