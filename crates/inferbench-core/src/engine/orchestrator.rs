use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::LoadTestConfig;
use crate::engine::monitor::run_monitor;
use crate::engine::worker::{run_worker, WorkerContext};
use crate::engine::RunState;
use crate::error::InferbenchError;
use crate::http::InferenceClient;
use crate::metrics::{MetricsCollector, Sample};
use crate::report::TestRunResult;

/// Owns the lifecycle of one load-test run.
///
/// A `LoadTest` is single-use: once it reaches [`RunState::Completed`] there
/// is no way back, and a fresh run needs a fresh instance.
pub struct LoadTest {
    config: LoadTestConfig,
    state: Arc<RwLock<RunState>>,
    collector: Arc<RwLock<MetricsCollector>>,
    cancel: CancellationToken,
}

impl LoadTest {
    pub fn new(config: LoadTestConfig) -> Result<Self, InferbenchError> {
        config.validate()?;
        let collector = Arc::new(RwLock::new(MetricsCollector::new(config.window_capacity)));
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(RunState::Idle)),
            collector,
            cancel: CancellationToken::new(),
        })
    }

    /// Token observed cooperatively by all workers and the monitor. Cancelling
    /// it stops the run at the next natural polling points; in-flight requests
    /// still complete.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }

    /// Shared collector, readable for live statistics while the run executes.
    pub fn collector(&self) -> Arc<RwLock<MetricsCollector>> {
        Arc::clone(&self.collector)
    }

    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Execute the whole test lifecycle and return the final report.
    ///
    /// The only fatal failure is the pre-flight reachability check; once load
    /// generation starts, every per-request failure is absorbed into the
    /// metrics and the report always renders.
    pub async fn run(&self) -> Result<TestRunResult, InferbenchError> {
        {
            let state = self.state.read().await;
            if *state != RunState::Idle {
                return Err(InferbenchError::Validation(format!(
                    "load test already ran (state: {state}); create a new instance"
                )));
            }
        }

        let client = Arc::new(
            InferenceClient::builder(self.config.base_url.as_str())
                .timeout(Duration::from_secs(self.config.request_timeout_secs))
                .build()?,
        );

        client.health().await?;
        tracing::info!("service is reachable and healthy");

        if client.reset_metrics().await {
            tracing::info!("service metrics reset");
        } else {
            tracing::warn!("could not reset service metrics (endpoint may not exist)");
        }

        let started_at = Utc::now();
        let start = Instant::now();
        self.set_state(RunState::Running).await;

        let duration = Duration::from_secs(self.config.duration_secs);
        let (sample_tx, mut sample_rx) = mpsc::channel::<Sample>(4096);
        let payloads = Arc::new(self.config.payloads.clone());
        let rotation = Arc::new(AtomicU64::new(0));

        // The monitor gets a child token so drain can stop it without
        // signalling the workers.
        let monitor_cancel = self.cancel.child_token();
        let monitor = tokio::spawn(run_monitor(
            Arc::clone(&client),
            Arc::clone(&self.collector),
            Duration::from_secs(self.config.poll_interval_secs),
            monitor_cancel.clone(),
        ));

        let mut workers: JoinSet<()> = JoinSet::new();
        for worker_id in 0..self.config.workers {
            let ctx = WorkerContext {
                client: Arc::clone(&client),
                payloads: Arc::clone(&payloads),
                rotation: Arc::clone(&rotation),
                sample_tx: sample_tx.clone(),
                cancel: self.cancel.clone(),
            };
            let rate = self.config.rate_per_worker;
            workers.spawn(async move { run_worker(worker_id, ctx, duration, rate).await });
        }
        // The channel closes once every worker drops its sender clone.
        drop(sample_tx);

        // Drain loop: the single writer into the collector, so counter and
        // window updates for one sample form one critical section.
        let mut cancelled = false;
        loop {
            tokio::select! {
                received = sample_rx.recv() => match received {
                    Some(sample) => self.collector.write().await.record(sample),
                    None => break,
                },
                _ = self.cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    self.set_state(RunState::Cancelling).await;
                    tracing::info!("cancellation requested; waiting for workers to wind down");
                }
            }
        }

        // No new requests can start; stragglers may still be joining.
        self.set_state(RunState::Draining).await;
        while workers.join_next().await.is_some() {}
        monitor_cancel.cancel();
        let _ = monitor.await;

        let finished_at = Utc::now();
        let wall = start.elapsed();
        self.set_state(RunState::Completed).await;

        let collector = self.collector.read().await;
        Ok(TestRunResult::build(started_at, finished_at, wall, &collector))
    }

    async fn set_state(&self, next: RunState) {
        let mut state = self.state.write().await;
        tracing::debug!("run state: {state} -> {next}");
        *state = next;
    }
}
