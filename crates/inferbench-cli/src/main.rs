use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use inferbench_core::config::LoadTestConfig;
use inferbench_core::engine::LoadTest;

#[derive(Parser, Debug)]
#[command(name = "inferbench")]
#[command(about = "Concurrent load-testing harness for an HTTP inference service")]
struct Args {
    /// Base URL of the inference service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Test duration in seconds
    #[arg(long, default_value_t = 300)]
    duration: u64,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 25)]
    workers: u32,

    /// Target requests per second per worker
    #[arg(long, default_value_t = 4.0)]
    rate: f64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Live-monitor poll interval in seconds
    #[arg(long, default_value_t = 2)]
    poll_interval: u64,

    /// Capacity of the latency sample window
    #[arg(long, default_value_t = 1000)]
    window_capacity: usize,

    /// Write the full JSON result to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> (LoadTestConfig, Option<PathBuf>) {
        let config = LoadTestConfig {
            base_url: self.url,
            duration_secs: self.duration,
            workers: self.workers,
            rate_per_worker: self.rate,
            request_timeout_secs: self.timeout,
            poll_interval_secs: self.poll_interval,
            window_capacity: self.window_capacity,
            ..LoadTestConfig::default()
        };
        (config, self.output)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, output) = Args::parse().into_config();

    info!("target: {}", config.base_url);
    info!(
        "duration: {}s | workers: {} | rate: {}/s per worker ({} rps aggregate)",
        config.duration_secs,
        config.workers,
        config.rate_per_worker,
        config.target_rps()
    );
    info!("expected requests: ~{}", config.expected_total_requests());

    let test = LoadTest::new(config).context("invalid configuration")?;

    // Ctrl-C triggers cooperative cancellation; in-flight requests complete
    // before the final report is produced.
    let cancel = test.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling run");
            cancel.cancel();
        }
    });

    let result = test.run().await.context("load test failed")?;

    println!("{}", result.render_text());

    if let Some(path) = output {
        std::fs::write(&path, result.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("results written to {}", path.display());
    }

    Ok(())
}
