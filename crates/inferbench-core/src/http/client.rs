use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::InferbenchError;
use crate::metrics::sample::{Outcome, Sample};

// ---------------------------------------------------------------------------
// InferenceClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one inference service base URL, with builder-pattern
/// configuration and connection-pool settings. Shared by all workers so the
/// underlying connection pool is reused.
pub struct InferenceClient {
    inner: reqwest::Client,
    base_url: String,
}

/// Builder for [`InferenceClient`].
pub struct InferenceClientBuilder {
    base_url: String,
    timeout: Duration,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Duration,
    user_agent: String,
}

impl InferenceClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: format!("inferbench/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Hard per-request timeout; the transport either returns a result or a
    /// timeout failure within this bound.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.pool_max_idle_per_host = n;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn build(self) -> Result<InferenceClient, InferbenchError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent)
            .gzip(true)
            .build()?;

        Ok(InferenceClient {
            inner: client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// Live figures exposed by the service's own metrics endpoint. Fields default
/// to zero so a partially populated response still parses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerMetrics {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub avg_latency_ms: f64,
    #[serde(default)]
    pub error_rate_percentage: f64,
    #[serde(default)]
    pub throughput_rps: f64,
}

impl InferenceClient {
    pub fn builder(base_url: impl Into<String>) -> InferenceClientBuilder {
        InferenceClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one prediction request and classify the result.
    ///
    /// Never fails: transport errors become failure outcomes in the returned
    /// sample, and latency covers the full round trip including the body.
    pub async fn predict(&self, text: &str) -> Sample {
        let start = Instant::now();
        let result = self
            .inner
            .post(format!("{}/predict", self.base_url))
            .json(&PredictRequest { text })
            .send()
            .await;

        let outcome = match result {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(_) if status == 200 => Outcome::Success,
                    Ok(_) => Outcome::HttpError { status },
                    Err(err) => classify_transport_error(&err),
                }
            }
            Err(err) => classify_transport_error(&err),
        };

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        Sample::new(latency_ms, outcome)
    }

    /// Pre-flight reachability check against `/health`.
    pub async fn health(&self) -> Result<(), InferbenchError> {
        let response = self
            .inner
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| InferbenchError::ServiceUnreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(InferbenchError::ServiceUnreachable(format!(
                "health check returned HTTP {}",
                response.status().as_u16()
            )))
        }
    }

    /// Fetch the service's own live metrics.
    pub async fn metrics(&self) -> Result<ServerMetrics, InferbenchError> {
        let response = self
            .inner
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Best-effort metrics reset; returns whether the service acknowledged it.
    /// A missing endpoint is tolerated.
    pub async fn reset_metrics(&self) -> bool {
        match self
            .inner
            .post(format!("{}/reset_metrics", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Map a transport failure to its outcome classification.
fn classify_transport_error(err: &reqwest::Error) -> Outcome {
    if err.is_timeout() {
        Outcome::Timeout
    } else if err.is_connect() {
        Outcome::ConnectionError
    } else if err.is_request() {
        Outcome::Other {
            kind: "RequestError".to_string(),
        }
    } else if err.is_decode() || err.is_body() {
        Outcome::Other {
            kind: "BodyError".to_string(),
        }
    } else {
        Outcome::Other {
            kind: "UnknownError".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> InferenceClient {
        InferenceClient::builder(url)
            .build()
            .expect("client should build")
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let client = client_for("http://example.com/");
        assert_eq!(client.base_url(), "http://example.com");
    }

    #[tokio::test]
    async fn predict_200_is_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(200)
            .with_body(r#"{"status":"success","prediction":"Technology","confidence":0.93}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let sample = client.predict("Software development services").await;
        assert!(sample.outcome.is_success());
        assert!(sample.latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn predict_non_200_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let sample = client.predict("text").await;
        assert_eq!(sample.outcome, Outcome::HttpError { status: 503 });
        assert_eq!(sample.outcome.label(), "HTTP_503");
    }

    #[tokio::test]
    async fn predict_unreachable_host_is_connection_error() {
        // Port 1 is reserved and nothing listens on it.
        let client = client_for("http://127.0.0.1:1");
        let sample = client.predict("text").await;
        assert_eq!(sample.outcome, Outcome::ConnectionError);
    }

    #[tokio::test]
    async fn predict_silent_server_times_out() {
        // A listener that accepts but never responds forces the client-side
        // timeout path.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let client = InferenceClient::builder(format!("http://{addr}"))
            .timeout(Duration::from_millis(200))
            .build()
            .expect("client should build");

        let sample = client.predict("text").await;
        assert_eq!(sample.outcome, Outcome::Timeout);
        // The measured latency reflects the timeout bound, not zero.
        assert!(sample.latency_ms >= 150.0);
    }

    #[tokio::test]
    async fn health_ok_on_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(client.health().await.is_ok());
    }

    #[tokio::test]
    async fn health_fails_on_500() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(matches!(
            client.health().await,
            Err(InferbenchError::ServiceUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn health_fails_when_unreachable() {
        let client = client_for("http://127.0.0.1:1");
        assert!(matches!(
            client.health().await,
            Err(InferbenchError::ServiceUnreachable(_))
        ));
    }

    #[tokio::test]
    async fn metrics_parses_expected_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/metrics")
            .with_status(200)
            .with_body(
                r#"{"total_requests": 1200, "avg_latency_ms": 8.4,
                    "error_rate_percentage": 0.5, "throughput_rps": 96.0,
                    "p95_latency_ms": 14.2}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let metrics = client.metrics().await.expect("metrics should parse");
        assert_eq!(metrics.total_requests, 1200);
        assert!((metrics.avg_latency_ms - 8.4).abs() < 0.001);
        assert!((metrics.throughput_rps - 96.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn metrics_tolerates_missing_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/metrics")
            .with_status(200)
            .with_body(r#"{"total_requests": 3}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let metrics = client.metrics().await.expect("metrics should parse");
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.avg_latency_ms, 0.0);
    }

    #[tokio::test]
    async fn reset_metrics_true_on_200() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/reset_metrics")
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(client.reset_metrics().await);
    }

    #[tokio::test]
    async fn reset_metrics_false_on_404() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/reset_metrics")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(!client.reset_metrics().await);
    }

    #[tokio::test]
    async fn reset_metrics_false_when_unreachable() {
        let client = client_for("http://127.0.0.1:1");
        assert!(!client.reset_metrics().await);
    }
}
