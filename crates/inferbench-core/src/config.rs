use serde::{Deserialize, Serialize};

use crate::error::InferbenchError;

/// Default payload rotation: short industry descriptions matching the text
/// classification service the harness was built to exercise.
pub const DEFAULT_PAYLOAD_TEXTS: &[&str] = &[
    "Software development and cloud computing services for businesses",
    "Banking and investment services for retail customers",
    "Hospital and healthcare services with emergency care",
    "Car manufacturing and automotive parts supplier",
    "Online retail store with fast delivery",
    "Law firm specializing in corporate law",
    "Movie production company and streaming service",
    "Insurance company providing life and health coverage",
    "University offering undergraduate and graduate programs",
    "Telecommunications provider with 5G network",
];

// ---------------------------------------------------------------------------
// LoadTestConfig
// ---------------------------------------------------------------------------

/// Configuration for a single load-test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadTestConfig {
    /// Base URL of the inference service (scheme + host + port).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Wall-clock test duration in seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// Number of concurrent load-generation workers.
    #[serde(default = "default_workers")]
    pub workers: u32,
    /// Target request rate per worker, requests per second.
    #[serde(default = "default_rate_per_worker")]
    pub rate_per_worker: f64,
    /// Hard per-request timeout in seconds, enforced by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Interval between live-monitor polls in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Capacity of the bounded latency sample window.
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    /// Payload texts cycled across all workers in global round-robin order.
    #[serde(default = "default_payloads")]
    pub payloads: Vec<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_duration_secs() -> u64 {
    300
}

fn default_workers() -> u32 {
    25
}

fn default_rate_per_worker() -> f64 {
    4.0
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_window_capacity() -> usize {
    1000
}

fn default_payloads() -> Vec<String> {
    DEFAULT_PAYLOAD_TEXTS.iter().map(|s| s.to_string()).collect()
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            duration_secs: default_duration_secs(),
            workers: default_workers(),
            rate_per_worker: default_rate_per_worker(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            window_capacity: default_window_capacity(),
            payloads: default_payloads(),
        }
    }
}

impl LoadTestConfig {
    /// Aggregate target request rate across all workers.
    pub fn target_rps(&self) -> f64 {
        self.workers as f64 * self.rate_per_worker
    }

    /// Number of requests a perfectly paced run would issue.
    pub fn expected_total_requests(&self) -> u64 {
        (self.duration_secs as f64 * self.target_rps()) as u64
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), InferbenchError> {
        if self.base_url.is_empty() {
            return Err(InferbenchError::Validation(
                "base_url must not be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(InferbenchError::Validation(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.duration_secs == 0 {
            return Err(InferbenchError::Validation(
                "duration_secs must be greater than zero".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(InferbenchError::Validation(
                "workers must be greater than zero".to_string(),
            ));
        }
        if !self.rate_per_worker.is_finite() || self.rate_per_worker <= 0.0 {
            return Err(InferbenchError::Validation(
                "rate_per_worker must be a positive finite number".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(InferbenchError::Validation(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(InferbenchError::Validation(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.window_capacity == 0 {
            return Err(InferbenchError::Validation(
                "window_capacity must be greater than zero".to_string(),
            ));
        }
        if self.payloads.is_empty() {
            return Err(InferbenchError::Validation(
                "payloads must contain at least one entry".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LoadTestConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_values_match_documented_defaults() {
        let config = LoadTestConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.duration_secs, 300);
        assert_eq!(config.workers, 25);
        assert_eq!(config.rate_per_worker, 4.0);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.window_capacity, 1000);
        assert_eq!(config.payloads.len(), 10);
    }

    #[test]
    fn target_rps_is_workers_times_rate() {
        let config = LoadTestConfig {
            workers: 5,
            rate_per_worker: 2.0,
            ..Default::default()
        };
        assert_eq!(config.target_rps(), 10.0);
    }

    #[test]
    fn expected_total_requests_scales_with_duration() {
        let config = LoadTestConfig {
            duration_secs: 10,
            workers: 5,
            rate_per_worker: 2.0,
            ..Default::default()
        };
        assert_eq!(config.expected_total_requests(), 100);
    }

    #[test]
    fn rejects_empty_base_url() {
        let config = LoadTestConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InferbenchError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = LoadTestConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_duration() {
        let config = LoadTestConfig {
            duration_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_workers() {
        let config = LoadTestConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_rate() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = LoadTestConfig {
                rate_per_worker: rate,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "rate {rate} should be rejected");
        }
    }

    #[test]
    fn rejects_zero_window_capacity() {
        let config = LoadTestConfig {
            window_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_payloads() {
        let config = LoadTestConfig {
            payloads: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: LoadTestConfig = serde_json::from_str("{}").expect("should parse");
        assert_eq!(config.duration_secs, 300);
        assert_eq!(config.workers, 25);
        assert!(!config.payloads.is_empty());
    }

    #[test]
    fn deserialize_overrides_selected_fields() {
        let config: LoadTestConfig =
            serde_json::from_str(r#"{"duration_secs": 60, "workers": 4}"#).expect("should parse");
        assert_eq!(config.duration_secs, 60);
        assert_eq!(config.workers, 4);
        assert_eq!(config.rate_per_worker, 4.0);
    }
}
