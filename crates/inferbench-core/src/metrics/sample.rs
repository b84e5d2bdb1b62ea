use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Classification of a single request attempt. The first matching rule wins:
/// HTTP 200 is a success, any other status is an HTTP error, then transport
/// failures are split into timeout, connection, and everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    HttpError { status: u16 },
    Timeout,
    ConnectionError,
    Other { kind: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Key used in the aggregate error-breakdown table.
    pub fn label(&self) -> String {
        match self {
            Outcome::Success => "Success".to_string(),
            Outcome::HttpError { status } => format!("HTTP_{status}"),
            Outcome::Timeout => "Timeout".to_string(),
            Outcome::ConnectionError => "ConnectionError".to_string(),
            Outcome::Other { kind } => kind.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One observed outcome of a single request attempt. Latency is wall-clock
/// round-trip time and is recorded even when the attempt failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Sample {
    pub latency_ms: f64,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn new(latency_ms: f64, outcome: Outcome) -> Self {
        Self {
            latency_ms,
            outcome,
            timestamp: Utc::now(),
        }
    }
}
