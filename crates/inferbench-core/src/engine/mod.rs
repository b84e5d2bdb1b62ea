use serde::{Deserialize, Serialize};

pub mod monitor;
pub mod orchestrator;
pub mod worker;

pub use orchestrator::LoadTest;

/// Lifecycle state of a load-test run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No load has been generated yet.
    #[default]
    Idle,
    /// Workers are issuing paced requests.
    Running,
    /// An external interrupt was observed; workers are winding down.
    Cancelling,
    /// Load generation stopped; waiting for in-flight stragglers.
    Draining,
    /// The run finished and the final report is available.
    Completed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Cancelling => "cancelling",
            RunState::Draining => "draining",
            RunState::Completed => "completed",
        };
        write!(f, "{s}")
    }
}
