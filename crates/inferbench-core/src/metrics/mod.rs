pub mod collector;
pub mod sample;
pub mod stats;
pub mod tiers;
pub mod window;

pub use collector::{AggregateCounters, LiveSnapshot, MetricsCollector};
pub use sample::{Outcome, Sample};
pub use stats::LatencySummary;
pub use tiers::PerformanceAssessment;
pub use window::SampleWindow;
