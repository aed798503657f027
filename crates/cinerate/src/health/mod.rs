//! Composite health checks and the backend error history.

pub mod aggregator;
pub mod error_log;
pub mod monitor;

pub use aggregator::HealthAggregator;
pub use error_log::ErrorHistory;
pub use monitor::HealthMonitor;
