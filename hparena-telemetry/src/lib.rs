//! # hparena Telemetry
//!
//! Logging setup and Prometheus metrics for arena clients.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
