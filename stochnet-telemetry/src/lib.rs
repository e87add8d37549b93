//! # Stochnet Telemetry
//!
//! Logging setup and [`StateMonitor`](stochnet_core::monitor::StateMonitor)
//! implementations that report simulation progress.

pub mod logging;
pub mod metrics;

pub use logging::{EventLogger, TracingMonitor};
pub use metrics::MetricsRecorder;
