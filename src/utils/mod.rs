//! # Utility Modules
//!
//! Supporting utilities shared by the client and the binary.
//!
//! ## Components
//! - **Logging**: `tracing-subscriber` initialisation from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: thread-safe counters for connections, packets and dispatched commands

pub mod logging;
pub mod metrics;

pub use metrics::{ClientMetrics, MetricsSnapshot};
