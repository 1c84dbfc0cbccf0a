//! Metrics and Monitoring Adapters
//!
//! Prometheus registry for read-path, cache and wallet metrics, plus
//! the axum server exposing /metrics, /live and /ready.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
