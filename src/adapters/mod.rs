//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies. Each sub-module groups adapters by
//! infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Stacks node read-only call client (Hiro API)
//! - `metrics`: Prometheus metrics export and health checks

pub mod api;
pub mod metrics;
