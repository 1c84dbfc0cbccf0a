//! Stacks Node API Adapter
//!
//! Implements the `ContractReader` port over the Hiro read-only call
//! endpoint.
//!
//! Sub-modules:
//! - `client`: HTTP client with a concurrency limit and call metrics
//! - `types`: API request/response type definitions

pub mod client;
pub mod types;

pub use client::{HiroClient, HiroClientConfig};
