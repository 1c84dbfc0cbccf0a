//! BTC Market Client - Library Root
//!
//! Market data and transaction facade for the Bitcoin-anchored
//! prediction market contract on Stacks. Re-exports all modules for
//! the daemon, integration tests and benchmarks.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
