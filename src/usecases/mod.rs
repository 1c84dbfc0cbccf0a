//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain rules with the port interfaces. Each use case
//! is a self-contained operation over the market contract.
//!
//! Use cases:
//! - `normalizer`: raw contract tuples to domain entities
//! - `MarketService`: typed read-only queries and batched market fetch
//! - `PortfolioService`: a user's positions with claim eligibility
//! - `MarketDataProvider`: TTL-cached market snapshot
//! - `TransactionBuilder` / `TransactionService`: wallet contract calls

pub mod market_cache;
pub mod market_service;
pub mod normalizer;
pub mod portfolio;
pub mod transactions;

#[cfg(test)]
pub(crate) mod fixtures;

pub use market_cache::MarketDataProvider;
pub use market_service::MarketService;
pub use portfolio::{Portfolio, PortfolioEntry, PortfolioService};
pub use transactions::{BuildError, TransactionBuilder, TransactionOutcome, TransactionService};
