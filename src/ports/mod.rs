//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits; tests
//! substitute mocks.
//!
//! Port categories:
//! - `ContractReader`: read-only contract calls and node info
//! - `WalletSession`: wallet-mediated contract-call submission
//! - `Clock`: wall-clock source for cache expiry

pub mod clock;
pub mod contract_reader;
pub mod wallet;
