//! Domain layer - Core entities and rules of the prediction market.
//!
//! Pure types and functions only: markets, positions, statistics,
//! outcome bitmasks, claim eligibility and display formatting.
//! Nothing here performs I/O (hexagonal architecture inner ring).

pub mod constants;
pub mod errors;
pub mod format;
pub mod market;
pub mod position;

// Re-export core types for convenience
pub use errors::ContractError;
pub use market::{
    Market, MarketFilter, MarketOdds, MarketStatistics, MarketType, Outcome, OutcomeMask,
    PlatformStats, PotentialPayout, StatusFilter,
};
pub use position::{PositionStatus, UserPosition, UserStats};
