//! Contract constants mirrored client-side.
//!
//! These match the deployed prediction-market contract. Amounts are
//! in micro-STX (1 STX = 1_000_000 µSTX).

/// Micro-STX per STX.
pub const MICRO_STX_PER_STX: u64 = 1_000_000;

/// Fee charged by `create-binary-market` / `create-multi-market` (5 STX).
pub const MARKET_CREATION_FEE: u64 = 5_000_000;

/// Smallest accepted bet (1 STX).
pub const MIN_BET_AMOUNT: u64 = 1_000_000;

/// Platform fee on winnings, in basis points (3%).
pub const PLATFORM_FEE_BPS: u64 = 300;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Odds returned by `get-market-odds` are scaled by this factor.
pub const ODDS_SCALE: u64 = 10_000;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Average Bitcoin block interval used for countdowns.
pub const MINUTES_PER_BURN_BLOCK: u64 = 10;
