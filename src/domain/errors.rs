//! Contract error codes.
//!
//! Public functions abort with `(err uN)`; these are the codes the
//! client knows how to explain.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("market not found (u1001)")]
    MarketNotFound,
    #[error("market not settled (u1003)")]
    MarketNotSettled,
    #[error("bet below minimum amount (u1007)")]
    BetTooSmall,
    #[error("invalid market parameters (u1011)")]
    InvalidMarketParams,
    #[error("not authorized (u2000)")]
    NotAuthorized,
    #[error("not token owner (u2001)")]
    NotTokenOwner,
    #[error("contract error u{0}")]
    Unknown(u128),
}

impl ContractError {
    pub const fn from_code(code: u128) -> Self {
        match code {
            1001 => Self::MarketNotFound,
            1003 => Self::MarketNotSettled,
            1007 => Self::BetTooSmall,
            1011 => Self::InvalidMarketParams,
            2000 => Self::NotAuthorized,
            2001 => Self::NotTokenOwner,
            other => Self::Unknown(other),
        }
    }

    pub const fn code(self) -> u128 {
        match self {
            Self::MarketNotFound => 1001,
            Self::MarketNotSettled => 1003,
            Self::BetTooSmall => 1007,
            Self::InvalidMarketParams => 1011,
            Self::NotAuthorized => 2000,
            Self::NotTokenOwner => 2001,
            Self::Unknown(code) => code,
        }
    }
}
