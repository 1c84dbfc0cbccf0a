//! Market domain types.
//!
//! A market is created with a packed outcome bitmask (A=1, B=2, C=4,
//! D=8), accumulates per-outcome pools while open, and is settled once
//! by a Bitcoin block hash after its settlement burn height.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four outcome slots a market can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    A,
    B,
    C,
    D,
}

impl Outcome {
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Bitmask value used by the contract.
    pub const fn mask(self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
            Self::C => 4,
            Self::D => 8,
        }
    }

    pub const fn from_mask(mask: u64) -> Option<Self> {
        match mask {
            1 => Some(Self::A),
            2 => Some(Self::B),
            4 => Some(Self::C),
            8 => Some(Self::D),
            _ => None,
        }
    }

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    /// Public contract function that places a bet on this outcome.
    pub const fn bet_function(self) -> &'static str {
        match self {
            Self::A => "bet-outcome-a",
            Self::B => "bet-outcome-b",
            Self::C => "bet-outcome-c",
            Self::D => "bet-outcome-d",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Binary markets have at most two enabled outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Binary,
    Multi,
}

/// Packed set of enabled outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeMask(pub u8);

impl OutcomeMask {
    /// Outcomes A and B, the default for binary markets.
    pub const BINARY: Self = Self(3);

    pub const fn pack(a: bool, b: bool, c: bool, d: bool) -> Self {
        let mut mask = 0u8;
        if a {
            mask |= 1;
        }
        if b {
            mask |= 2;
        }
        if c {
            mask |= 4;
        }
        if d {
            mask |= 8;
        }
        Self(mask)
    }

    pub const fn contains(self, outcome: Outcome) -> bool {
        self.0 & outcome.mask() != 0
    }

    pub fn enabled(self) -> Vec<Outcome> {
        Outcome::ALL.into_iter().filter(|&o| self.contains(o)).collect()
    }

    /// Number of enabled flags among {1, 2, 4, 8}; higher bits are ignored.
    pub const fn count(self) -> u32 {
        (self.0 & 0x0f).count_ones()
    }

    pub const fn market_type(self) -> MarketType {
        if self.count() <= 2 {
            MarketType::Binary
        } else {
            MarketType::Multi
        }
    }
}

impl Default for OutcomeMask {
    fn default() -> Self {
        Self::BINARY
    }
}

/// Canonical market entity, normalized from the contract's tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: u64,
    pub creator: String,
    pub title: String,
    pub description: String,
    /// Burn height at or after which the market may be settled.
    pub settlement_height: u64,
    pub settlement_type: String,
    pub possible_outcomes: OutcomeMask,
    pub total_pool: u64,
    pub outcome_a_pool: u64,
    pub outcome_b_pool: u64,
    pub outcome_c_pool: u64,
    pub outcome_d_pool: u64,
    pub winning_outcome: Option<Outcome>,
    pub settled: bool,
    pub settled_at_burn_height: Option<u64>,
    pub settlement_block_hash: Option<String>,
    pub created_at_burn_height: u64,
    pub created_at_stacks_height: u64,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    /// Burn height observed when this snapshot was read.
    pub current_burn_height: u64,
}

impl Market {
    pub const fn pool(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::A => self.outcome_a_pool,
            Outcome::B => self.outcome_b_pool,
            Outcome::C => self.outcome_c_pool,
            Outcome::D => self.outcome_d_pool,
        }
    }

    /// `total_pool == sum(outcome pools)`.
    pub fn pools_consistent(&self) -> bool {
        let sum = Outcome::ALL
            .iter()
            .try_fold(0u64, |acc, &o| acc.checked_add(self.pool(o)));
        sum == Some(self.total_pool)
    }

    pub const fn is_active(&self) -> bool {
        !self.settled
    }

    pub const fn blocks_until_settlement(&self) -> u64 {
        self.settlement_height.saturating_sub(self.current_burn_height)
    }

    /// Settlement height reached and not yet settled, judged from this snapshot.
    pub const fn is_settleable(&self) -> bool {
        !self.settled && self.current_burn_height >= self.settlement_height
    }
}

/// Per-outcome odds, scaled by `ODDS_SCALE` (13_333 = 1.33x).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOdds {
    pub outcome_a_odds: u64,
    pub outcome_b_odds: u64,
    pub outcome_c_odds: u64,
    pub outcome_d_odds: u64,
    pub total_pool: u64,
}

impl MarketOdds {
    pub const fn scaled(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::A => self.outcome_a_odds,
            Outcome::B => self.outcome_b_odds,
            Outcome::C => self.outcome_c_odds,
            Outcome::D => self.outcome_d_odds,
        }
    }

    /// Payout multiplier, e.g. `1.3333`.
    pub fn multiplier(&self, outcome: Outcome) -> rust_decimal::Decimal {
        use crate::domain::constants::ODDS_SCALE;
        rust_decimal::Decimal::from(self.scaled(outcome)) / rust_decimal::Decimal::from(ODDS_SCALE)
    }
}

/// Payout breakdown in micro-STX.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialPayout {
    pub gross_payout: u64,
    pub platform_fee: u64,
    pub net_payout: u64,
}

/// Global aggregate across all markets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_markets: u64,
    /// Sum of every market's total pool.
    pub total_volume: u64,
    pub total_fees_collected: u64,
}

/// Settlement status selector for `MarketFilter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Settled,
}

/// Client-side market search criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketFilter {
    pub status: StatusFilter,
    pub creator: Option<String>,
    pub min_pool: Option<u64>,
    pub max_pool: Option<u64>,
    /// Case-insensitive substring of the title.
    pub keyword: Option<String>,
}

impl MarketFilter {
    pub fn matches(&self, market: &Market) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !market.settled,
            StatusFilter::Settled => market.settled,
        };

        status_ok
            && self.creator.as_ref().is_none_or(|c| &market.creator == c)
            && self.min_pool.is_none_or(|min| market.total_pool >= min)
            && self.max_pool.is_none_or(|max| market.total_pool <= max)
            && self.keyword.as_ref().is_none_or(|k| {
                market.title.to_lowercase().contains(&k.to_lowercase())
            })
    }
}

/// Counts and volume over a market collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatistics {
    pub total_markets: usize,
    pub active_markets: usize,
    pub settled_markets: usize,
    pub total_volume: u64,
}

impl MarketStatistics {
    pub fn from_markets(markets: &[Market]) -> Self {
        let settled = markets.iter().filter(|m| m.settled).count();
        Self {
            total_markets: markets.len(),
            active_markets: markets.len() - settled,
            settled_markets: settled,
            total_volume: markets.iter().map(|m| m.total_pool).sum(),
        }
    }
}
