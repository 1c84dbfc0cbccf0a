//! User positions and statistics.
//!
//! A position is one user's stake in one market across the four
//! outcome slots. Claim eligibility and display status are derived
//! from the position together with its market, never stored.

use serde::{Deserialize, Serialize};

use super::market::{Market, Outcome};

/// A user's stake in a single market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosition {
    pub market_id: u64,
    pub outcome_a_amount: u64,
    pub outcome_b_amount: u64,
    pub outcome_c_amount: u64,
    pub outcome_d_amount: u64,
    pub total_invested: u64,
    /// Set once by a successful `claim-winnings`; never cleared.
    pub claimed: bool,
}

impl UserPosition {
    pub const fn stake(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::A => self.outcome_a_amount,
            Outcome::B => self.outcome_b_amount,
            Outcome::C => self.outcome_c_amount,
            Outcome::D => self.outcome_d_amount,
        }
    }

    /// `total_invested == sum(outcome amounts)`.
    pub fn invested_consistent(&self) -> bool {
        let sum = Outcome::ALL
            .iter()
            .try_fold(0u64, |acc, &o| acc.checked_add(self.stake(o)));
        sum == Some(self.total_invested)
    }

    /// Settled market whose winning outcome this position staked on.
    pub fn is_winner(&self, market: &Market) -> bool {
        market.settled
            && market
                .winning_outcome
                .is_some_and(|winner| self.stake(winner) > 0)
    }

    /// Whether `claim-winnings` would pay out for this position.
    pub fn can_claim(&self, market: &Market) -> bool {
        market.settled && !self.claimed && self.total_invested > 0 && self.is_winner(market)
    }

    /// Claimed takes precedence, then unsettled, then the winner check.
    pub fn status(&self, market: &Market) -> PositionStatus {
        if self.claimed {
            PositionStatus::Claimed
        } else if !market.settled {
            PositionStatus::Active
        } else if self.is_winner(market) {
            PositionStatus::Won
        } else {
            PositionStatus::Lost
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Active,
    Won,
    Lost,
    Claimed,
}

/// Per-user aggregate kept by the contract.
///
/// `total_bets_placed` is the summed stake in micro-STX, not a count
/// of bet transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub markets_created: u64,
    pub total_bets_placed: u64,
    pub total_winnings: u64,
    pub total_losses: u64,
    pub achievements: u64,
}
