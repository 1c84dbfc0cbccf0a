//! Portfolio Use Case - Positions Across Every Market
//!
//! Cross-references one user's positions against the market list and
//! derives claim eligibility and display status per position.
//!
//! Portfolio flow:
//! 1. Fetch all markets (or take a cached snapshot)
//! 2. Read the user's position in each market concurrently
//! 3. Keep positions with a nonzero stake
//! 4. Derive status and claimability from position + market

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, instrument};

use super::market_service::MarketService;
use crate::domain::{Market, PositionStatus, UserPosition};
use crate::ports::contract_reader::ContractReader;

/// A user's position together with the market it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
  pub position: UserPosition,
  pub market: Market,
  pub can_claim: bool,
  pub is_winner: bool,
  pub status: PositionStatus,
}

impl PortfolioEntry {
  pub fn new(position: UserPosition, market: Market) -> Self {
    Self {
      can_claim: position.can_claim(&market),
      is_winner: position.is_winner(&market),
      status: position.status(&market),
      position,
      market,
    }
  }
}

/// All of a user's positions plus totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
  pub entries: Vec<PortfolioEntry>,
  /// Sum of `total_invested` across entries, in micro-STX.
  pub total_invested: u64,
  pub active: usize,
  pub won: usize,
  pub lost: usize,
  pub claimed: usize,
  /// Entries where `claim-winnings` would pay out now.
  pub claimable: usize,
}

impl Portfolio {
  pub fn from_entries(entries: Vec<PortfolioEntry>) -> Self {
    let count = |status| entries.iter().filter(|e| e.status == status).count();
    Self {
      total_invested: entries.iter().map(|e| e.position.total_invested).sum(),
      active: count(PositionStatus::Active),
      won: count(PositionStatus::Won),
      lost: count(PositionStatus::Lost),
      claimed: count(PositionStatus::Claimed),
      claimable: entries.iter().filter(|e| e.can_claim).count(),
      entries,
    }
  }
}

/// Position aggregation for a single address.
pub struct PortfolioService<R: ContractReader> {
  markets: Arc<MarketService<R>>,
}

impl<R: ContractReader> PortfolioService<R> {
  pub fn new(markets: Arc<MarketService<R>>) -> Self {
    Self { markets }
  }

  /// Positions with a nonzero stake across every market, in market order.
  pub async fn user_positions(&self, address: &str) -> Vec<PortfolioEntry> {
    let markets = self.markets.fetch_markets().await;
    self.positions_in(&markets, address).await
  }

  /// Positions with a nonzero stake in the given markets.
  pub async fn positions_in(&self, markets: &[Market], address: &str) -> Vec<PortfolioEntry> {
    let reads = markets.iter().map(|market| async move {
      let position = self.markets.user_position(market.id, address).await?;
      (position.total_invested > 0).then(|| PortfolioEntry::new(position, market.clone()))
    });
    join_all(reads).await.into_iter().flatten().collect()
  }

  /// Whether `address` can claim winnings from market `market_id` right now.
  pub async fn can_claim_winnings(&self, market_id: u64, address: &str) -> bool {
    let (market, position) = tokio::join!(
      self.markets.fetch_market(market_id),
      self.markets.user_position(market_id, address)
    );
    match (market, position) {
      (Some(market), Some(position)) => position.can_claim(&market),
      _ => false,
    }
  }

  /// Full portfolio over freshly fetched markets.
  #[instrument(skip(self))]
  pub async fn portfolio(&self, address: &str) -> Portfolio {
    let portfolio = Portfolio::from_entries(self.user_positions(address).await);
    info!(
      positions = portfolio.entries.len(),
      claimable = portfolio.claimable,
      total_invested = portfolio.total_invested,
      "Portfolio built"
    );
    portfolio
  }

  /// Portfolio over an existing market snapshot.
  pub async fn portfolio_in(&self, markets: &[Market], address: &str) -> Portfolio {
    Portfolio::from_entries(self.positions_in(markets, address).await)
  }
}
