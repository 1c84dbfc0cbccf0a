//! Market Service - Read-only Contract Queries with Safe Defaults
//!
//! Wraps a `ContractReader` with the typed queries the client needs.
//! A failed read never propagates: counts fall back to zero, lookups
//! to `None` and collections to empty. The reader adapter logs and
//! counts each failure.
//!
//! Markets are fetched in sequential batches of concurrent reads so
//! fan-out stays bounded and results come back in id order.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::normalizer::{
  normalize_market, normalize_odds, normalize_payout, normalize_position, normalize_stats,
  normalize_uint,
};
use crate::codec::ClarityValue;
use crate::domain::{
  ContractError, Market, MarketOdds, Outcome, PlatformStats, PotentialPayout, UserPosition,
  UserStats,
};
use crate::ports::contract_reader::ContractReader;

/// Markets fetched concurrently per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Typed read-only queries against the market contract.
pub struct MarketService<R: ContractReader> {
  reader: Arc<R>,
  batch_size: usize,
}

impl<R: ContractReader> MarketService<R> {
  pub fn new(reader: Arc<R>) -> Self {
    Self::with_batch_size(reader, DEFAULT_BATCH_SIZE)
  }

  /// A zero batch size is treated as 1.
  pub fn with_batch_size(reader: Arc<R>, batch_size: usize) -> Self {
    Self {
      reader,
      batch_size: batch_size.max(1),
    }
  }

  pub fn reader(&self) -> &R {
    &self.reader
  }

  /// Call `function`, mapping any failure to `None`.
  async fn read(&self, function: &str, args: &[ClarityValue]) -> Option<ClarityValue> {
    match self.reader.call_read_only(function, args).await {
      Ok(value) => {
        if let ClarityValue::ResponseErr(inner) = &value {
          if let Some(code) = inner.as_u128_lossy() {
            debug!(function, error = %ContractError::from_code(code), "Contract returned err");
          }
        }
        Some(value)
      }
      Err(e) => {
        debug!(function, error = %e, "Read failed, using default");
        None
      }
    }
  }

  /// Number of markets ever created. Ids run `0..count`.
  pub async fn market_count(&self) -> u64 {
    self.try_market_count().await.unwrap_or(0)
  }

  /// Market count, or `None` when the contract could not be read.
  pub async fn try_market_count(&self) -> Option<u64> {
    self
      .read("get-market-count", &[])
      .await
      .map(|v| normalize_uint(&v))
  }

  /// Bitcoin burn height: contract first, then the node, then 0.
  pub async fn current_burn_height(&self) -> u64 {
    if let Some(height) = self
      .read("get-current-burn-height", &[])
      .await
      .and_then(|v| v.as_u128_lossy())
      .and_then(|v| u64::try_from(v).ok())
    {
      return height;
    }

    match self.reader.node_burn_height().await {
      Ok(height) => height,
      Err(e) => {
        warn!(error = %e, "Burn height unavailable from contract and node");
        0
      }
    }
  }

  async fn fetch_market_at(&self, id: u64, current_burn_height: u64) -> Option<Market> {
    let raw = self.read("get-market", &[ClarityValue::uint(u128::from(id))]).await?;
    normalize_market(id, &raw, current_burn_height)
  }

  /// One market, stamped with the current burn height.
  #[instrument(skip(self))]
  pub async fn fetch_market(&self, id: u64) -> Option<Market> {
    let height = self.current_burn_height().await;
    self.fetch_market_at(id, height).await
  }

  /// All markets in id order; ids that fail to read are skipped.
  ///
  /// The burn height is read once and shared by every market in the
  /// result.
  pub async fn fetch_markets(&self) -> Vec<Market> {
    self.try_fetch_markets().await.unwrap_or_default()
  }

  /// Like `fetch_markets`, but `None` when the market count itself
  /// could not be read, so an unreachable contract is not mistaken
  /// for an empty one.
  #[instrument(skip(self))]
  pub async fn try_fetch_markets(&self) -> Option<Vec<Market>> {
    let count = self.try_market_count().await?;
    if count == 0 {
      return Some(Vec::new());
    }

    let height = self.current_burn_height().await;
    let batch = self.batch_size as u64;
    let mut markets = Vec::new();

    let mut start = 0;
    while start < count {
      let end = start.saturating_add(batch).min(count);
      let results = join_all((start..end).map(|id| self.fetch_market_at(id, height))).await;
      markets.extend(results.into_iter().flatten());
      start = end;
    }

    info!(count, fetched = markets.len(), burn_height = height, "Markets fetched");
    Some(markets)
  }

  pub async fn fetch_active_markets(&self) -> Vec<Market> {
    let mut markets = self.fetch_markets().await;
    markets.retain(|m| !m.settled);
    markets
  }

  pub async fn fetch_settled_markets(&self) -> Vec<Market> {
    let mut markets = self.fetch_markets().await;
    markets.retain(|m| m.settled);
    markets
  }

  pub async fn market_odds(&self, id: u64) -> Option<MarketOdds> {
    let raw = self
      .read("get-market-odds", &[ClarityValue::uint(u128::from(id))])
      .await?;
    normalize_odds(&raw)
  }

  pub async fn is_market_settleable(&self, id: u64) -> bool {
    self
      .read("is-market-settleable", &[ClarityValue::uint(u128::from(id))])
      .await
      .and_then(|v| v.as_bool_lossy())
      .unwrap_or(false)
  }

  pub async fn blocks_until_settlement(&self, id: u64) -> u64 {
    self
      .read("get-blocks-until-settlement", &[ClarityValue::uint(u128::from(id))])
      .await
      .map_or(0, |v| normalize_uint(&v))
  }

  /// Contract-side payout quote for betting `amount` on `outcome`.
  pub async fn calculate_potential_payout(
    &self,
    id: u64,
    outcome: Outcome,
    amount: u64,
  ) -> Option<PotentialPayout> {
    let args = [
      ClarityValue::uint(u128::from(id)),
      ClarityValue::uint(u128::from(outcome.mask())),
      ClarityValue::uint(u128::from(amount)),
    ];
    let raw = self.read("calculate-potential-payout", &args).await?;
    normalize_payout(&raw)
  }

  /// `address`'s stake in market `id`, if any.
  pub async fn user_position(&self, id: u64, address: &str) -> Option<UserPosition> {
    let user = match ClarityValue::standard_principal(address) {
      Ok(p) => p,
      Err(e) => {
        warn!(address, error = %e, "Invalid user address");
        return None;
      }
    };
    let raw = self
      .read("get-user-position", &[ClarityValue::uint(u128::from(id)), user])
      .await?;
    normalize_position(id, &raw)
  }

  /// Per-user totals; zeroed for unknown users, `None` if the read failed.
  pub async fn user_stats(&self, address: &str) -> Option<UserStats> {
    let user = match ClarityValue::standard_principal(address) {
      Ok(p) => p,
      Err(e) => {
        warn!(address, error = %e, "Invalid user address");
        return None;
      }
    };
    let raw = self.read("get-user-stats", &[user]).await?;
    Some(normalize_stats(&raw))
  }

  pub async fn total_fees_collected(&self) -> u64 {
    self
      .read("get-total-fees-collected", &[])
      .await
      .map_or(0, |v| normalize_uint(&v))
  }

  /// Platform totals; volume is the sum of every market's pool.
  #[instrument(skip(self))]
  pub async fn platform_stats(&self) -> PlatformStats {
    let (total_markets, total_fees_collected, markets) = tokio::join!(
      self.market_count(),
      self.total_fees_collected(),
      self.fetch_markets()
    );

    PlatformStats {
      total_markets,
      total_volume: markets.iter().map(|m| m.total_pool).sum(),
      total_fees_collected,
    }
  }
}
