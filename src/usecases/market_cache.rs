//! Market Data Provider - TTL Cache over the Market List
//!
//! Holds one snapshot of every market and serves it until it is older
//! than the TTL. Each provider owns its cache, so independent
//! instances never share state.
//!
//! Concurrent refreshes are not deduplicated: both fetch, and the last
//! write wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::market_service::MarketService;
use crate::adapters::metrics::MetricsRegistry;
use crate::domain::{Market, MarketFilter, MarketStatistics};
use crate::ports::clock::Clock;
use crate::ports::contract_reader::ContractReader;

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Default)]
struct Snapshot {
  markets: Arc<Vec<Market>>,
  fetched_at: Option<DateTime<Utc>>,
}

/// Cached market list with forced and TTL-driven refresh.
pub struct MarketDataProvider<R: ContractReader> {
  service: Arc<MarketService<R>>,
  clock: Arc<dyn Clock>,
  ttl: Duration,
  snapshot: RwLock<Snapshot>,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<R: ContractReader> MarketDataProvider<R> {
  pub fn new(service: Arc<MarketService<R>>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
    Self {
      service,
      clock,
      ttl,
      snapshot: RwLock::new(Snapshot::default()),
      metrics: None,
    }
  }

  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  fn is_fresh(&self, fetched_at: Option<DateTime<Utc>>) -> bool {
    // A clock that moved backwards reads as expired.
    fetched_at
      .and_then(|at| (self.clock.now() - at).to_std().ok())
      .is_some_and(|age| age < self.ttl)
  }

  /// All markets, from cache unless expired or `force_refresh` is set.
  pub async fn get_markets(&self, force_refresh: bool) -> Arc<Vec<Market>> {
    if !force_refresh {
      let snapshot = self.snapshot.read().await;
      if self.is_fresh(snapshot.fetched_at) {
        if let Some(metrics) = &self.metrics {
          metrics.observe_cache(true);
        }
        debug!(markets = snapshot.markets.len(), "Serving cached markets");
        return Arc::clone(&snapshot.markets);
      }
    }

    if let Some(metrics) = &self.metrics {
      metrics.observe_cache(false);
    }

    let markets = self.service.fetch_markets().await;
    self.store(markets, force_refresh).await
  }

  /// Forced refresh that reports whether the contract answered.
  ///
  /// When the market count cannot be read the snapshot is left untouched
  /// and `None` is returned.
  pub async fn refresh(&self) -> Option<Arc<Vec<Market>>> {
    if let Some(metrics) = &self.metrics {
      metrics.observe_cache(false);
    }

    let Some(markets) = self.service.try_fetch_markets().await else {
      warn!("Market refresh failed, keeping previous snapshot");
      return None;
    };
    Some(self.store(markets, true).await)
  }

  async fn store(&self, markets: Vec<Market>, force_refresh: bool) -> Arc<Vec<Market>> {
    let markets = Arc::new(markets);

    let mut snapshot = self.snapshot.write().await;
    snapshot.markets = Arc::clone(&markets);
    snapshot.fetched_at = Some(self.clock.now());

    if let Some(metrics) = &self.metrics {
      metrics.markets_cached.set(i64::try_from(markets.len()).unwrap_or(i64::MAX));
    }
    info!(markets = markets.len(), force_refresh, "Market cache refreshed");

    markets
  }

  /// Drop the snapshot and its timestamp; the next read refetches.
  pub async fn clear_cache(&self) {
    let mut snapshot = self.snapshot.write().await;
    *snapshot = Snapshot::default();
    if let Some(metrics) = &self.metrics {
      metrics.markets_cached.set(0);
    }
  }

  /// When the current snapshot was fetched, if there is one.
  pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
    self.snapshot.read().await.fetched_at
  }

  pub async fn market_by_id(&self, id: u64) -> Option<Market> {
    self.get_markets(false).await.iter().find(|m| m.id == id).cloned()
  }

  pub async fn filter_markets(&self, filter: &MarketFilter) -> Vec<Market> {
    self
      .get_markets(false)
      .await
      .iter()
      .filter(|m| filter.matches(m))
      .cloned()
      .collect()
  }

  pub async fn statistics(&self) -> MarketStatistics {
    MarketStatistics::from_markets(&self.get_markets(false).await)
  }
}
