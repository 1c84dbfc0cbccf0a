//! Prometheus Metrics Registry - Market Client Observability
//!
//! Registers the read-path, cache and wallet metrics and renders the
//! text exposition served on `/metrics`. A read failure turns into a
//! default value upstream, so the per-outcome counters here are the
//! only place a real zero can be told apart from a failed call.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Centralized Prometheus metrics for the market client.
///
/// All metrics follow the naming convention `btc_market_client_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Read-only calls by contract function and outcome.
    pub read_calls: IntCounterVec,
    /// Read-only call latency in milliseconds, by function.
    pub read_latency_ms: HistogramVec,
    /// Market cache lookups by result (hit/miss).
    pub cache_lookups: IntCounterVec,
    /// Markets in the current cached snapshot.
    pub markets_cached: IntGauge,
    /// Last observed Bitcoin burn height.
    pub burn_height: IntGauge,
    /// Wallet contract-call prompts by action and outcome.
    pub wallet_requests: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let read_calls = IntCounterVec::new(
            Opts::new(
                "btc_market_client_read_calls_total",
                "Read-only contract calls by function and outcome",
            ),
            &["function", "outcome"],
        )?;

        let read_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "btc_market_client_read_latency_ms",
                "Read-only contract call latency in milliseconds",
            )
            .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]),
            &["function"],
        )?;

        let cache_lookups = IntCounterVec::new(
            Opts::new(
                "btc_market_client_cache_lookups_total",
                "Market cache lookups by result",
            ),
            &["result"],
        )?;

        let markets_cached = IntGauge::new(
            "btc_market_client_markets_cached",
            "Markets held in the cached snapshot",
        )?;

        let burn_height = IntGauge::new(
            "btc_market_client_burn_height",
            "Last observed Bitcoin burn block height",
        )?;

        let wallet_requests = IntCounterVec::new(
            Opts::new(
                "btc_market_client_wallet_requests_total",
                "Wallet contract-call prompts by action and outcome",
            ),
            &["action", "outcome"],
        )?;

        // Register all metrics
        registry.register(Box::new(read_calls.clone()))?;
        registry.register(Box::new(read_latency_ms.clone()))?;
        registry.register(Box::new(cache_lookups.clone()))?;
        registry.register(Box::new(markets_cached.clone()))?;
        registry.register(Box::new(burn_height.clone()))?;
        registry.register(Box::new(wallet_requests.clone()))?;

        Ok(Self {
            registry,
            read_calls,
            read_latency_ms,
            cache_lookups,
            markets_cached,
            burn_height,
            wallet_requests,
        })
    }

    /// Record one read-only call.
    pub fn observe_read(&self, function: &str, outcome: &str, latency_ms: f64) {
        self.read_calls.with_label_values(&[function, outcome]).inc();
        self.read_latency_ms
            .with_label_values(&[function])
            .observe(latency_ms);
    }

    pub fn observe_cache(&self, hit: bool) {
        let label = if hit { "hit" } else { "miss" };
        self.cache_lookups.with_label_values(&[label]).inc();
    }

    pub fn observe_wallet(&self, action: &str, outcome: &str) {
        self.wallet_requests.with_label_values(&[action, outcome]).inc();
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_encodes_recorded_series() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.observe_read("get-market", "ok", 12.0);
        metrics.observe_read("get-market", "rejected", 3.0);
        metrics.observe_cache(true);
        metrics.markets_cached.set(25);

        let text = metrics.encode().unwrap();
        assert!(text.contains(
            "btc_market_client_read_calls_total{function=\"get-market\",outcome=\"rejected\"} 1"
        ));
        assert!(text.contains("btc_market_client_cache_lookups_total{result=\"hit\"} 1"));
        assert!(text.contains("btc_market_client_markets_cached 25"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = MetricsRegistry::new().unwrap();
        let b = MetricsRegistry::new().unwrap();
        a.observe_wallet("place-bet", "submitted");
        assert!(!b.encode().unwrap().contains("place-bet"));
    }
}
