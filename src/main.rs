//! BTC Market Client - Entry Point
//!
//! Market-data daemon: keeps the market snapshot warm, logs platform
//! statistics and an optional watched portfolio, and serves health and
//! metrics endpoints. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create MetricsRegistry + HealthState
//! 4. Create HiroClient (implements ContractReader port)
//! 5. Create MarketService, MarketDataProvider, PortfolioService
//! 6. Spawn health/metrics server (/live, /ready, /metrics)
//! 7. Spawn refresh loop (forced refresh every refresh_interval_secs)
//! 8. Wait for SIGINT → broadcast shutdown → join tasks

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use btc_market_client::adapters::api::{HiroClient, HiroClientConfig};
use btc_market_client::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use btc_market_client::config::{self, AppConfig};
use btc_market_client::domain::MarketStatistics;
use btc_market_client::domain::format::{format_blocks_to_time, format_stx, outcome_label};
use btc_market_client::ports::clock::SystemClock;
use btc_market_client::ports::contract_reader::ContractReader;
use btc_market_client::usecases::{MarketDataProvider, MarketService, PortfolioService};

/// Everything one refresh pass needs.
struct Refresher<R: ContractReader> {
    service: Arc<MarketService<R>>,
    provider: Arc<MarketDataProvider<R>>,
    portfolio: Option<(PortfolioService<R>, String)>,
    /// Bitcoin explorer base for settlement hash links.
    explorer: &'static str,
    health: HealthState,
    metrics: Arc<MetricsRegistry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.client.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        network = %config.network.network,
        api = %config.network.api_url(),
        contract = %config.contract.contract_id(),
        "Starting BTC market client"
    );

    // ── 3. Shutdown channel, metrics, health ────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);
    let health = HealthState::new();

    // ── 4. Read-only contract client ────────────────────────
    let client = Arc::new(
        HiroClient::new(HiroClientConfig::from_app_config(&config))
            .context("Failed to create Hiro client")?
            .with_metrics(Arc::clone(&metrics)),
    );

    // ── 5. Use cases ────────────────────────────────────────
    let refresher = build_refresher(&config, client, health.clone(), Arc::clone(&metrics));

    // ── 6. Health/metrics server ────────────────────────────
    let health_handle = if config.metrics.enabled {
        let server = HealthServer::new(
            health.clone(),
            Arc::clone(&metrics),
            config.metrics.bind_address.clone(),
        );
        let server_shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(server_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    // ── 7. Refresh loop ─────────────────────────────────────
    let interval = Duration::from_secs(config.client.refresh_interval_secs);
    let refresh_shutdown = shutdown_tx.subscribe();
    let refresh_handle = tokio::spawn(run_refresh_loop(refresher, interval, refresh_shutdown));

    info!("All tasks spawned - client is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(10), refresh_handle).await;
    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

fn build_refresher<R: ContractReader>(
    config: &AppConfig,
    client: Arc<R>,
    health: HealthState,
    metrics: Arc<MetricsRegistry>,
) -> Refresher<R> {
    let service = Arc::new(MarketService::with_batch_size(client, config.cache.batch_size));
    let provider = Arc::new(
        MarketDataProvider::new(
            Arc::clone(&service),
            Arc::new(SystemClock),
            Duration::from_secs(config.cache.ttl_secs),
        )
        .with_metrics(Arc::clone(&metrics)),
    );
    let portfolio = config
        .portfolio
        .watch_address
        .clone()
        .map(|address| (PortfolioService::new(Arc::clone(&service)), address));

    Refresher {
        service,
        provider,
        portfolio,
        explorer: config.network.network.btc_explorer_url(),
        health,
        metrics,
    }
}

/// Force a refresh every `interval` until shutdown.
async fn run_refresh_loop<R: ContractReader>(
    refresher: Refresher<R>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                info!("Refresh loop received shutdown signal");
                break;
            }
            _ = ticker.tick() => refresh_once(&refresher).await,
        }
    }
}

/// Block page for a settlement hash, with or without its `0x` prefix.
fn settlement_link(explorer: &str, hash: &str) -> String {
    format!("{explorer}/block/{}", hash.trim_start_matches("0x"))
}

/// One refresh pass. Readiness is only granted once the contract answered.
async fn refresh_once<R: ContractReader>(r: &Refresher<R>) {
    let Some(markets) = r.provider.refresh().await else {
        warn!(ready = r.health.is_ready(), "Refresh pass could not reach the contract");
        return;
    };

    let burn_height = match markets.first() {
        Some(m) => m.current_burn_height,
        None => r.service.current_burn_height().await,
    };
    r.metrics
        .burn_height
        .set(i64::try_from(burn_height).unwrap_or(i64::MAX));

    let stats = MarketStatistics::from_markets(&markets);
    let fees = r.service.total_fees_collected().await;
    info!(
        total = stats.total_markets,
        active = stats.active_markets,
        settled = stats.settled_markets,
        volume_stx = %format_stx(stats.total_volume),
        fees_stx = %format_stx(fees),
        burn_height,
        "Market snapshot"
    );

    for market in markets.iter().filter(|m| m.settled) {
        if let Some(hash) = &market.settlement_block_hash {
            debug!(
                market_id = market.id,
                winner = market.winning_outcome.map_or("none", |o| outcome_label(o, market.market_type)),
                block = %settlement_link(r.explorer, hash),
                "Settled market"
            );
        }
    }

    for market in markets.iter().filter(|m| m.is_active()) {
        if market.is_settleable() {
            info!(market_id = market.id, title = %market.title, "Market awaiting settlement");
            continue;
        }
        let leader = market
            .possible_outcomes
            .enabled()
            .into_iter()
            .max_by_key(|&o| market.pool(o));
        debug!(
            market_id = market.id,
            settles_in = %format_blocks_to_time(market.blocks_until_settlement()),
            leader = leader.map_or("none", |o| outcome_label(o, market.market_type)),
            pool_stx = %format_stx(market.total_pool),
            "Active market"
        );
    }

    if let Some((portfolio, address)) = &r.portfolio {
        let report = portfolio.portfolio_in(&markets, address).await;
        info!(
            address = %address,
            positions = report.entries.len(),
            invested_stx = %format_stx(report.total_invested),
            active = report.active,
            won = report.won,
            lost = report.lost,
            claimed = report.claimed,
            claimable = report.claimable,
            "Watched portfolio"
        );
        for entry in report.entries.iter().filter(|e| e.can_claim) {
            info!(market_id = entry.market.id, title = %entry.market.title, "Winnings claimable");
        }
    }

    r.health.mark_ready();
}
