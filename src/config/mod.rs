//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Contract identity and network selection are passed explicitly to
//! every component built from this config - nothing reads globals.

pub mod loader;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any component is constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  pub client: ClientConfig,
  /// Stacks network and node API settings.
  pub network: NetworkConfig,
  /// Deployed market contract.
  pub contract: ContractConfig,
  /// Market snapshot cache.
  #[serde(default)]
  pub cache: CacheConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Optional account whose portfolio is logged on each refresh.
  #[serde(default)]
  pub portfolio: PortfolioConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Seconds between forced market refreshes in the daemon loop.
  #[serde(default = "default_refresh_interval")]
  pub refresh_interval_secs: u64,
}

/// Stacks network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
  Mainnet,
  Testnet,
}

impl Network {
  /// Default Hiro API base for this network.
  pub const fn api_base_url(self) -> &'static str {
    match self {
      Self::Mainnet => "https://api.mainnet.hiro.so",
      Self::Testnet => "https://api.testnet.hiro.so",
    }
  }

  /// Bitcoin block explorer for settlement hashes.
  pub const fn btc_explorer_url(self) -> &'static str {
    match self {
      Self::Mainnet => "https://mempool.space",
      Self::Testnet => "https://mempool.space/testnet",
    }
  }

  pub const fn is_mainnet(self) -> bool {
    matches!(self, Self::Mainnet)
  }
}

impl fmt::Display for Network {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Mainnet => write!(f, "mainnet"),
      Self::Testnet => write!(f, "testnet"),
    }
  }
}

/// Node API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// Which Stacks network the contract lives on.
  pub network: Network,
  /// Override for the API base URL (e.g. a local devnet node).
  pub api_url: Option<String>,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Maximum in-flight read calls.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
}

impl NetworkConfig {
  /// Effective API base URL without a trailing slash.
  pub fn api_url(&self) -> String {
    self
      .api_url
      .as_deref()
      .unwrap_or_else(|| self.network.api_base_url())
      .trim_end_matches('/')
      .to_string()
  }
}

/// Deployed contract identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractConfig {
  /// Deployer address (c32check).
  pub address: String,
  /// Contract name, e.g. `btc-prediction-market`.
  pub name: String,
}

impl ContractConfig {
  /// Fully qualified `address.name` identifier.
  pub fn contract_id(&self) -> String {
    format!("{}.{}", self.address, self.name)
  }
}

/// Market cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Snapshot time-to-live in seconds.
  #[serde(default = "default_cache_ttl")]
  pub ttl_secs: u64,
  /// Markets fetched concurrently per batch.
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: default_cache_ttl(),
      batch_size: default_batch_size(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Serve /metrics, /live and /ready.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Bind address for the metrics/health server.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
    }
  }
}

/// Portfolio watch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioConfig {
  /// Account to report positions for; unset disables the report.
  pub watch_address: Option<String>,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_refresh_interval() -> u64 {
  60
}

fn default_timeout_ms() -> u64 {
  10_000
}

fn default_max_concurrent() -> usize {
  16
}

fn default_cache_ttl() -> u64 {
  300 // 5 minutes
}

fn default_batch_size() -> usize {
  10
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
