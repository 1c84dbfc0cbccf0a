//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::codec::StandardPrincipal;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    network = %config.network.network,
    api = %config.network.api_url(),
    contract = %config.contract.contract_id(),
    cache_ttl_secs = config.cache.ttl_secs,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A checksum-valid contract address on the configured network
/// - Non-empty contract name
/// - Positive cache, batch and transport limits
/// - A valid watch address when one is set
fn validate_config(config: &AppConfig) -> Result<()> {
  // Contract validation
  let deployer = StandardPrincipal::from_address(&config.contract.address)
    .with_context(|| format!("Invalid contract address {}", config.contract.address))?;
  anyhow::ensure!(
    deployer.is_mainnet() == config.network.network.is_mainnet(),
    "Contract address {} does not belong to {}",
    config.contract.address,
    config.network.network
  );
  anyhow::ensure!(
    !config.contract.name.is_empty() && config.contract.name.len() <= 128,
    "Contract name must be 1..=128 characters"
  );

  // Network validation
  anyhow::ensure!(
    config.network.timeout_ms > 0,
    "network.timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.network.max_concurrent > 0,
    "network.max_concurrent must be positive"
  );
  if let Some(url) = &config.network.api_url {
    anyhow::ensure!(
      url.starts_with("http://") || url.starts_with("https://"),
      "network.api_url must be an http(s) URL, got {url}"
    );
  }

  // Cache validation
  anyhow::ensure!(
    config.cache.ttl_secs > 0,
    "cache.ttl_secs must be positive"
  );
  anyhow::ensure!(
    config.cache.batch_size > 0,
    "cache.batch_size must be positive"
  );

  anyhow::ensure!(
    config.client.refresh_interval_secs > 0,
    "client.refresh_interval_secs must be positive"
  );

  if let Some(address) = &config.portfolio.watch_address {
    StandardPrincipal::from_address(address)
      .with_context(|| format!("Invalid portfolio.watch_address {address}"))?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Network;

  const TESTNET_CONFIG: &str = r#"
[client]
name = "market-watch"

[network]
network = "testnet"

[contract]
address = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"
name = "btc-prediction-market"
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_defaults_applied() {
    let config = parse_config(TESTNET_CONFIG).unwrap();
    assert_eq!(config.network.network, Network::Testnet);
    assert_eq!(config.network.api_url(), "https://api.testnet.hiro.so");
    assert_eq!(config.cache.ttl_secs, 300);
    assert_eq!(config.cache.batch_size, 10);
    assert_eq!(config.client.log_level, "info");
    assert!(config.portfolio.watch_address.is_none());
  }

  #[test]
  fn test_api_url_override_trims_slash() {
    let toml = TESTNET_CONFIG.replace(
      "network = \"testnet\"",
      "network = \"testnet\"\napi_url = \"http://localhost:3999/\"",
    );
    let config = parse_config(&toml).unwrap();
    assert_eq!(config.network.api_url(), "http://localhost:3999");
  }

  #[test]
  fn test_network_mismatch_rejected() {
    let toml = TESTNET_CONFIG.replace("\"testnet\"", "\"mainnet\"");
    assert!(parse_config(&toml).is_err());
  }

  #[test]
  fn test_zero_batch_size_rejected() {
    let toml = format!("{TESTNET_CONFIG}\n[cache]\nbatch_size = 0\n");
    assert!(parse_config(&toml).is_err());
  }

  #[test]
  fn test_invalid_watch_address_rejected() {
    let toml = format!("{TESTNET_CONFIG}\n[portfolio]\nwatch_address = \"nope\"\n");
    assert!(parse_config(&toml).is_err());
  }
}
