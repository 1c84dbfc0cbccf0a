//! Hiro HTTP Client - Bounded Read-only Contract Client
//!
//! Wraps reqwest with a concurrency limit for all read-only calls
//! against the market contract. Each call is one request: there is no
//! retry loop, and callers degrade to defaults on failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use super::types::{NodeInfo, ReadOnlyRequest, ReadOnlyResponse};
use crate::adapters::metrics::MetricsRegistry;
use crate::codec::ClarityValue;
use crate::config::AppConfig;
use crate::ports::contract_reader::{ContractReader, ReadCallError};

/// Configuration for the Hiro HTTP client.
#[derive(Debug, Clone)]
pub struct HiroClientConfig {
  /// Base URL of the Stacks node API, without trailing slash.
  pub base_url: String,
  /// Deployer address of the market contract.
  pub contract_address: String,
  /// Market contract name.
  pub contract_name: String,
  /// Principal read-only calls are evaluated as.
  pub sender: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
}

impl HiroClientConfig {
  /// Build from the validated application config.
  ///
  /// Calls are evaluated as the contract deployer.
  pub fn from_app_config(config: &AppConfig) -> Self {
    Self {
      base_url: config.network.api_url(),
      contract_address: config.contract.address.clone(),
      contract_name: config.contract.name.clone(),
      sender: config.contract.address.clone(),
      timeout: Duration::from_millis(config.network.timeout_ms),
      max_concurrent: config.network.max_concurrent,
    }
  }
}

/// Concurrency-limited HTTP client for the Stacks read-only API.
pub struct HiroClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: HiroClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
  /// Optional metrics sink.
  metrics: Option<Arc<MetricsRegistry>>,
}

impl HiroClient {
  /// Create a new client.
  pub fn new(config: HiroClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(config.max_concurrent)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

    Ok(Self {
      http,
      config,
      semaphore,
      metrics: None,
    })
  }

  /// Record every call in `metrics`.
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  fn read_url(&self, function: &str) -> String {
    format!(
      "{}/v2/contracts/call-read/{}/{}/{}",
      self.config.base_url, self.config.contract_address, self.config.contract_name, function
    )
  }

  /// One POST to the read-only endpoint, decoded into a Clarity value.
  async fn execute(
    &self,
    function: &str,
    args: &[ClarityValue],
  ) -> Result<ClarityValue, ReadCallError> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .map_err(|e| ReadCallError::Transport(format!("semaphore closed: {e}")))?;

    let body = ReadOnlyRequest {
      sender: self.config.sender.clone(),
      arguments: args.iter().map(ClarityValue::to_hex).collect(),
    };

    let response = self
      .http
      .post(self.read_url(function))
      .json(&body)
      .send()
      .await
      .map_err(|e| ReadCallError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ReadCallError::Http {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ReadOnlyResponse = response
      .json()
      .await
      .map_err(|e| ReadCallError::Transport(format!("invalid response body: {e}")))?;

    if !parsed.okay {
      return Err(ReadCallError::Rejected {
        cause: parsed
          .cause
          .unwrap_or_else(|| "Contract call failed".to_string()),
      });
    }

    let hex = parsed.result.ok_or(ReadCallError::MissingResult)?;
    Ok(ClarityValue::from_hex(&hex)?)
  }

  /// Check if the node API is reachable.
  pub async fn health_check(&self) -> bool {
    self.node_burn_height().await.is_ok()
  }
}

/// Metric label for a call outcome.
fn outcome_label(result: &Result<ClarityValue, ReadCallError>) -> &'static str {
  match result {
    Ok(_) => "ok",
    Err(ReadCallError::Transport(_)) => "transport_error",
    Err(ReadCallError::Http { .. }) => "http_error",
    Err(ReadCallError::Rejected { .. }) => "rejected",
    Err(ReadCallError::MissingResult) => "missing_result",
    Err(ReadCallError::Decode(_)) => "decode_error",
  }
}

#[async_trait]
impl ContractReader for HiroClient {
  #[instrument(skip(self, args), fields(args = args.len()))]
  async fn call_read_only(
    &self,
    function: &str,
    args: &[ClarityValue],
  ) -> Result<ClarityValue, ReadCallError> {
    let started = Instant::now();
    let result = self.execute(function, args).await;
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Some(metrics) = &self.metrics {
      metrics.observe_read(function, outcome_label(&result), latency_ms);
    }

    match &result {
      Ok(_) => debug!(function, latency_ms, "Read-only call succeeded"),
      Err(e) => warn!(function, error = %e, "Read-only call failed"),
    }

    result
  }

  #[instrument(skip(self))]
  async fn node_burn_height(&self) -> Result<u64, ReadCallError> {
    let url = format!("{}/v2/info", self.config.base_url);

    let response = self
      .http
      .get(&url)
      .send()
      .await
      .map_err(|e| ReadCallError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ReadCallError::Http {
        status: status.as_u16(),
        body,
      });
    }

    let info: NodeInfo = response
      .json()
      .await
      .map_err(|e| ReadCallError::Transport(format!("invalid node info: {e}")))?;

    Ok(info.burn_block_height)
  }
}
