//! Transactions Use Case - Contract-call Construction and Submission
//!
//! `TransactionBuilder` turns user actions into contract-call requests
//! and rejects invalid input before a wallet is ever prompted.
//! `TransactionService` hands requests to the connected wallet and
//! reports each result exactly once.
//!
//! Post-condition policy:
//! - create market / place bet: Deny mode, sender sends exactly the
//!   fee or stake in STX
//! - settle / claim: Allow mode, since the payout is not known here

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::codec::{ClarityValue, StandardPrincipal};
use crate::config::{AppConfig, Network};
use crate::domain::constants::{
  DEFAULT_DESCRIPTION, MARKET_CREATION_FEE, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, MIN_BET_AMOUNT,
};
use crate::domain::format::stx_to_micro;
use crate::domain::{Outcome, OutcomeMask};
use crate::ports::wallet::{
  ContractCallRequest, FungibleConditionCode, PostConditionMode, StxPostCondition, WalletResponse,
  WalletSession,
};

/// Input rejected before any wallet interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  #[error("bet of {amount} uSTX is below the minimum of {minimum} uSTX")]
  BetTooSmall { amount: u64, minimum: u64 },
  #[error("bet amount is not a valid STX amount")]
  InvalidAmount,
  #[error("market title must not be empty")]
  EmptyTitle,
  #[error("multi-outcome markets need at least two outcomes, got {0}")]
  TooFewOutcomes(u32),
  #[error("settlement height must be greater than zero")]
  InvalidSettlementHeight,
  #[error("invalid sender address: {0}")]
  InvalidSender(String),
  #[error("no wallet account connected")]
  NotConnected,
}

/// Result of one submitted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
  /// Broadcast; the contract outcome arrives later on-chain.
  Submitted { tx_id: String },
  /// Dismissed in the wallet; nothing changed.
  Cancelled,
  Failed { error: String },
}

impl TransactionOutcome {
  fn label(&self) -> &'static str {
    match self {
      Self::Submitted { .. } => "submitted",
      Self::Cancelled => "cancelled",
      Self::Failed { .. } => "failed",
    }
  }
}

fn truncate_chars(text: &str, max: usize) -> String {
  text.chars().take(max).collect()
}

/// Builds contract-call requests for one deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBuilder {
  network: Network,
  contract_address: String,
  contract_name: String,
}

impl TransactionBuilder {
  pub fn new(network: Network, contract_address: String, contract_name: String) -> Self {
    Self {
      network,
      contract_address,
      contract_name,
    }
  }

  pub fn from_config(config: &AppConfig) -> Self {
    Self::new(
      config.network.network,
      config.contract.address.clone(),
      config.contract.name.clone(),
    )
  }

  fn validate_sender(sender: &str) -> Result<(), BuildError> {
    StandardPrincipal::from_address(sender)
      .map(|_| ())
      .map_err(|e| BuildError::InvalidSender(e.to_string()))
  }

  fn request(
    &self,
    function_name: &str,
    function_args: Vec<ClarityValue>,
    post_condition_mode: PostConditionMode,
    post_conditions: Vec<StxPostCondition>,
  ) -> ContractCallRequest {
    ContractCallRequest {
      network: self.network,
      contract_address: self.contract_address.clone(),
      contract_name: self.contract_name.clone(),
      function_name: function_name.to_string(),
      function_args,
      post_condition_mode,
      post_conditions,
    }
  }

  fn exact_stx(sender: &str, amount: u64) -> StxPostCondition {
    StxPostCondition {
      principal: sender.to_string(),
      condition_code: FungibleConditionCode::Equal,
      amount,
    }
  }

  /// Shared validation and arguments for both creation calls.
  fn creation_args(
    sender: &str,
    title: &str,
    description: &str,
    settlement_height: u64,
  ) -> Result<Vec<ClarityValue>, BuildError> {
    Self::validate_sender(sender)?;
    if title.trim().is_empty() {
      return Err(BuildError::EmptyTitle);
    }
    if settlement_height == 0 {
      return Err(BuildError::InvalidSettlementHeight);
    }

    let description = if description.trim().is_empty() {
      DEFAULT_DESCRIPTION.to_string()
    } else {
      truncate_chars(description, MAX_DESCRIPTION_LEN)
    };

    Ok(vec![
      ClarityValue::string_utf8(truncate_chars(title, MAX_TITLE_LEN)),
      ClarityValue::string_utf8(description),
      ClarityValue::uint(u128::from(settlement_height)),
    ])
  }

  /// `create-binary-market`: outcomes A and B, 5 STX fee.
  pub fn create_binary_market(
    &self,
    sender: &str,
    title: &str,
    description: &str,
    settlement_height: u64,
  ) -> Result<ContractCallRequest, BuildError> {
    let args = Self::creation_args(sender, title, description, settlement_height)?;
    Ok(self.request(
      "create-binary-market",
      args,
      PostConditionMode::Deny,
      vec![Self::exact_stx(sender, MARKET_CREATION_FEE)],
    ))
  }

  /// `create-multi-market` with the enabled outcomes as four flags.
  pub fn create_multi_market(
    &self,
    sender: &str,
    title: &str,
    description: &str,
    settlement_height: u64,
    outcomes: OutcomeMask,
  ) -> Result<ContractCallRequest, BuildError> {
    let mut args = Self::creation_args(sender, title, description, settlement_height)?;
    if outcomes.count() < 2 {
      return Err(BuildError::TooFewOutcomes(outcomes.count()));
    }
    args.extend(Outcome::ALL.map(|o| ClarityValue::bool(outcomes.contains(o))));

    Ok(self.request(
      "create-multi-market",
      args,
      PostConditionMode::Deny,
      vec![Self::exact_stx(sender, MARKET_CREATION_FEE)],
    ))
  }

  /// `bet-outcome-{a..d}` staking exactly `amount` micro-STX.
  pub fn place_bet(
    &self,
    sender: &str,
    market_id: u64,
    outcome: Outcome,
    amount: u64,
  ) -> Result<ContractCallRequest, BuildError> {
    Self::validate_sender(sender)?;
    if amount < MIN_BET_AMOUNT {
      return Err(BuildError::BetTooSmall {
        amount,
        minimum: MIN_BET_AMOUNT,
      });
    }

    Ok(self.request(
      outcome.bet_function(),
      vec![
        ClarityValue::uint(u128::from(market_id)),
        ClarityValue::uint(u128::from(amount)),
      ],
      PostConditionMode::Deny,
      vec![Self::exact_stx(sender, amount)],
    ))
  }

  /// `place_bet` with the stake given in STX; sub-micro fractions are floored.
  pub fn place_bet_stx(
    &self,
    sender: &str,
    market_id: u64,
    outcome: Outcome,
    stx: Decimal,
  ) -> Result<ContractCallRequest, BuildError> {
    let amount = stx_to_micro(stx).ok_or(BuildError::InvalidAmount)?;
    self.place_bet(sender, market_id, outcome, amount)
  }

  pub fn settle_market(&self, sender: &str, market_id: u64) -> Result<ContractCallRequest, BuildError> {
    Self::validate_sender(sender)?;
    Ok(self.request(
      "settle-market",
      vec![ClarityValue::uint(u128::from(market_id))],
      PostConditionMode::Allow,
      Vec::new(),
    ))
  }

  pub fn claim_winnings(&self, sender: &str, market_id: u64) -> Result<ContractCallRequest, BuildError> {
    Self::validate_sender(sender)?;
    Ok(self.request(
      "claim-winnings",
      vec![ClarityValue::uint(u128::from(market_id))],
      PostConditionMode::Allow,
      Vec::new(),
    ))
  }
}

/// Submits built requests through the connected wallet.
pub struct TransactionService<W: WalletSession> {
  builder: TransactionBuilder,
  wallet: Arc<W>,
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<W: WalletSession> TransactionService<W> {
  pub fn new(builder: TransactionBuilder, wallet: Arc<W>) -> Self {
    Self {
      builder,
      wallet,
      metrics: None,
    }
  }

  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  pub fn builder(&self) -> &TransactionBuilder {
    &self.builder
  }

  fn sender(&self) -> Result<String, BuildError> {
    self.wallet.stx_address().ok_or(BuildError::NotConnected)
  }

  /// Prompt the wallet once and map its answer.
  async fn submit(
    &self,
    action: &'static str,
    request: Result<ContractCallRequest, BuildError>,
  ) -> TransactionOutcome {
    let outcome = match request {
      Err(e) => TransactionOutcome::Failed {
        error: e.to_string(),
      },
      Ok(request) => match self.wallet.open_contract_call(&request).await {
        WalletResponse::Finished { tx_id } => TransactionOutcome::Submitted { tx_id },
        WalletResponse::Cancelled => TransactionOutcome::Cancelled,
        WalletResponse::Failed { reason } => TransactionOutcome::Failed { error: reason },
      },
    };

    match &outcome {
      TransactionOutcome::Submitted { tx_id } => info!(action, tx_id, "Transaction submitted"),
      TransactionOutcome::Cancelled => info!(action, "Transaction cancelled in wallet"),
      TransactionOutcome::Failed { error } => warn!(action, error, "Transaction failed"),
    }
    if let Some(metrics) = &self.metrics {
      metrics.observe_wallet(action, outcome.label());
    }

    outcome
  }

  #[instrument(skip(self, description))]
  pub async fn create_binary_market(
    &self,
    title: &str,
    description: &str,
    settlement_height: u64,
  ) -> TransactionOutcome {
    let request = self.sender().and_then(|sender| {
      self
        .builder
        .create_binary_market(&sender, title, description, settlement_height)
    });
    self.submit("create-market", request).await
  }

  #[instrument(skip(self, description))]
  pub async fn create_multi_market(
    &self,
    title: &str,
    description: &str,
    settlement_height: u64,
    outcomes: OutcomeMask,
  ) -> TransactionOutcome {
    let request = self.sender().and_then(|sender| {
      self
        .builder
        .create_multi_market(&sender, title, description, settlement_height, outcomes)
    });
    self.submit("create-market", request).await
  }

  #[instrument(skip(self))]
  pub async fn place_bet(&self, market_id: u64, outcome: Outcome, amount: u64) -> TransactionOutcome {
    let request = self
      .sender()
      .and_then(|sender| self.builder.place_bet(&sender, market_id, outcome, amount));
    self.submit("place-bet", request).await
  }

  #[instrument(skip(self))]
  pub async fn settle_market(&self, market_id: u64) -> TransactionOutcome {
    let request = self
      .sender()
      .and_then(|sender| self.builder.settle_market(&sender, market_id));
    self.submit("settle-market", request).await
  }

  #[instrument(skip(self))]
  pub async fn claim_winnings(&self, market_id: u64) -> TransactionOutcome {
    let request = self
      .sender()
      .and_then(|sender| self.builder.claim_winnings(&sender, market_id));
    self.submit("claim-winnings", request).await
  }
}
