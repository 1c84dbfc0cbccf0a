//! Wallet Session Port - Contract-call Submission Interface
//!
//! Transactions are signed and broadcast by a wallet extension or
//! session, never by this crate. The port hands over a fully built
//! contract-call request and reports how the user's wallet resolved it.

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::codec::ClarityValue;
use crate::config::Network;

/// Whether the wallet may move assets beyond the declared post-conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostConditionMode {
  /// Abort if any transfer is not covered by a post-condition.
  Deny,
  /// Undeclared transfers are permitted (payouts of unknown size).
  Allow,
}

/// Comparison applied by a fungible post-condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FungibleConditionCode {
  Equal,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
}

/// STX balance assertion on the sender's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StxPostCondition {
  /// Account whose balance change is asserted.
  pub principal: String,
  pub condition_code: FungibleConditionCode,
  /// Amount in micro-STX.
  pub amount: u64,
}

/// Everything a wallet needs to prompt for and sign a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCallRequest {
  pub network: Network,
  pub contract_address: String,
  pub contract_name: String,
  pub function_name: String,
  /// Positional arguments, sent as hex-serialized Clarity values.
  #[serde(serialize_with = "serialize_args")]
  pub function_args: Vec<ClarityValue>,
  pub post_condition_mode: PostConditionMode,
  pub post_conditions: Vec<StxPostCondition>,
}

fn serialize_args<S: Serializer>(args: &[ClarityValue], serializer: S) -> Result<S::Ok, S::Error> {
  serializer.collect_seq(args.iter().map(ClarityValue::to_hex))
}

/// How the wallet resolved a contract-call prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletResponse {
  /// Signed and broadcast; the wallet returned a transaction id.
  Finished { tx_id: String },
  /// The user dismissed the prompt.
  Cancelled,
  /// Build, signing or broadcast failed inside the wallet.
  Failed { reason: String },
}

/// Trait for wallet-mediated transaction submission.
#[async_trait]
pub trait WalletSession: Send + Sync + 'static {
  /// Address of the connected account, if any.
  fn stx_address(&self) -> Option<String>;

  /// Prompt the wallet to sign and broadcast `request`.
  ///
  /// Resolves once the user finishes or cancels the prompt.
  async fn open_contract_call(&self, request: &ContractCallRequest) -> WalletResponse;
}
