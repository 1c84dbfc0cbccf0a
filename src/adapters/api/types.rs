//! Stacks Node API Request/Response Types
//!
//! Serialization types for the read-only call endpoint and the node
//! info endpoint. Clarity values travel as `0x`-prefixed hex strings.

use serde::{Deserialize, Serialize};

/// Body of `POST /v2/contracts/call-read/{address}/{name}/{function}`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadOnlyRequest {
  /// Principal the call is evaluated as.
  pub sender: String,
  /// Hex-serialized Clarity arguments, in parameter order.
  pub arguments: Vec<String>,
}

/// Result of a read-only call.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadOnlyResponse {
  /// Whether evaluation succeeded.
  pub okay: bool,
  /// Hex-serialized Clarity result when `okay`.
  #[serde(default)]
  pub result: Option<String>,
  /// Failure reason when not `okay`.
  #[serde(default)]
  pub cause: Option<String>,
}

/// Subset of `GET /v2/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeInfo {
  /// Bitcoin block height the node has processed.
  pub burn_block_height: u64,
  #[serde(default)]
  pub stacks_tip_height: Option<u64>,
  #[serde(default)]
  pub network_id: Option<u32>,
}
