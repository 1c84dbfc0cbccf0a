//! Contract Reader Port - Read-only Contract Call Interface
//!
//! Defines the trait for invoking read-only functions on the market
//! contract. Arguments and results are Clarity values; the adapter
//! owns the hex transport and the HTTP details.

use async_trait::async_trait;
use thiserror::Error;

use crate::codec::{ClarityValue, DecodeError};

/// Failure of a single read-only call.
#[derive(Debug, Error)]
pub enum ReadCallError {
  /// Network or connection failure before a response arrived.
  #[error("transport error: {0}")]
  Transport(String),
  /// Non-success HTTP status from the node API.
  #[error("HTTP {status}: {body}")]
  Http { status: u16, body: String },
  /// The node evaluated the call and reported `okay: false`.
  #[error("contract call rejected: {cause}")]
  Rejected { cause: String },
  /// `okay: true` without a `result` payload.
  #[error("response carried no result")]
  MissingResult,
  /// The result payload was not a valid Clarity value.
  #[error("failed to decode result: {0}")]
  Decode(#[from] DecodeError),
}

/// Trait for read-only access to the prediction-market contract.
///
/// Implementors issue one request per call and never retry; callers
/// decide how to degrade on failure.
#[async_trait]
pub trait ContractReader: Send + Sync + 'static {
  /// Call a read-only function with positional Clarity arguments.
  async fn call_read_only(
    &self,
    function: &str,
    args: &[ClarityValue],
  ) -> Result<ClarityValue, ReadCallError>;

  /// Current Bitcoin burn height as reported by the node itself.
  ///
  /// Used as a fallback when `get-current-burn-height` fails.
  async fn node_burn_height(&self) -> Result<u64, ReadCallError>;
}
