//! Clarity Value Codec
//!
//! Encodes and decodes the tagged-value wire format used by the
//! Stacks read-only call endpoint and by contract-call arguments.
//! Values travel as `0x`-prefixed hex of the consensus serialization.
//!
//! Sub-modules:
//! - `value`: the recursive `ClarityValue` tree and its accessors
//! - `wire`: consensus byte serialization / recursive-descent decoding
//! - `c32`: c32check address encoding for principals

pub mod c32;
pub mod value;
pub mod wire;

pub use c32::StandardPrincipal;
pub use value::{ClarityValue, Principal};

use thiserror::Error;

/// Failure while decoding a Clarity value or a principal address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    #[error("unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("unknown type prefix 0x{prefix:02x} at byte {offset}")]
    UnknownTypePrefix { prefix: u8, offset: usize },
    #[error("string payload is not valid {0}")]
    InvalidUtf8(&'static str),
    #[error("value nesting exceeds depth {0}")]
    DepthExceeded(usize),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("invalid principal address: {0}")]
    InvalidAddress(String),
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}
