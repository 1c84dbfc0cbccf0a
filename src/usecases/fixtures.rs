//! Test doubles shared by the use-case unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::codec::ClarityValue;
use crate::domain::Outcome;
use crate::ports::contract_reader::{ContractReader, ReadCallError};

pub const CREATOR: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
pub const USER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

/// `get-market` result: 10 STX on A, 20 STX on B, settled when `winner` is set.
pub fn market_tuple(id: u64, winner: Option<Outcome>) -> ClarityValue {
  let settled = winner.is_some();
  ClarityValue::some(ClarityValue::tuple([
    ("creator", ClarityValue::standard_principal(CREATOR).unwrap()),
    ("title", ClarityValue::string_utf8(format!("Market {id}"))),
    ("description", ClarityValue::string_utf8("Description")),
    ("settlement-burn-height", ClarityValue::uint(900_100)),
    ("settlement-type", ClarityValue::StringAscii("hash-even-odd".into())),
    ("possible-outcomes", ClarityValue::uint(3)),
    ("total-pool", ClarityValue::uint(30_000_000)),
    ("outcome-a-pool", ClarityValue::uint(10_000_000)),
    ("outcome-b-pool", ClarityValue::uint(20_000_000)),
    ("outcome-c-pool", ClarityValue::uint(0)),
    ("outcome-d-pool", ClarityValue::uint(0)),
    (
      "winning-outcome",
      winner.map_or(ClarityValue::OptionalNone, |o| {
        ClarityValue::some(ClarityValue::uint(u128::from(o.mask())))
      }),
    ),
    ("settled", ClarityValue::bool(settled)),
    (
      "settled-at-burn-height",
      if settled {
        ClarityValue::some(ClarityValue::uint(900_101))
      } else {
        ClarityValue::OptionalNone
      },
    ),
    (
      "settlement-block-hash",
      if settled {
        ClarityValue::some(ClarityValue::Buffer(vec![0x00, 0xff]))
      } else {
        ClarityValue::OptionalNone
      },
    ),
    ("created-at-burn-height", ClarityValue::uint(900_000)),
    ("created-at-stacks-height", ClarityValue::uint(150_000)),
  ]))
}

/// `get-user-position` result with stakes on A and B.
pub fn position_tuple(on_a: u64, on_b: u64, claimed: bool) -> ClarityValue {
  ClarityValue::some(ClarityValue::tuple([
    ("outcome-a-amount", ClarityValue::uint(u128::from(on_a))),
    ("outcome-b-amount", ClarityValue::uint(u128::from(on_b))),
    ("outcome-c-amount", ClarityValue::uint(0)),
    ("outcome-d-amount", ClarityValue::uint(0)),
    ("total-invested", ClarityValue::uint(u128::from(on_a + on_b))),
    ("claimed", ClarityValue::bool(claimed)),
  ]))
}

type Handler = dyn Fn(&str, &[ClarityValue]) -> Result<ClarityValue, ReadCallError> + Send + Sync;

/// Reader answering from a closure and recording every function called.
pub struct FakeReader {
  handler: Box<Handler>,
  node_height: Option<u64>,
  calls: Mutex<Vec<String>>,
}

impl FakeReader {
  pub fn new(
    handler: impl Fn(&str, &[ClarityValue]) -> Result<ClarityValue, ReadCallError> + Send + Sync + 'static,
  ) -> Self {
    Self {
      handler: Box::new(handler),
      node_height: None,
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn with_node_height(mut self, height: u64) -> Self {
    self.node_height = Some(height);
    self
  }

  pub fn calls_to(&self, function: &str) -> usize {
    self.calls.lock().unwrap().iter().filter(|f| *f == function).count()
  }
}

/// Id carried by the first `uint` argument.
pub fn id_arg(args: &[ClarityValue]) -> u64 {
  match args.first() {
    Some(ClarityValue::UInt(id)) => u64::try_from(*id).unwrap(),
    _ => panic!("expected a uint id argument"),
  }
}

#[async_trait]
impl ContractReader for FakeReader {
  async fn call_read_only(
    &self,
    function: &str,
    args: &[ClarityValue],
  ) -> Result<ClarityValue, ReadCallError> {
    self.calls.lock().unwrap().push(function.to_string());
    (self.handler)(function, args)
  }

  async fn node_burn_height(&self) -> Result<u64, ReadCallError> {
    self
      .node_height
      .ok_or_else(|| ReadCallError::Transport("node unreachable".into()))
  }
}
