//! Market Normalizer - Raw Contract Tuples to Domain Entities
//!
//! Pure functions mapping decoded read-only results onto `Market`,
//! `UserPosition` and friends. Every numeric field tolerates a missing
//! or malformed wire value by defaulting to zero; optional fields are
//! resolved through nested `some`/`ok` layers.

use crate::codec::ClarityValue;
use crate::domain::{
  Market, MarketOdds, Outcome, OutcomeMask, PotentialPayout, UserPosition, UserStats,
};

const DEFAULT_SETTLEMENT_TYPE: &str = "hash-even-odd";

/// Integer view of any value, defaulting to 0.
pub fn normalize_uint(value: &ClarityValue) -> u64 {
  value
    .as_u128_lossy()
    .and_then(|v| u64::try_from(v).ok())
    .unwrap_or(0)
}

fn uint_field(raw: &ClarityValue, name: &str) -> u64 {
  raw.field(name).map_or(0, normalize_uint)
}

fn opt_uint_field(raw: &ClarityValue, name: &str) -> Option<u64> {
  raw
    .field(name)?
    .as_u128_lossy()
    .and_then(|v| u64::try_from(v).ok())
}

fn bool_field(raw: &ClarityValue, name: &str) -> bool {
  raw
    .field(name)
    .and_then(ClarityValue::as_bool_lossy)
    .unwrap_or(false)
}

fn is_tuple(raw: &ClarityValue) -> bool {
  matches!(raw.unwrap_nested(), Some(ClarityValue::Tuple(_)))
}

/// Decode a title or description.
///
/// Plain strings pass through; `0x…` strings and buffers are read one
/// byte per character with zero bytes dropped.
pub fn decode_text(value: &ClarityValue) -> String {
  match value.unwrap_nested() {
    Some(ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s)) => match s.strip_prefix("0x") {
      Some(hex) => hex_to_text(hex),
      None => s.clone(),
    },
    Some(ClarityValue::Buffer(bytes)) => bytes_to_text(bytes),
    _ => String::new(),
  }
}

fn hex_to_text(hex: &str) -> String {
  let bytes: Vec<u8> = hex
    .as_bytes()
    .chunks(2)
    .filter_map(|pair| std::str::from_utf8(pair).ok())
    .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
    .collect();
  bytes_to_text(&bytes)
}

fn bytes_to_text(bytes: &[u8]) -> String {
  bytes
    .iter()
    .filter(|&&b| b != 0)
    .map(|&b| char::from(b))
    .collect()
}

fn text_field(raw: &ClarityValue, name: &str) -> String {
  raw.field(name).map(decode_text).unwrap_or_default()
}

fn principal_field(raw: &ClarityValue, name: &str) -> String {
  match raw.field(name).and_then(ClarityValue::unwrap_nested) {
    Some(ClarityValue::Principal(p)) => p.to_string(),
    Some(ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s)) => s.clone(),
    _ => String::new(),
  }
}

fn hash_field(raw: &ClarityValue, name: &str) -> Option<String> {
  match raw.field(name)?.unwrap_nested()? {
    ClarityValue::Buffer(bytes) => Some(format!("0x{}", hex::encode(bytes))),
    ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s) => Some(s.clone()),
    _ => None,
  }
}

/// Build a `Market` from a `get-market` result.
///
/// Returns `None` when the contract has no market under `id`.
pub fn normalize_market(id: u64, raw: &ClarityValue, current_burn_height: u64) -> Option<Market> {
  if !is_tuple(raw) {
    return None;
  }

  let possible_outcomes = opt_uint_field(raw, "possible-outcomes")
    .filter(|&mask| mask != 0)
    .and_then(|mask| u8::try_from(mask).ok())
    .map_or(OutcomeMask::BINARY, OutcomeMask);

  let settlement_type = Some(text_field(raw, "settlement-type"))
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| DEFAULT_SETTLEMENT_TYPE.to_string());

  Some(Market {
    id,
    creator: principal_field(raw, "creator"),
    title: text_field(raw, "title"),
    description: text_field(raw, "description"),
    settlement_height: uint_field(raw, "settlement-burn-height"),
    settlement_type,
    possible_outcomes,
    total_pool: uint_field(raw, "total-pool"),
    outcome_a_pool: uint_field(raw, "outcome-a-pool"),
    outcome_b_pool: uint_field(raw, "outcome-b-pool"),
    outcome_c_pool: uint_field(raw, "outcome-c-pool"),
    outcome_d_pool: uint_field(raw, "outcome-d-pool"),
    winning_outcome: opt_uint_field(raw, "winning-outcome").and_then(Outcome::from_mask),
    settled: bool_field(raw, "settled"),
    settled_at_burn_height: opt_uint_field(raw, "settled-at-burn-height"),
    settlement_block_hash: hash_field(raw, "settlement-block-hash"),
    created_at_burn_height: uint_field(raw, "created-at-burn-height"),
    created_at_stacks_height: uint_field(raw, "created-at-stacks-height"),
    market_type: possible_outcomes.market_type(),
    current_burn_height,
  })
}

/// Build a `UserPosition` from a `get-user-position` result.
pub fn normalize_position(market_id: u64, raw: &ClarityValue) -> Option<UserPosition> {
  if !is_tuple(raw) {
    return None;
  }
  Some(UserPosition {
    market_id,
    outcome_a_amount: uint_field(raw, "outcome-a-amount"),
    outcome_b_amount: uint_field(raw, "outcome-b-amount"),
    outcome_c_amount: uint_field(raw, "outcome-c-amount"),
    outcome_d_amount: uint_field(raw, "outcome-d-amount"),
    total_invested: uint_field(raw, "total-invested"),
    claimed: bool_field(raw, "claimed"),
  })
}

/// Build `UserStats`; a user the contract has never seen gets zeroes.
pub fn normalize_stats(raw: &ClarityValue) -> UserStats {
  if !is_tuple(raw) {
    return UserStats::default();
  }
  UserStats {
    markets_created: uint_field(raw, "markets-created"),
    total_bets_placed: uint_field(raw, "total-bets-placed"),
    total_winnings: uint_field(raw, "total-winnings"),
    total_losses: uint_field(raw, "total-losses"),
    achievements: uint_field(raw, "achievements"),
  }
}

pub fn normalize_odds(raw: &ClarityValue) -> Option<MarketOdds> {
  if !is_tuple(raw) {
    return None;
  }
  Some(MarketOdds {
    outcome_a_odds: uint_field(raw, "outcome-a-odds"),
    outcome_b_odds: uint_field(raw, "outcome-b-odds"),
    outcome_c_odds: uint_field(raw, "outcome-c-odds"),
    outcome_d_odds: uint_field(raw, "outcome-d-odds"),
    total_pool: uint_field(raw, "total-pool"),
  })
}

pub fn normalize_payout(raw: &ClarityValue) -> Option<PotentialPayout> {
  if !is_tuple(raw) {
    return None;
  }
  Some(PotentialPayout {
    gross_payout: uint_field(raw, "gross-payout"),
    platform_fee: uint_field(raw, "platform-fee"),
    net_payout: uint_field(raw, "net-payout"),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::MarketType;
  use crate::usecases::fixtures::{market_tuple, position_tuple};

  #[test]
  fn test_normalize_open_market() {
    let raw = market_tuple(4, None);
    let market = normalize_market(4, &raw, 900_050).unwrap();

    assert_eq!(market.id, 4);
    assert_eq!(market.title, "Market 4");
    assert_eq!(market.creator, "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
    assert_eq!(market.total_pool, 30_000_000);
    assert_eq!(market.outcome_b_pool, 20_000_000);
    assert_eq!(market.market_type, MarketType::Binary);
    assert_eq!(market.winning_outcome, None);
    assert_eq!(market.settlement_block_hash, None);
    assert_eq!(market.current_burn_height, 900_050);
    assert!(market.pools_consistent());
  }

  #[test]
  fn test_normalize_settled_market() {
    let raw = market_tuple(1, Some(Outcome::B));
    let market = normalize_market(1, &raw, 900_200).unwrap();
    assert!(market.settled);
    assert_eq!(market.winning_outcome, Some(Outcome::B));
    assert_eq!(market.settled_at_burn_height, Some(900_101));
    assert_eq!(market.settlement_block_hash.as_deref(), Some("0x00ff"));
  }

  #[test]
  fn test_unrenderable_creator_does_not_panic() {
    let creator = ClarityValue::Principal(crate::codec::Principal::Standard(
      crate::codec::StandardPrincipal::new(0xff, [0; 20]),
    ));
    let raw = ClarityValue::some(ClarityValue::tuple([("creator", creator)]));
    let market = normalize_market(0, &raw, 0).unwrap();
    assert!(market.creator.starts_with("S?"));
    assert!(raw.to_json().is_object());
  }

  #[test]
  fn test_missing_market_is_none() {
    assert!(normalize_market(9, &ClarityValue::OptionalNone, 0).is_none());
    assert!(normalize_market(9, &ClarityValue::uint(1), 0).is_none());
  }

  #[test]
  fn test_defaults_for_absent_fields() {
    let raw = ClarityValue::some(ClarityValue::tuple([("title", ClarityValue::string_utf8("t"))]));
    let market = normalize_market(0, &raw, 0).unwrap();
    assert_eq!(market.possible_outcomes, OutcomeMask::BINARY);
    assert_eq!(market.settlement_type, "hash-even-odd");
    assert_eq!(market.total_pool, 0);
    assert!(!market.settled);
  }

  #[test]
  fn test_multi_market_type_from_mask() {
    let raw = ClarityValue::some(ClarityValue::tuple([(
      "possible-outcomes",
      ClarityValue::uint(15),
    )]));
    let market = normalize_market(0, &raw, 0).unwrap();
    assert_eq!(market.market_type, MarketType::Multi);
  }

  #[test]
  fn test_decode_text_variants() {
    assert_eq!(decode_text(&ClarityValue::string_utf8("Plain")), "Plain");
    assert_eq!(decode_text(&ClarityValue::string_utf8("0x4869")), "Hi");
    assert_eq!(decode_text(&ClarityValue::Buffer(vec![0x48, 0, 0x69])), "Hi");
  }

  #[test]
  fn test_decode_empty_and_zero_hex() {
    assert_eq!(decode_text(&ClarityValue::string_utf8("0x")), "");
    assert_eq!(decode_text(&ClarityValue::string_utf8("0x000000")), "");
    assert_eq!(decode_text(&ClarityValue::Buffer(vec![0; 8])), "");
  }

  #[test]
  fn test_numeric_strings_and_garbage() {
    let raw = ClarityValue::tuple([
      ("total-pool", ClarityValue::StringAscii("42".into())),
      ("outcome-a-pool", ClarityValue::StringAscii("lots".into())),
    ]);
    let market = normalize_market(0, &raw, 0).unwrap();
    assert_eq!(market.total_pool, 42);
    assert_eq!(market.outcome_a_pool, 0);
  }

  #[test]
  fn test_normalize_position() {
    let raw = position_tuple(0, 5_000_000, false);
    let position = normalize_position(3, &raw).unwrap();
    assert_eq!(position.market_id, 3);
    assert_eq!(position.outcome_b_amount, 5_000_000);
    assert!(position.invested_consistent());
    assert!(normalize_position(3, &ClarityValue::OptionalNone).is_none());
  }

  #[test]
  fn test_stats_absent_is_zeroed() {
    assert_eq!(normalize_stats(&ClarityValue::OptionalNone), UserStats::default());
    let raw = ClarityValue::some(ClarityValue::tuple([(
      "total-bets-placed",
      ClarityValue::uint(15_000_000),
    )]));
    assert_eq!(normalize_stats(&raw).total_bets_placed, 15_000_000);
  }

  #[test]
  fn test_odds_and_payout() {
    let odds = ClarityValue::ok(ClarityValue::tuple([
      ("outcome-a-odds", ClarityValue::uint(30_000)),
      ("total-pool", ClarityValue::uint(30_000_000)),
    ]));
    let odds = normalize_odds(&odds).unwrap();
    assert_eq!(odds.scaled(Outcome::A), 30_000);
    assert_eq!(odds.total_pool, 30_000_000);

    let payout = ClarityValue::ok(ClarityValue::tuple([
      ("gross-payout", ClarityValue::uint(13_333_333)),
      ("platform-fee", ClarityValue::uint(399_999)),
      ("net-payout", ClarityValue::uint(12_933_334)),
    ]));
    assert_eq!(normalize_payout(&payout).unwrap().net_payout, 12_933_334);
    assert!(normalize_payout(&ClarityValue::ResponseErr(Box::new(ClarityValue::uint(1001)))).is_none());
  }
}
