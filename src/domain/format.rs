//! Display helpers and the local payout estimate.
//!
//! Amount math runs on `Decimal` so micro-STX conversions never pick
//! up binary floating-point error.

use rust_decimal::prelude::*;

use super::constants::{
    BPS_DENOMINATOR, MICRO_STX_PER_STX, MINUTES_PER_BURN_BLOCK, PLATFORM_FEE_BPS,
};
use super::market::{Market, MarketType, Outcome, PotentialPayout};

/// Format micro-STX as STX with at most two decimals and thousands separators.
///
/// `1_234_567_891` → `"1,234.57"`, `5_000_000` → `"5"`.
pub fn format_stx(micro_stx: u64) -> String {
    let stx = (Decimal::from(micro_stx) / Decimal::from(MICRO_STX_PER_STX))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let text = stx.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// Convert an STX amount to micro-STX, flooring sub-micro fractions.
///
/// Negative or overflowing amounts yield `None`.
pub fn stx_to_micro(stx: Decimal) -> Option<u64> {
    if stx.is_sign_negative() {
        return None;
    }
    (stx * Decimal::from(MICRO_STX_PER_STX)).floor().to_u64()
}

/// Rough wall-clock countdown for a number of Bitcoin blocks.
pub fn format_blocks_to_time(blocks: u64) -> String {
    let minutes = blocks.saturating_mul(MINUTES_PER_BURN_BLOCK);
    if minutes < 60 {
        format!("{minutes} min")
    } else if minutes < 1440 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{}d {}h", minutes / 1440, (minutes % 1440) / 60)
    }
}

pub fn outcome_label(outcome: Outcome, market_type: MarketType) -> &'static str {
    match (market_type, outcome) {
        (MarketType::Binary, Outcome::A) => "Yes (Even)",
        (MarketType::Binary, Outcome::B) => "No (Odd)",
        (MarketType::Binary, _) => "Unknown",
        (MarketType::Multi, Outcome::A) => "Outcome A",
        (MarketType::Multi, Outcome::B) => "Outcome B",
        (MarketType::Multi, Outcome::C) => "Outcome C",
        (MarketType::Multi, Outcome::D) => "Outcome D",
    }
}

/// Pari-mutuel payout estimate for a prospective bet, before it lands.
///
/// gross = bet × (total + bet) / (pool + bet); fee = 3% of gross.
/// The contract's `calculate-potential-payout` is authoritative.
pub fn estimate_payout(market: &Market, outcome: Outcome, bet_micro: u64) -> PotentialPayout {
    let bet = Decimal::from(bet_micro);
    let new_pool = Decimal::from(market.pool(outcome)) + bet;
    let new_total = Decimal::from(market.total_pool) + bet;

    if new_pool.is_zero() {
        return PotentialPayout::default();
    }

    let gross = (bet * new_total / new_pool).floor();
    let fee = (gross * Decimal::from(PLATFORM_FEE_BPS) / Decimal::from(BPS_DENOMINATOR)).floor();
    let net = gross - fee;

    PotentialPayout {
        gross_payout: gross.to_u64().unwrap_or(0),
        platform_fee: fee.to_u64().unwrap_or(0),
        net_payout: net.to_u64().unwrap_or(0),
    }
}
