use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{
  OracleDecimals, OracleNegativePrice, OracleStale,
};
use crate::host_clock::HostClock;

/// Decimals of every normalized price.
pub const PRICE_DECIMALS: u8 = 6;

/// Latest round published by a third-party aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct RoundData {
  pub answer: i128,
  pub decimals: u8,
  pub updated_at: i64,
}

impl RoundData {
  #[must_use]
  pub fn new(answer: i128, decimals: u8, updated_at: i64) -> RoundData {
    RoundData {
      answer,
      decimals,
      updated_at,
    }
  }
}

/// Source of reference rounds.
pub trait ReferenceFeed {
  fn latest_round(&self) -> Result<RoundData>;
}

/// A stored round is a feed whose keeper pushes new rounds in place.
impl ReferenceFeed for RoundData {
  fn latest_round(&self) -> Result<RoundData> {
    Ok(*self)
  }
}

/// Validating wrapper that turns reference rounds into 6-decimal prices.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize)]
pub struct ReferenceOracle<F> {
  pub feed: F,
  /// Oldest tolerated round age in seconds, zero disables the check.
  pub max_age_secs: u64,
}

impl<F: ReferenceFeed> ReferenceOracle<F> {
  #[must_use]
  pub fn new(feed: F, max_age_secs: u64) -> ReferenceOracle<F> {
    ReferenceOracle { feed, max_age_secs }
  }

  /// Validated latest answer normalized to 6 decimals.
  /// A zero answer passes through as the unset sentinel.
  pub fn usd_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>> {
    let round = self.feed.latest_round()?;
    validate_round_age(round.updated_at, self.max_age_secs, clock.unix_timestamp())?;
    let answer = validate_answer(round.answer)?;
    normalize(answer, round.decimals).map(UFix64::new)
  }
}

/// Rejects negative answers.
fn validate_answer(answer: i128) -> Result<u128> {
  if answer.is_negative() {
    Err(OracleNegativePrice.into())
  } else {
    Ok(answer.unsigned_abs())
  }
}

/// Ensures `updated_at` lies within `[now - max_age, ...]`.
fn validate_round_age(updated_at: i64, max_age_secs: u64, now: i64) -> Result<()> {
  if max_age_secs == 0 {
    return Ok(());
  }
  let age = now.saturating_sub(updated_at);
  if age <= 0 || age.unsigned_abs() <= max_age_secs {
    Ok(())
  } else {
    Err(OracleStale.into())
  }
}

/// Rescales an answer of arbitrary decimals to 6 decimals, truncating.
fn normalize(answer: u128, decimals: u8) -> Result<u64> {
  let scaled = if decimals >= PRICE_DECIMALS {
    10u128
      .checked_pow(u32::from(decimals - PRICE_DECIMALS))
      .map(|div| answer / div)
  } else {
    10u128
      .checked_pow(u32::from(PRICE_DECIMALS - decimals))
      .and_then(|mul| answer.checked_mul(mul))
  };
  scaled
    .and_then(|price| u64::try_from(price).ok())
    .ok_or(OracleDecimals.into())
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::host_clock::BlockClock;
  use proptest::prelude::*;

  const NOW: i64 = 1_700_000_000;

  #[test]
  fn eight_decimals_floor() -> Result<()> {
    let oracle = ReferenceOracle::new(RoundData::new(220_012_345_678, 8, NOW), 3600);
    let out = oracle.usd_price(&BlockClock::new(1, NOW))?;
    assert_eq!(out, UFix64::new(2_200_123_456));
    Ok(())
  }

  #[test]
  fn low_decimals_scale_up() -> Result<()> {
    let oracle = ReferenceOracle::new(RoundData::new(15, 1, NOW), 0);
    let out = oracle.usd_price(&BlockClock::new(1, NOW))?;
    assert_eq!(out, UFix64::new(1_500_000));
    Ok(())
  }

  #[test]
  fn zero_answer_is_sentinel() -> Result<()> {
    let oracle = ReferenceOracle::new(RoundData::new(0, 8, NOW), 60);
    let out = oracle.usd_price(&BlockClock::new(1, NOW))?;
    assert_eq!(out, UFix64::zero());
    Ok(())
  }

  #[test]
  fn negative_answer() {
    let oracle = ReferenceOracle::new(RoundData::new(-1, 8, NOW), 60);
    let out = oracle.usd_price(&BlockClock::new(1, NOW));
    assert!(out.is_err_and(|e| e == OracleNegativePrice.into()));
  }

  #[test]
  fn stale_round() {
    let oracle = ReferenceOracle::new(RoundData::new(100_000_000, 8, NOW), 60);
    let fresh = oracle.usd_price(&BlockClock::new(1, NOW + 60));
    let stale = oracle.usd_price(&BlockClock::new(1, NOW + 61));
    assert!(fresh.is_ok());
    assert!(stale.is_err_and(|e| e == OracleStale.into()));
  }

  #[test]
  fn decimals_out_of_range() {
    let huge = RoundData::new(i128::MAX, 0, NOW);
    let out = ReferenceOracle::new(huge, 0).usd_price(&BlockClock::new(1, NOW));
    assert!(out.is_err_and(|e| e == OracleDecimals.into()));
  }

  proptest! {
    #[test]
    fn age_window(updated_at in 0i64..NOW, max_age in 1u64..1_000_000) {
      let out = validate_round_age(updated_at, max_age, NOW);
      if (NOW - updated_at).unsigned_abs() > max_age {
        prop_assert_eq!(out, Err(OracleStale.into()));
      } else {
        prop_assert!(out.is_ok());
      }
    }

    #[test]
    fn normalize_eight_decimals(answer in 0u128..u128::from(u64::MAX)) {
      let out = normalize(answer, 8)?;
      prop_assert_eq!(u128::from(out), answer / 100);
    }
  }
}
