//! Uniform `quote(amount) -> amount` interface over the pool's price feeds.
//!
//! Two feed kinds live here: a settable [`SimpleOracle`] and a fixed-window
//! [`TwapOracle`] over cumulative-price observations of a constant-product
//! pair. [`FeedAdapter`] wraps both so a price path can persist either one.
//! Third-party round feeds are in [`crate::reference_feed`].

use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{
  FeedKindMismatch, PriceComposition, TwapArithmetic, TwapPeriodNotElapsed,
  TwapUninitialized, Unauthorized,
};
use crate::token_math::{mul_div_floor, mul_fix_floor};

/// Scale of TWAP cumulative prices and averages (`1e18`).
pub const TWAP_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Converts an amount of one asset into the amount of another.
pub trait PriceFeed {
  fn quote(&self, amount_in: u128) -> Result<u128>;
}

/// A 6-decimal price set directly by its owner.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct SimpleOracle {
  price: UFixValue64,
  owner: Pubkey,
}

impl SimpleOracle {
  #[must_use]
  pub fn new(price: UFix64<N6>, owner: Pubkey) -> SimpleOracle {
    SimpleOracle {
      price: price.into(),
      owner,
    }
  }

  pub fn price(&self) -> Result<UFix64<N6>> {
    self.price.try_into()
  }

  #[must_use]
  pub fn owner(&self) -> Pubkey {
    self.owner
  }

  /// Replaces the stored price.
  ///
  /// # Errors
  /// * Caller is not the oracle owner
  pub fn set_price(&mut self, caller: &Pubkey, price: UFix64<N6>) -> Result<()> {
    if *caller == self.owner {
      self.price = price.into();
      Ok(())
    } else {
      Err(Unauthorized.into())
    }
  }
}

impl PriceFeed for SimpleOracle {
  /// `amount * price / 1e6`
  fn quote(&self, amount_in: u128) -> Result<u128> {
    mul_fix_floor(amount_in, self.price()?).ok_or(PriceComposition.into())
  }
}

/// Cumulative price reading taken from a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PairObservation {
  /// Sum of `price * seconds`, 1e18-scaled, free to wrap.
  pub price_cumulative: u128,
  pub timestamp: i64,
}

impl PairObservation {
  #[must_use]
  pub fn new(price_cumulative: u128, timestamp: i64) -> PairObservation {
    PairObservation {
      price_cumulative,
      timestamp,
    }
  }
}

/// Fixed-window time-weighted average price.
///
/// The average only moves when a keeper calls [`TwapOracle::update`] at
/// least `period_secs` after the previous observation.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct TwapOracle {
  period_secs: u64,
  last: Option<PairObservation>,
  average: Option<u128>,
}

impl TwapOracle {
  #[must_use]
  pub fn new(period_secs: u64) -> TwapOracle {
    TwapOracle {
      period_secs,
      last: None,
      average: None,
    }
  }

  /// Builds an oracle with a known average, e.g. when migrating state.
  #[must_use]
  pub fn seeded(
    period_secs: u64,
    last: PairObservation,
    average: u128,
  ) -> TwapOracle {
    TwapOracle {
      period_secs,
      last: Some(last),
      average: Some(average),
    }
  }

  #[must_use]
  pub fn period_secs(&self) -> u64 {
    self.period_secs
  }

  #[must_use]
  pub fn average(&self) -> Option<u128> {
    self.average
  }

  #[must_use]
  pub fn last_observation(&self) -> Option<PairObservation> {
    self.last
  }

  /// Folds a new observation into the average.
  ///
  /// ```txt
  /// average = (cumulative_now - cumulative_last) / (t_now - t_last)
  /// ```
  ///
  /// # Errors
  /// * Fewer than `period_secs` since the last observation
  /// * Observation timestamp runs backwards
  pub fn update(&mut self, observation: PairObservation) -> Result<()> {
    match self.last {
      None => {
        self.last = Some(observation);
        Ok(())
      }
      Some(last) => {
        let elapsed = observation
          .timestamp
          .checked_sub(last.timestamp)
          .filter(|e| e.is_positive())
          .map(i64::unsigned_abs)
          .ok_or(TwapPeriodNotElapsed)?;
        if elapsed < self.period_secs {
          return Err(TwapPeriodNotElapsed.into());
        }
        let average = observation
          .price_cumulative
          .wrapping_sub(last.price_cumulative)
          .checked_div(u128::from(elapsed))
          .ok_or(TwapArithmetic)?;
        self.average = Some(average);
        self.last = Some(observation);
        Ok(())
      }
    }
  }
}

impl PriceFeed for TwapOracle {
  /// `amount * average / 1e18`
  fn quote(&self, amount_in: u128) -> Result<u128> {
    let average = self.average.ok_or(TwapUninitialized)?;
    mul_div_floor(amount_in, average, TWAP_PRECISION)
      .ok_or(TwapArithmetic.into())
  }
}

/// Any feed a price path may read from.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub enum FeedAdapter {
  Simple(SimpleOracle),
  Twap(TwapOracle),
}

impl PriceFeed for FeedAdapter {
  fn quote(&self, amount_in: u128) -> Result<u128> {
    match self {
      FeedAdapter::Simple(feed) => feed.quote(amount_in),
      FeedAdapter::Twap(feed) => feed.quote(amount_in),
    }
  }
}

impl FeedAdapter {
  /// Sets the price of a simple feed.
  ///
  /// # Errors
  /// * Feed is a TWAP, which only moves through observations
  /// * Caller is not the oracle owner
  pub fn set_price(&mut self, caller: &Pubkey, price: UFix64<N6>) -> Result<()> {
    match self {
      FeedAdapter::Simple(feed) => feed.set_price(caller, price),
      FeedAdapter::Twap(_) => Err(FeedKindMismatch.into()),
    }
  }

  /// Feeds a pair observation to a TWAP.
  ///
  /// # Errors
  /// * Feed is a simple oracle
  /// * TWAP update validations
  pub fn observe(&mut self, observation: PairObservation) -> Result<()> {
    match self {
      FeedAdapter::Twap(feed) => feed.update(observation),
      FeedAdapter::Simple(_) => Err(FeedKindMismatch.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use proptest::prelude::*;

  const ETH: u128 = 1_000_000_000_000_000_000;

  fn owner() -> Pubkey {
    Pubkey::new_from_array([7; 32])
  }

  #[test]
  fn simple_quote() -> Result<()> {
    let oracle = SimpleOracle::new(UFix64::new(940_000), owner());
    assert_eq!(oracle.quote(ETH)?, 940_000_000_000_000_000);
    Ok(())
  }

  #[test]
  fn simple_set_price_owner_only() -> Result<()> {
    let mut oracle = SimpleOracle::new(UFix64::one(), owner());
    let stranger = Pubkey::new_from_array([8; 32]);
    let denied = oracle.set_price(&stranger, UFix64::new(5));
    assert!(denied.is_err_and(|e| e == Unauthorized.into()));
    oracle.set_price(&owner(), UFix64::new(2_000_000))?;
    assert_eq!(oracle.price()?, UFix64::new(2_000_000));
    Ok(())
  }

  #[test]
  fn twap_uninitialized() {
    let mut twap = TwapOracle::new(3600);
    assert!(twap.quote(ETH).is_err_and(|e| e == TwapUninitialized.into()));
    // First observation only anchors the window
    let first = twap.update(PairObservation::new(0, 1_000));
    assert!(first.is_ok());
    assert!(twap.quote(ETH).is_err_and(|e| e == TwapUninitialized.into()));
  }

  #[test]
  fn twap_period_gate() -> Result<()> {
    let mut twap = TwapOracle::new(3600);
    twap.update(PairObservation::new(0, 1_000))?;
    let early = twap.update(PairObservation::new(ETH, 4_599));
    assert!(early.is_err_and(|e| e == TwapPeriodNotElapsed.into()));
    let backwards = twap.update(PairObservation::new(ETH, 999));
    assert!(backwards.is_err_and(|e| e == TwapPeriodNotElapsed.into()));
    Ok(())
  }

  #[test]
  fn twap_average_and_quote() -> Result<()> {
    let mut twap = TwapOracle::new(3600);
    twap.update(PairObservation::new(0, 1_000))?;
    // Constant 0.94 price over the whole window
    let cumulative = 940_000_000_000_000_000 * 3600;
    twap.update(PairObservation::new(cumulative, 4_600))?;
    assert_eq!(twap.average(), Some(940_000_000_000_000_000));
    assert_eq!(twap.quote(ETH)?, 940_000_000_000_000_000);
    Ok(())
  }

  #[test]
  fn twap_cumulative_wraps() -> Result<()> {
    let start = u128::MAX - 500;
    let mut twap = TwapOracle::new(10);
    twap.update(PairObservation::new(start, 0))?;
    // 1001 of accumulation crosses the u128 boundary
    twap.update(PairObservation::new(start.wrapping_add(1_001), 11))?;
    assert_eq!(twap.average(), Some(91));
    Ok(())
  }

  #[test]
  fn adapter_dispatch() -> Result<()> {
    let mut simple = FeedAdapter::Simple(SimpleOracle::new(UFix64::one(), owner()));
    let mut twap = FeedAdapter::Twap(TwapOracle::seeded(
      60,
      PairObservation::new(0, 0),
      2 * TWAP_PRECISION,
    ));
    assert_eq!(simple.quote(5)?, 5);
    assert_eq!(twap.quote(5)?, 10);
    simple.set_price(&owner(), UFix64::new(3_000_000))?;
    assert_eq!(simple.quote(5)?, 15);
    let set = twap.set_price(&owner(), UFix64::one());
    assert!(set.is_err_and(|e| e == FeedKindMismatch.into()));
    let observe = simple.observe(PairObservation::new(0, 100));
    assert!(observe.is_err_and(|e| e == FeedKindMismatch.into()));
    Ok(())
  }

  proptest! {
    #[test]
    fn simple_quote_floors(amount in 0u128..u128::from(u64::MAX), price in 1u64..10_000_000_000) {
      let oracle = SimpleOracle::new(UFix64::new(price), owner());
      let out = oracle.quote(amount)?;
      prop_assert_eq!(out, amount * u128::from(price) / 1_000_000);
    }
  }
}
