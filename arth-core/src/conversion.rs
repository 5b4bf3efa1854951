use crate::error::CoreError::{
  CollateralToValue, ShareToValue, ValueToCollateral, ValueToShare,
};
use crate::token_math::{div_fix_floor, mul_div_floor, mul_fix_floor, PRECISION};

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Provides conversions between pool assets and GMU value (18 decimals).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conversion {
  pub collateral_price: UFix64<N6>,
  pub share_price: UFix64<N6>,
  /// `10^missing_decimals` of the collateral asset.
  pub collateral_scale: u128,
}

impl Conversion {
  #[must_use]
  pub fn new(
    collateral_price: UFix64<N6>,
    share_price: UFix64<N6>,
    collateral_scale: u128,
  ) -> Self {
    Conversion {
      collateral_price,
      share_price,
      collateral_scale,
    }
  }

  fn scaled_collateral_price(&self) -> Option<u128> {
    u128::from(self.collateral_price.bits).checked_mul(self.collateral_scale)
  }

  /// GMU value of a collateral amount.
  ///   `COLLATERAL * 10^missing * PRICE / 1e6`
  pub fn collateral_to_value(&self, amount_collateral: u128) -> Result<u128> {
    self
      .scaled_collateral_price()
      .and_then(|price| mul_div_floor(amount_collateral, price, PRECISION))
      .ok_or(CollateralToValue.into())
  }

  /// Collateral amount worth a GMU value, in collateral base units.
  ///   `VALUE * 1e6 / PRICE / 10^missing`
  pub fn value_to_collateral(&self, value: u128) -> Result<u128> {
    self
      .scaled_collateral_price()
      .and_then(|price| mul_div_floor(value, PRECISION, price))
      .ok_or(ValueToCollateral.into())
  }

  /// GMU value of a share amount.
  pub fn share_to_value(&self, amount_share: u128) -> Result<u128> {
    mul_fix_floor(amount_share, self.share_price).ok_or(ShareToValue.into())
  }

  /// Share amount worth a GMU value.
  pub fn value_to_share(&self, value: u128) -> Result<u128> {
    div_fix_floor(value, self.share_price).ok_or(ValueToShare.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::util::proptest::*;
  use proptest::prelude::*;

  const ETH: u128 = 1_000_000_000_000_000_000;

  #[test]
  fn collateral_value_18_decimals() -> Result<()> {
    let conversion = Conversion::new(UFix64::new(1_063_829), UFix64::one(), 1);
    assert_eq!(conversion.collateral_to_value(ETH)?, 1_063_829_000_000_000_000);
    Ok(())
  }

  #[test]
  fn collateral_value_6_decimals() -> Result<()> {
    let conversion =
      Conversion::new(UFix64::new(2_340_425_531), UFix64::one(), 1_000_000_000_000);
    // 1.5 units of a 6-decimal collateral
    let value = conversion.collateral_to_value(1_500_000)?;
    assert_eq!(value, 3_510_638_296_500_000_000_000);
    // Floors back down to base units
    assert_eq!(conversion.value_to_collateral(value)?, 1_500_000);
    assert_eq!(conversion.value_to_collateral(value - 1)?, 1_499_999);
    Ok(())
  }

  #[test]
  fn share_conversions() -> Result<()> {
    let conversion = Conversion::new(UFix64::one(), UFix64::new(2_500_000), 1);
    assert_eq!(conversion.share_to_value(4 * ETH)?, 10 * ETH);
    assert_eq!(conversion.value_to_share(10 * ETH)?, 4 * ETH);
    Ok(())
  }

  #[test]
  fn zero_prices() {
    let conversion = Conversion::new(UFix64::zero(), UFix64::zero(), 1);
    assert_eq!(conversion.collateral_to_value(ETH).ok(), Some(0));
    assert_eq!(conversion.value_to_collateral(ETH).err(), Some(ValueToCollateral.into()));
    assert_eq!(conversion.value_to_share(ETH).err(), Some(ValueToShare.into()));
  }

  proptest! {
    #[test]
    fn collateral_roundtrip_never_gains(
      price in collateral_price(),
      amount in token_amount(),
    ) {
      let conversion = Conversion::new(price, UFix64::one(), 1);
      let value = conversion.collateral_to_value(amount)?;
      let back = conversion.value_to_collateral(value)?;
      prop_assert!(back <= amount);
    }

    #[test]
    fn share_roundtrip_within_tolerance(
      price in share_price(),
      amount in token_amount(),
    ) {
      let conversion = Conversion::new(UFix64::one(), price, 1);
      let value = conversion.share_to_value(amount)?;
      let back = conversion.value_to_share(value)?;
      prop_assert!(back <= amount);
      // Loss bounded by one GMU base unit worth of share plus one
      prop_assert!(amount - back <= 1_000_000 / u128::from(price.bits) + 1);
    }
  }
}
