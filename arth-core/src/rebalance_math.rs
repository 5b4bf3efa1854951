//! Recollateralization and buyback amounts.
//!
//! Both operations move the pool's collateral value toward its target,
//! `CR * stable_supply`. Recollateralize takes collateral while the pool is
//! short and pays share at a bonus; buyback takes share while the pool is in
//! excess and pays collateral net of a fee.

use crate::conversion::Conversion;
use crate::error::CoreError::{
  BuybackArithmetic, InvalidAmount, NoCollateralShortfall, NoExcessCollateral,
  RecollateralizeArithmetic, TargetCollateralValue,
};
use crate::fee_controller::FeeExtract;
use crate::token_math::mul_fix_floor;

use anchor_lang::prelude::*;
use fix::prelude::*;

/// GMU value of collateral the pool should hold.
///   `target = CR * stable_supply`
pub fn target_collateral_value(
  stable_supply: u128,
  collateral_ratio: UFix64<N6>,
) -> Result<u128> {
  mul_fix_floor(stable_supply, collateral_ratio)
    .ok_or(TargetCollateralValue.into())
}

/// Part of the value above target that buybacks may draw from.
///   `(actual - target) * (1 - buffer)`
///
/// # Errors
/// * Actual value below target
pub fn available_excess_value(
  actual_value: u128,
  target_value: u128,
  buyback_buffer: UFix64<N6>,
) -> Result<u128> {
  let excess = actual_value.checked_sub(target_value).ok_or_else(|| {
    error!(NoExcessCollateral).with_values((actual_value, target_value))
  })?;
  UFix64::<N6>::one()
    .checked_sub(&buyback_buffer)
    .and_then(|keep| mul_fix_floor(excess, keep))
    .ok_or(BuybackArithmetic.into())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecollateralizeQuote {
  pub collateral_used: u128,
  pub value_used: u128,
  pub share_out: u128,
}

/// Share paid for collateral added while the pool is under target.
///
/// ```txt
/// value_used = min(value(COLLATERAL), target - actual)
/// share_out  = value_used * (1 + bonus - recollat_fee) / PRICE_s
/// ```
///
/// # Errors
/// * Zero collateral
/// * Actual value at or above target
pub fn recollateralize(
  conversion: &Conversion,
  collateral_in: u128,
  actual_value: u128,
  target_value: u128,
  bonus_rate: UFix64<N6>,
  recollat_fee: UFix64<N6>,
) -> Result<RecollateralizeQuote> {
  if collateral_in == 0 {
    return Err(InvalidAmount.into());
  }
  let shortfall = target_value
    .checked_sub(actual_value)
    .filter(|s| *s > 0)
    .ok_or_else(|| {
      error!(NoCollateralShortfall).with_values((actual_value, target_value))
    })?;
  let value_in = conversion.collateral_to_value(collateral_in)?;
  let (collateral_used, value_used) = if value_in <= shortfall {
    (collateral_in, value_in)
  } else {
    let capped = conversion.value_to_collateral(shortfall)?;
    (capped, conversion.collateral_to_value(capped)?)
  };
  let rewarded = UFix64::<N6>::one()
    .checked_add(&bonus_rate)
    .and_then(|m| m.checked_sub(&recollat_fee))
    .and_then(|multiplier| mul_fix_floor(value_used, multiplier))
    .ok_or(RecollateralizeArithmetic)?;
  let share_out = conversion.value_to_share(rewarded)?;
  Ok(RecollateralizeQuote {
    collateral_used,
    value_used,
    share_out,
  })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuybackQuote {
  pub share_used: u128,
  pub fees: u128,
  pub collateral_out: u128,
}

/// Collateral paid for share while the pool is over target.
///
/// ```txt
/// value_used     = min(SHARE * PRICE_s, available_excess)
/// collateral_out = value_used * (1 - buyback_fee) / PRICE_c
/// ```
pub fn buy_back_share(
  conversion: &Conversion,
  share_in: u128,
  available_excess: u128,
  buyback_fee: UFix64<N6>,
) -> Result<BuybackQuote> {
  if share_in == 0 {
    return Err(InvalidAmount.into());
  }
  let share_value = conversion.share_to_value(share_in)?;
  let (share_used, value_used) = if share_value <= available_excess {
    (share_in, share_value)
  } else {
    let capped = conversion.value_to_share(available_excess)?;
    (capped, conversion.share_to_value(capped)?)
  };
  let FeeExtract {
    fees_extracted,
    amount_remaining,
  } = FeeExtract::new(buyback_fee, value_used)?;
  let collateral_out = conversion.value_to_collateral(amount_remaining)?;
  Ok(BuybackQuote {
    share_used,
    fees: fees_extracted,
    collateral_out,
  })
}
