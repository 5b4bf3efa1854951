//! Mint and redeem amounts for each collateral ratio band.
//!
//! All functions are pure: they read prices through a [`Conversion`], take
//! the ratio band and fee, and return a quote the engine later applies.

use crate::collateral_ratio::RatioBand;
use crate::conversion::Conversion;
use crate::error::CoreError::{
  InputOutOfBand, InvalidAmount, MintArithmetic, RedeemArithmetic,
  ShareUndersupplied,
};
use crate::fee_controller::FeeExtract;
use crate::token_math::{mul_div_floor, mul_fix_floor, PRECISION};

use anchor_lang::prelude::*;
use fix::prelude::*;

/// Outcome of a mint computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MintQuote {
  /// Collateral moved into custody.
  pub collateral_in: u128,
  /// Share burned from the caller.
  pub share_burned: u128,
  pub stable_before_fee: u128,
  pub fees: u128,
  pub stable_out: u128,
}

impl MintQuote {
  fn with_fee(
    collateral_in: u128,
    share_burned: u128,
    stable_before_fee: u128,
    minting_fee: UFix64<N6>,
  ) -> Result<MintQuote> {
    let FeeExtract {
      fees_extracted,
      amount_remaining,
    } = FeeExtract::new(minting_fee, stable_before_fee)?;
    Ok(MintQuote {
      collateral_in,
      share_burned,
      stable_before_fee,
      fees: fees_extracted,
      stable_out: amount_remaining,
    })
  }
}

/// Outcome of a redeem computation, before anything is paid out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedeemQuote {
  pub stable_in: u128,
  pub fees: u128,
  pub collateral_out: u128,
  pub share_out: u128,
}

/// Fully collateralized mint.
///   `stable = floor(COLLATERAL * PRICE) * (1 - fee)`
pub fn mint_1t1(
  conversion: &Conversion,
  collateral_in: u128,
  minting_fee: UFix64<N6>,
) -> Result<MintQuote> {
  if collateral_in == 0 {
    return Err(InvalidAmount.into());
  }
  let value = conversion.collateral_to_value(collateral_in)?;
  MintQuote::with_fee(collateral_in, 0, value, minting_fee)
}

/// Fully algorithmic mint, burning all supplied share.
///   `stable = floor(SHARE * PRICE) * (1 - fee)`
pub fn mint_algorithmic(
  conversion: &Conversion,
  share_in: u128,
  minting_fee: UFix64<N6>,
) -> Result<MintQuote> {
  if share_in == 0 {
    return Err(InvalidAmount.into());
  }
  let value = conversion.share_to_value(share_in)?;
  MintQuote::with_fee(0, share_in, value, minting_fee)
}

/// Fractional mint. The collateral leg sets the size; the share leg must
/// cover the rest of the value at the current ratio.
///
/// ```txt
/// collateral_value = COLLATERAL * PRICE_c
/// total_value      = collateral_value / CR
/// share_value      = total_value - collateral_value
/// share_needed     = share_value / PRICE_s
/// stable           = (collateral_value + share_value) * (1 - fee)
/// ```
///
/// # Errors
/// * `share_in` below `share_needed`, reporting both
pub fn mint_fractional(
  conversion: &Conversion,
  collateral_ratio: UFix64<N6>,
  collateral_in: u128,
  share_in: u128,
  minting_fee: UFix64<N6>,
) -> Result<MintQuote> {
  if collateral_in == 0 {
    return Err(InvalidAmount.into());
  }
  let collateral_value = conversion.collateral_to_value(collateral_in)?;
  let total_value = mul_div_floor(
    collateral_value,
    PRECISION,
    u128::from(collateral_ratio.bits),
  )
  .ok_or(MintArithmetic)?;
  let share_value = total_value
    .checked_sub(collateral_value)
    .ok_or(MintArithmetic)?;
  let share_needed = conversion.value_to_share(share_value)?;
  if share_in < share_needed {
    return Err(error!(ShareUndersupplied).with_values((share_in, share_needed)));
  }
  let stable_before_fee = collateral_value
    .checked_add(share_value)
    .ok_or(MintArithmetic)?;
  MintQuote::with_fee(collateral_in, share_needed, stable_before_fee, minting_fee)
}

/// Picks the mint formula for a band, rejecting inputs the band ignores.
pub fn mint_for_band(
  band: RatioBand,
  conversion: &Conversion,
  collateral_in: u128,
  share_in: u128,
  minting_fee: UFix64<N6>,
) -> Result<MintQuote> {
  match band {
    RatioBand::Full if share_in > 0 => Err(InputOutOfBand.into()),
    RatioBand::Full => mint_1t1(conversion, collateral_in, minting_fee),
    RatioBand::Algorithmic if collateral_in > 0 => Err(InputOutOfBand.into()),
    RatioBand::Algorithmic => mint_algorithmic(conversion, share_in, minting_fee),
    RatioBand::Fractional(ratio) => {
      mint_fractional(conversion, ratio, collateral_in, share_in, minting_fee)
    }
  }
}

fn stable_after_fee(stable_in: u128, redemption_fee: UFix64<N6>) -> Result<FeeExtract> {
  if stable_in == 0 {
    Err(InvalidAmount.into())
  } else {
    FeeExtract::new(redemption_fee, stable_in)
  }
}

/// Fully collateralized redeem.
///   `collateral = floor(STABLE * (1 - fee)) / PRICE_c`
pub fn redeem_1t1(
  conversion: &Conversion,
  stable_in: u128,
  redemption_fee: UFix64<N6>,
) -> Result<RedeemQuote> {
  let fee = stable_after_fee(stable_in, redemption_fee)?;
  let collateral_out = conversion.value_to_collateral(fee.amount_remaining)?;
  Ok(RedeemQuote {
    stable_in,
    fees: fee.fees_extracted,
    collateral_out,
    share_out: 0,
  })
}

/// Fully algorithmic redeem.
///   `share = floor(STABLE * (1 - fee)) / PRICE_s`
pub fn redeem_algorithmic(
  conversion: &Conversion,
  stable_in: u128,
  redemption_fee: UFix64<N6>,
) -> Result<RedeemQuote> {
  let fee = stable_after_fee(stable_in, redemption_fee)?;
  let share_out = conversion.value_to_share(fee.amount_remaining)?;
  Ok(RedeemQuote {
    stable_in,
    fees: fee.fees_extracted,
    collateral_out: 0,
    share_out,
  })
}

/// Fractional redeem, splitting the post-fee value by the ratio.
///
/// ```txt
/// value            = STABLE * (1 - fee)
/// collateral_value = value * CR
/// share_value      = value - collateral_value
/// ```
pub fn redeem_fractional(
  conversion: &Conversion,
  collateral_ratio: UFix64<N6>,
  stable_in: u128,
  redemption_fee: UFix64<N6>,
) -> Result<RedeemQuote> {
  let fee = stable_after_fee(stable_in, redemption_fee)?;
  let value = fee.amount_remaining;
  let collateral_value =
    mul_fix_floor(value, collateral_ratio).ok_or(RedeemArithmetic)?;
  let share_value = value
    .checked_sub(collateral_value)
    .ok_or(RedeemArithmetic)?;
  Ok(RedeemQuote {
    stable_in,
    fees: fee.fees_extracted,
    collateral_out: conversion.value_to_collateral(collateral_value)?,
    share_out: conversion.value_to_share(share_value)?,
  })
}

/// Picks the redeem formula for a band.
pub fn redeem_for_band(
  band: RatioBand,
  conversion: &Conversion,
  stable_in: u128,
  redemption_fee: UFix64<N6>,
) -> Result<RedeemQuote> {
  match band {
    RatioBand::Full => redeem_1t1(conversion, stable_in, redemption_fee),
    RatioBand::Algorithmic => {
      redeem_algorithmic(conversion, stable_in, redemption_fee)
    }
    RatioBand::Fractional(ratio) => {
      redeem_fractional(conversion, ratio, stable_in, redemption_fee)
    }
  }
}
