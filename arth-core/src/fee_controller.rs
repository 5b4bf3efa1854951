use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{FeeExtraction, StabilityFee};
use crate::token_math::{mul_fix_ceil, mul_fix_floor};

/// Combines fee multiplication for a token amount with the remaining token
/// amount by subtraction. Rounding the fee up makes the remainder equal to
/// `floor(amount * (1 - fee))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeExtract {
  pub fees_extracted: u128,
  pub amount_remaining: u128,
}

impl FeeExtract {
  pub fn new(fee: UFix64<N6>, amount_in: u128) -> Result<FeeExtract> {
    if fee > UFix64::one() {
      return Err(FeeExtraction.into());
    }
    let fees_extracted = mul_fix_ceil(amount_in, fee).ok_or(FeeExtraction)?;
    let amount_remaining = amount_in
      .checked_sub(fees_extracted)
      .ok_or(FeeExtraction)?;
    Ok(FeeExtract {
      fees_extracted,
      amount_remaining,
    })
  }
}

/// GMU value of the stability fee on a stable amount, rounded down.
///   `floor(stable * stability_fee)`
///
/// The caller converts it to fee tokens through the fee token's feed, see
/// [`crate::price_resolver::PriceSource::fee_token_amount`].
pub fn stability_fee_value(
  amount_stable: u128,
  stability_fee: UFix64<N6>,
) -> Result<u128> {
  mul_fix_floor(amount_stable, stability_fee).ok_or(StabilityFee.into())
}
