//! Wide-intermediate arithmetic for raw `u128` token amounts.
//!
//! Token amounts carry 18 decimals, so a product of an amount with a price
//! or ratio can leave `u128`. Every product here is formed in [`U256`] and
//! divided back down before narrowing.

use fix::prelude::*;
use uint::construct_uint;

construct_uint! {
  /// 256-bit unsigned integer for intermediate products.
  pub struct U256(4);
}

/// Denominator of every 6-decimal price, ratio and fee (`1e6`).
pub const PRECISION: u128 = 1_000_000;

/// Decimals of the stable and share tokens.
pub const TOKEN_DECIMALS: u8 = 18;

fn narrow(wide: U256) -> Option<u128> {
  (wide <= U256::from(u128::MAX)).then(|| wide.low_u128())
}

/// `floor(a * b / denom)`
#[must_use]
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Option<u128> {
  if denom == 0 {
    None
  } else {
    let product = U256::from(a).checked_mul(U256::from(b))?;
    narrow(product / U256::from(denom))
  }
}

/// `ceil(a * b / denom)`
#[must_use]
pub fn mul_div_ceil(a: u128, b: u128, denom: u128) -> Option<u128> {
  if denom == 0 {
    None
  } else {
    let product = U256::from(a).checked_mul(U256::from(b))?;
    let (quotient, remainder) = product.div_mod(U256::from(denom));
    if remainder.is_zero() {
      narrow(quotient)
    } else {
      narrow(quotient.checked_add(U256::one())?)
    }
  }
}

/// Multiplies an amount by a 6-decimal factor, rounding down.
///   `floor(amount * factor / 1e6)`
#[must_use]
pub fn mul_fix_floor(amount: u128, factor: UFix64<N6>) -> Option<u128> {
  mul_div_floor(amount, u128::from(factor.bits), PRECISION)
}

/// Multiplies an amount by a 6-decimal factor, rounding up.
#[must_use]
pub fn mul_fix_ceil(amount: u128, factor: UFix64<N6>) -> Option<u128> {
  mul_div_ceil(amount, u128::from(factor.bits), PRECISION)
}

/// Divides an amount by a 6-decimal factor, rounding down.
///   `floor(amount * 1e6 / factor)`
#[must_use]
pub fn div_fix_floor(amount: u128, factor: UFix64<N6>) -> Option<u128> {
  mul_div_floor(amount, PRECISION, u128::from(factor.bits))
}

/// `10^exp` for token decimal scaling.
#[must_use]
pub fn pow10(exp: u8) -> Option<u128> {
  10u128.checked_pow(u32::from(exp))
}
