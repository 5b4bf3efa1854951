use anchor_lang::prelude::*;

/// Everything a state-mutating pool call reads from outside the pool.
///
/// Prices and the collateral ratio are read once at the start of a call
/// and held for the rest of it.
#[derive(Clone, Copy, Debug)]
pub struct CallContext<'a, P, R, C> {
  pub caller: Pubkey,
  pub clock: &'a C,
  pub prices: &'a P,
  pub ratio: &'a R,
}

impl<'a, P, R, C> CallContext<'a, P, R, C> {
  #[must_use]
  pub fn new(
    caller: Pubkey,
    clock: &'a C,
    prices: &'a P,
    ratio: &'a R,
  ) -> CallContext<'a, P, R, C> {
    CallContext {
      caller,
      clock,
      prices,
      ratio,
    }
  }
}
