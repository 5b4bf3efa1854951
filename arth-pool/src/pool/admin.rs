use anchor_lang::prelude::*;
use arth_core::error::CoreError::InvalidParameters;
use arth_core::pool_parameters::{PoolConfig, PoolParameters};
use fix::prelude::*;
use tracing::info;

use super::CollateralPool;
use crate::auth::{require_admin, require_governance, AuthorizationPolicy};
use crate::ledger::TokenLedger;
use crate::pause::Operation;

impl<L: TokenLedger, A: AuthorizationPolicy> CollateralPool<L, A> {
  /// Flips the pause flag of `op`, returning whether it is now paused.
  pub fn toggle(&mut self, caller: &Pubkey, op: Operation) -> Result<bool> {
    require_governance(&self.authority, caller)?;
    let paused = self.pause.toggle(op);
    info!(target: "arth_pool", caller = %caller, ?op, paused, "toggle pause");
    Ok(paused)
  }

  /// Enables a collateral price used whenever the oracle reports zero.
  pub fn set_price_override(
    &mut self,
    caller: &Pubkey,
    price: UFix64<N6>,
  ) -> Result<()> {
    require_governance(&self.authority, caller)?;
    if price == UFix64::zero() {
      return Err(InvalidParameters.into());
    }
    self.pause.set_price_override(price);
    info!(target: "arth_pool", caller = %caller, price = price.bits, "set price override");
    Ok(())
  }

  pub fn clear_price_override(&mut self, caller: &Pubkey) -> Result<()> {
    require_governance(&self.authority, caller)?;
    self.pause.clear_price_override();
    info!(target: "arth_pool", caller = %caller, "clear price override");
    Ok(())
  }

  /// Replaces every pool parameter from a host config.
  ///
  /// # Errors
  /// * Caller is not owner or governance
  /// * Config fails validation or changes the collateral decimals
  pub fn set_parameters(&mut self, caller: &Pubkey, config: PoolConfig) -> Result<()> {
    require_governance(&self.authority, caller)?;
    let params = PoolParameters::try_from(config)?;
    if params.collateral_decimals != self.params.collateral_decimals {
      return Err(InvalidParameters.into());
    }
    self.params = params;
    info!(target: "arth_pool", caller = %caller, "set pool parameters");
    Ok(())
  }

  pub fn set_stability_fee(&mut self, caller: &Pubkey, fee: UFix64<N6>) -> Result<()> {
    require_admin(&self.authority, caller)?;
    self.params.set_stability_fee(fee)?;
    info!(target: "arth_pool", caller = %caller, fee = fee.bits, "set stability fee");
    Ok(())
  }

  pub fn set_buyback_buffer(
    &mut self,
    caller: &Pubkey,
    buffer: UFix64<N6>,
  ) -> Result<()> {
    require_admin(&self.authority, caller)?;
    self.params.set_buyback_buffer(buffer)?;
    info!(target: "arth_pool", caller = %caller, buffer = buffer.bits, "set buyback buffer");
    Ok(())
  }
}
