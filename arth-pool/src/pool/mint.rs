use anchor_lang::prelude::*;
use arth_core::collateral_ratio::{RatioBand, RatioSource};
use arth_core::error::CoreError::{CeilingExceeded, InvalidAmount, MintArithmetic};
use arth_core::exchange_math::mint_for_band;
use arth_core::host_clock::HostClock;
use arth_core::price_resolver::PriceSource;
use arth_core::slippage::MinimumOut;
use tracing::info;

use super::{CollateralPool, MintReceipt};
use crate::auth::AuthorizationPolicy;
use crate::context::CallContext;
use crate::ledger::{Batch, TokenLedger};
use crate::pause::Operation;

impl<L: TokenLedger, A: AuthorizationPolicy> CollateralPool<L, A> {
  /// Mints stable with the formula the current collateral ratio selects.
  ///
  /// Collateral is pulled through the caller's allowance to the pool
  /// account. Share is burned from the caller, only as much as the ratio
  /// requires. A non-zero stability fee is burned in fee tokens through the
  /// caller's fee-token allowance.
  ///
  /// # Errors
  /// * Minting paused
  /// * Inputs the band does not accept
  /// * Collateral ceiling exceeded
  /// * Stable output below `min_stable_out`
  /// * Ledger failures
  pub fn mint<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    collateral_in: u128,
    share_in: u128,
    min_stable_out: u128,
  ) -> Result<MintReceipt> {
    self.pause.ensure_active(Operation::Mint)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    self.execute_mint(ctx, band, collateral_in, share_in, min_stable_out)
  }

  /// Mint that only runs while the pool is fully collateralized.
  pub fn mint_1t1<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    collateral_in: u128,
    min_stable_out: u128,
  ) -> Result<MintReceipt> {
    self.pause.ensure_active(Operation::Mint)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_full()?;
    self.execute_mint(ctx, band, collateral_in, 0, min_stable_out)
  }

  /// Mint that only runs while the ratio is strictly between 0 and 1.
  pub fn mint_fractional<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    collateral_in: u128,
    share_in: u128,
    min_stable_out: u128,
  ) -> Result<MintReceipt> {
    self.pause.ensure_active(Operation::Mint)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_fractional()?;
    self.execute_mint(ctx, band, collateral_in, share_in, min_stable_out)
  }

  /// Mint that only runs while the ratio is zero.
  pub fn mint_algorithmic<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    share_in: u128,
    min_stable_out: u128,
  ) -> Result<MintReceipt> {
    self.pause.ensure_active(Operation::Mint)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_algorithmic()?;
    self.execute_mint(ctx, band, 0, share_in, min_stable_out)
  }

  fn execute_mint<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    band: RatioBand,
    collateral_in: u128,
    share_in: u128,
    min_stable_out: u128,
  ) -> Result<MintReceipt> {
    let conversion = self.band_conversion(ctx.prices, ctx.clock, band)?;
    let quote = mint_for_band(
      band,
      &conversion,
      collateral_in,
      share_in,
      self.params.minting_fee()?,
    )?;

    // Ceiling is in collateral units
    if quote.collateral_in > 0 {
      let collateral_after = self
        .available_collateral()?
        .checked_add(quote.collateral_in)
        .ok_or(MintArithmetic)?;
      require_gte!(self.params.collateral_ceiling, collateral_after, CeilingExceeded);
    }
    if quote.stable_out == 0 {
      return Err(InvalidAmount.into());
    }
    MinimumOut::stable(min_stable_out).validate_token_out(quote.stable_out)?;
    let stability_fee =
      self.estimate_stability_fee(ctx.prices, ctx.clock, quote.stable_out)?;

    let pool = self.pool_account;
    let caller = ctx.caller;
    self.tokens.atomically(|t: &mut Batch<'_, L>| {
      if quote.collateral_in > 0 {
        t.collateral
          .transfer_from(&pool, &caller, &pool, quote.collateral_in)?;
      }
      if quote.share_burned > 0 {
        t.share.burn(&caller, quote.share_burned)?;
      }
      t.stable.mint(&caller, quote.stable_out)?;
      if stability_fee > 0 {
        t.fee.burn_from(&pool, &caller, stability_fee)?;
      }
      Ok(())
    })?;

    info!(
      target: "arth_pool",
      caller = %caller,
      collateral_in = quote.collateral_in,
      share_burned = quote.share_burned,
      fees = quote.fees,
      stable_out = quote.stable_out,
      stability_fee,
      "mint"
    );
    Ok(MintReceipt {
      quote,
      stability_fee,
    })
  }
}
