use anchor_lang::prelude::*;
use arth_core::collateral_ratio::{RatioBand, RatioSource};
use arth_core::conversion::Conversion;
use arth_core::host_clock::HostClock;
use arth_core::price_resolver::PriceSource;
use arth_core::rebalance_math::{
  available_excess_value, buy_back_share, recollateralize,
  target_collateral_value, BuybackQuote, RecollateralizeQuote,
};
use arth_core::slippage::MinimumOut;
use tracing::info;

use super::CollateralPool;
use crate::auth::AuthorizationPolicy;
use crate::context::CallContext;
use crate::ledger::{Batch, TokenLedger};
use crate::pause::Operation;

impl<L: TokenLedger, A: AuthorizationPolicy> CollateralPool<L, A> {
  /// Current and target collateral value, both in GMU.
  fn collateral_position<P: PriceSource, R: RatioSource, C: HostClock>(
    &self,
    ctx: &CallContext<P, R, C>,
    conversion: &Conversion,
  ) -> Result<(u128, u128)> {
    let ratio = ctx.ratio.collateral_ratio()?;
    RatioBand::of(ratio)?;
    let actual = conversion.collateral_to_value(self.available_collateral()?)?;
    let target = target_collateral_value(self.tokens.stable.total_supply(), ratio)?;
    Ok((actual, target))
  }

  /// Adds collateral while the pool is under target, paying share at the
  /// bonus rate net of the recollateralize fee. Input beyond the shortfall
  /// is left with the caller.
  ///
  /// # Errors
  /// * Recollateralize paused
  /// * Pool at or above target
  /// * Share output below `min_share_out`
  pub fn recollateralize<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    collateral_in: u128,
    min_share_out: u128,
  ) -> Result<RecollateralizeQuote> {
    self.pause.ensure_active(Operation::Recollateralize)?;
    let conversion = self.conversion(ctx.prices, ctx.clock)?;
    let (actual, target) = self.collateral_position(ctx, &conversion)?;
    let quote = recollateralize(
      &conversion,
      collateral_in,
      actual,
      target,
      self.params.bonus_rate()?,
      self.params.recollat_fee()?,
    )?;
    MinimumOut::share(min_share_out).validate_token_out(quote.share_out)?;

    let pool = self.pool_account;
    let caller = ctx.caller;
    self.tokens.atomically(|t: &mut Batch<'_, L>| {
      if quote.collateral_used > 0 {
        t.collateral
          .transfer_from(&pool, &caller, &pool, quote.collateral_used)?;
      }
      if quote.share_out > 0 {
        t.share.mint(&caller, quote.share_out)?;
      }
      Ok(())
    })?;

    info!(
      target: "arth_pool",
      caller = %caller,
      collateral_used = quote.collateral_used,
      value_used = quote.value_used,
      share_out = quote.share_out,
      "recollateralize"
    );
    Ok(quote)
  }

  /// Buys share back for collateral while the pool holds more than its
  /// target, up to the excess left after the buyback buffer. Share beyond
  /// that cap is left with the caller.
  ///
  /// # Errors
  /// * Buyback paused
  /// * Pool below target
  /// * Collateral output below `min_collateral_out`
  pub fn buy_back_share<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    share_in: u128,
    min_collateral_out: u128,
  ) -> Result<BuybackQuote> {
    self.pause.ensure_active(Operation::Buyback)?;
    let conversion = self.conversion(ctx.prices, ctx.clock)?;
    let (actual, target) = self.collateral_position(ctx, &conversion)?;
    let excess =
      available_excess_value(actual, target, self.params.buyback_buffer()?)?;
    let quote = buy_back_share(
      &conversion,
      share_in,
      excess,
      self.params.buyback_fee()?,
    )?;
    MinimumOut::collateral(min_collateral_out)
      .validate_token_out(quote.collateral_out)?;

    let pool = self.pool_account;
    let caller = ctx.caller;
    self.tokens.atomically(|t: &mut Batch<'_, L>| {
      if quote.share_used > 0 {
        t.share.burn(&caller, quote.share_used)?;
      }
      if quote.collateral_out > 0 {
        t.collateral.transfer(&pool, &caller, quote.collateral_out)?;
      }
      Ok(())
    })?;

    info!(
      target: "arth_pool",
      caller = %caller,
      share_used = quote.share_used,
      fees = quote.fees,
      collateral_out = quote.collateral_out,
      excess,
      "buyback"
    );
    Ok(quote)
  }
}
