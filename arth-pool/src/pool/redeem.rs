use anchor_lang::prelude::*;
use arth_core::collateral_ratio::{RatioBand, RatioSource};
use arth_core::error::CoreError::{InsufficientPoolCollateral, InvalidAmount};
use arth_core::exchange_math::redeem_for_band;
use arth_core::host_clock::HostClock;
use arth_core::price_resolver::PriceSource;
use arth_core::slippage::MinimumOut;
use tracing::info;

use super::{CollateralPool, CollectReceipt, RedeemReceipt};
use crate::auth::AuthorizationPolicy;
use crate::context::CallContext;
use crate::ledger::{Batch, TokenLedger};
use crate::pause::Operation;

impl<L: TokenLedger, A: AuthorizationPolicy> CollateralPool<L, A> {
  /// First phase of a redemption.
  ///
  /// Burns `stable_in` from the caller and records what the pool owes in a
  /// pending claim. Owed share is minted into pool custody now; collateral
  /// stays in custody, counted as unclaimed, until collection.
  ///
  /// # Errors
  /// * Redemption paused
  /// * Collateral or share output below its minimum
  /// * Owed collateral exceeds available custody
  /// * Ledger failures
  pub fn redeem_request<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    stable_in: u128,
    min_share_out: u128,
    min_collateral_out: u128,
  ) -> Result<RedeemReceipt> {
    self.pause.ensure_active(Operation::Redeem)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    self.execute_redeem(ctx, band, stable_in, min_share_out, min_collateral_out)
  }

  pub fn redeem_1t1<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    stable_in: u128,
    min_collateral_out: u128,
  ) -> Result<RedeemReceipt> {
    self.pause.ensure_active(Operation::Redeem)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_full()?;
    self.execute_redeem(ctx, band, stable_in, 0, min_collateral_out)
  }

  pub fn redeem_fractional<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    stable_in: u128,
    min_share_out: u128,
    min_collateral_out: u128,
  ) -> Result<RedeemReceipt> {
    self.pause.ensure_active(Operation::Redeem)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_fractional()?;
    self.execute_redeem(ctx, band, stable_in, min_share_out, min_collateral_out)
  }

  pub fn redeem_algorithmic<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    stable_in: u128,
    min_share_out: u128,
  ) -> Result<RedeemReceipt> {
    self.pause.ensure_active(Operation::Redeem)?;
    let band = RatioBand::of(ctx.ratio.collateral_ratio()?)?;
    band.require_algorithmic()?;
    self.execute_redeem(ctx, band, stable_in, min_share_out, 0)
  }

  fn execute_redeem<P: PriceSource, R: RatioSource, C: HostClock>(
    &mut self,
    ctx: &CallContext<P, R, C>,
    band: RatioBand,
    stable_in: u128,
    min_share_out: u128,
    min_collateral_out: u128,
  ) -> Result<RedeemReceipt> {
    let conversion = self.band_conversion(ctx.prices, ctx.clock, band)?;
    let quote = redeem_for_band(
      band,
      &conversion,
      stable_in,
      self.params.redemption_fee()?,
    )?;
    if quote.collateral_out == 0 && quote.share_out == 0 {
      return Err(InvalidAmount.into());
    }
    MinimumOut::collateral(min_collateral_out)
      .validate_token_out(quote.collateral_out)?;
    MinimumOut::share(min_share_out).validate_token_out(quote.share_out)?;
    require_gte!(
      self.available_collateral()?,
      quote.collateral_out,
      InsufficientPoolCollateral
    );
    let stability_fee =
      self.estimate_stability_fee(ctx.prices, ctx.clock, stable_in)?;
    let staged = self.redemptions.stage_request(
      &ctx.caller,
      quote.collateral_out,
      quote.share_out,
      ctx.clock.height(),
    )?;

    let pool = self.pool_account;
    let caller = ctx.caller;
    self.tokens.atomically(|t: &mut Batch<'_, L>| {
      t.stable.burn(&caller, stable_in)?;
      if quote.share_out > 0 {
        t.share.mint(&pool, quote.share_out)?;
      }
      if stability_fee > 0 {
        t.fee.burn_from(&pool, &caller, stability_fee)?;
      }
      Ok(())
    })?;
    self.redemptions.commit(staged);

    info!(
      target: "arth_pool",
      caller = %caller,
      stable_in,
      fees = quote.fees,
      collateral_owed = quote.collateral_out,
      share_owed = quote.share_out,
      stability_fee,
      request_height = staged.record.request_height,
      "redeem request"
    );
    Ok(RedeemReceipt {
      quote,
      stability_fee,
      claim: staged.record,
    })
  }

  /// Second phase of a redemption: pays out the caller's claim once the
  /// delay has passed since its latest request.
  ///
  /// # Errors
  /// * No outstanding claim
  /// * Delay not yet elapsed
  pub fn collect_redemption<C: HostClock>(
    &mut self,
    caller: &Pubkey,
    clock: &C,
  ) -> Result<CollectReceipt> {
    let staged = self.redemptions.stage_collect(
      caller,
      clock.height(),
      self.params.redemption_delay_blocks,
    )?;

    let pool = self.pool_account;
    self.tokens.atomically(|t: &mut Batch<'_, L>| {
      if staged.collateral > 0 {
        t.collateral.transfer(&pool, caller, staged.collateral)?;
      }
      if staged.share > 0 {
        t.share.transfer(&pool, caller, staged.share)?;
      }
      Ok(())
    })?;
    self.redemptions.commit(staged);

    info!(
      target: "arth_pool",
      caller = %caller,
      collateral = staged.collateral,
      share = staged.share,
      height = clock.height(),
      "collect redemption"
    );
    Ok(CollectReceipt {
      collateral: staged.collateral,
      share: staged.share,
    })
  }
}
