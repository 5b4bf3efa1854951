//! Collateralization engine state and its read-only views.
//!
//! Every state-mutating call follows the same order: check the pause flag,
//! read the ratio and prices into locals, compute a quote with the pure
//! math in `arth_core`, validate it, then apply every token movement inside
//! [`TokenSet::atomically`] and commit pool-side records last.

mod admin;
mod mint;
mod rebalance;
mod redeem;

use anchor_lang::prelude::*;
use arth_core::collateral_ratio::{RatioBand, RatioSource};
use arth_core::conversion::Conversion;
use arth_core::error::CoreError::{InsufficientPoolCollateral, PriceUnavailable};
use arth_core::exchange_math::{MintQuote, RedeemQuote};
use arth_core::fee_controller::stability_fee_value;
use arth_core::host_clock::HostClock;
use arth_core::pool_parameters::PoolParameters;
use arth_core::price_resolver::PriceSource;
use arth_core::rebalance_math::target_collateral_value;
use fix::prelude::*;

use crate::auth::AuthorizationPolicy;
use crate::ledger::{TokenLedger, TokenSet};
use crate::pause::PauseFlags;
use crate::redemption::{PendingRedemption, RedemptionLedger};

/// Result of a successful mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintReceipt {
  pub quote: MintQuote,
  /// Fee tokens burned from the caller.
  pub stability_fee: u128,
}

/// Result of a successful redemption request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedeemReceipt {
  pub quote: RedeemQuote,
  pub stability_fee: u128,
  /// Caller's claim after this request.
  pub claim: PendingRedemption,
}

/// Amounts paid out by a collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectReceipt {
  pub collateral: u128,
  pub share: u128,
}

/// A collateral pool issuing the stable token against collateral and share.
#[derive(Clone, Debug)]
pub struct CollateralPool<L, A> {
  pool_account: Pubkey,
  params: PoolParameters,
  pause: PauseFlags,
  authority: A,
  redemptions: RedemptionLedger,
  tokens: TokenSet<L>,
}

impl<L: TokenLedger, A: AuthorizationPolicy> CollateralPool<L, A> {
  /// Creates an active pool custodying collateral at `pool_account`.
  ///
  /// # Errors
  /// * Parameters fail validation
  pub fn new(
    pool_account: Pubkey,
    params: PoolParameters,
    authority: A,
    tokens: TokenSet<L>,
  ) -> Result<CollateralPool<L, A>> {
    params.validate()?;
    Ok(CollateralPool {
      pool_account,
      params,
      pause: PauseFlags::default(),
      authority,
      redemptions: RedemptionLedger::new(),
      tokens,
    })
  }

  #[must_use]
  pub fn pool_account(&self) -> Pubkey {
    self.pool_account
  }

  #[must_use]
  pub fn parameters(&self) -> &PoolParameters {
    &self.params
  }

  #[must_use]
  pub fn pause_flags(&self) -> &PauseFlags {
    &self.pause
  }

  #[must_use]
  pub fn authority(&self) -> &A {
    &self.authority
  }

  /// Role store, for role changes guarded by the store itself.
  pub fn authority_mut(&mut self) -> &mut A {
    &mut self.authority
  }

  #[must_use]
  pub fn tokens(&self) -> &TokenSet<L> {
    &self.tokens
  }

  /// Host-side ledger access for balances and approvals outside pool calls.
  pub fn tokens_mut(&mut self) -> &mut TokenSet<L> {
    &mut self.tokens
  }

  #[must_use]
  pub fn pending_redemption(&self, account: &Pubkey) -> PendingRedemption {
    self.redemptions.pending(account)
  }

  #[must_use]
  pub fn unclaimed_collateral(&self) -> u128 {
    self.redemptions.unclaimed_collateral()
  }

  #[must_use]
  pub fn unclaimed_share(&self) -> u128 {
    self.redemptions.unclaimed_share()
  }

  /// Collateral in custody not already owed to pending redemptions.
  pub fn available_collateral(&self) -> Result<u128> {
    self
      .tokens
      .collateral
      .balance_of(&self.pool_account)
      .checked_sub(self.redemptions.unclaimed_collateral())
      .ok_or(InsufficientPoolCollateral.into())
  }

  pub fn global_collateral_ratio<R: RatioSource>(
    &self,
    ratio: &R,
  ) -> Result<UFix64<N6>> {
    ratio.collateral_ratio()
  }

  /// Collateral price with the emergency override applied.
  pub fn collateral_price<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    let resolved = prices.collateral_price(clock)?;
    self.pause.collateral_price(resolved)
  }

  pub fn share_price<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    require_price(prices.share_price(clock)?)
  }

  pub fn fee_token_price<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    require_price(prices.fee_token_price(clock)?)
  }

  /// GMU value of the available collateral.
  pub fn collateral_gmu_balance<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
  ) -> Result<u128> {
    let conversion = Conversion::new(
      self.collateral_price(prices, clock)?,
      UFix64::zero(),
      self.params.collateral_scale()?,
    );
    conversion.collateral_to_value(self.available_collateral()?)
  }

  /// GMU value the pool should hold at the current ratio.
  pub fn target_collateral_value<R: RatioSource>(&self, ratio: &R) -> Result<u128> {
    target_collateral_value(self.tokens.stable.total_supply(), ratio.collateral_ratio()?)
  }

  /// Fee tokens charged alongside `amount_stable` minted or redeemed,
  /// quoted through the fee token's feed. Zero without reading the fee
  /// token price when the fee is off.
  pub fn estimate_stability_fee<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
    amount_stable: u128,
  ) -> Result<u128> {
    let stability_fee = self.params.stability_fee()?;
    if stability_fee == UFix64::zero() {
      return Ok(0);
    }
    self.fee_token_price(prices, clock)?;
    let value = stability_fee_value(amount_stable, stability_fee)?;
    if value == 0 {
      return Ok(0);
    }
    prices.fee_token_amount(clock, value)
  }

  /// Prices for the legs a band's formulas use. Unused legs stay zero.
  fn band_conversion<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
    band: RatioBand,
  ) -> Result<Conversion> {
    let collateral_price = match band {
      RatioBand::Algorithmic => UFix64::zero(),
      _ => self.collateral_price(prices, clock)?,
    };
    let share_price = match band {
      RatioBand::Full => UFix64::zero(),
      _ => self.share_price(prices, clock)?,
    };
    Ok(Conversion::new(
      collateral_price,
      share_price,
      self.params.collateral_scale()?,
    ))
  }

  fn conversion<P: PriceSource, C: HostClock>(
    &self,
    prices: &P,
    clock: &C,
  ) -> Result<Conversion> {
    Ok(Conversion::new(
      self.collateral_price(prices, clock)?,
      self.share_price(prices, clock)?,
      self.params.collateral_scale()?,
    ))
  }
}

fn require_price(price: UFix64<N6>) -> Result<UFix64<N6>> {
  (price > UFix64::zero())
    .then_some(price)
    .ok_or(PriceUnavailable.into())
}
