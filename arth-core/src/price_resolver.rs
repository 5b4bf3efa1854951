//! Composition of feed quotes into GMU prices.
//!
//! Every resolved price is "GMU value of one whole unit of the asset" with 6
//! decimals. A path chains a base price (either the reference asset priced
//! in GMU, or GMU itself) with a pair feed quoted in one of two orientations.
//! A zero anywhere in the chain resolves to zero, which callers treat as the
//! unset sentinel.

use anchor_lang::prelude::*;
use fix::prelude::*;
use tracing::debug;

use crate::error::CoreError::PriceComposition;
use crate::host_clock::HostClock;
use crate::oracle::{FeedAdapter, PriceFeed, SimpleOracle};
use crate::reference_feed::{ReferenceFeed, ReferenceOracle};
use crate::token_math::{div_fix_floor, mul_div_floor, PRECISION};

/// One whole 18-decimal token, the amount every path quotes.
pub const QUOTE_UNIT: u128 = 1_000_000_000_000_000_000;

/// Direction in which a pair feed reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub enum FeedOrientation {
  /// `quote(1 base) = X asset`, so `price = base_gmu * unit / X`
  AssetPerBase,
  /// `quote(1 asset) = X base`, so `price = X * base_gmu / unit`
  BasePerAsset,
}

/// What the pair feed's other side is priced against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub enum PriceBase {
  /// The reference asset, valued through the reference feed and GMU rate.
  Reference,
  /// GMU directly, e.g. a feed quoted against the stable token.
  Gmu,
}

#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PricePath {
  pub feed: FeedAdapter,
  pub orientation: FeedOrientation,
  pub base: PriceBase,
}

impl PricePath {
  #[must_use]
  pub fn new(
    feed: FeedAdapter,
    orientation: FeedOrientation,
    base: PriceBase,
  ) -> PricePath {
    PricePath {
      feed,
      orientation,
      base,
    }
  }

  /// GMU price of one asset unit given the GMU price of the base.
  pub fn price(&self, base_gmu: UFix64<N6>) -> Result<UFix64<N6>> {
    if base_gmu == UFix64::zero() {
      return Ok(UFix64::zero());
    }
    let quoted = self.feed.quote(QUOTE_UNIT)?;
    let base = u128::from(base_gmu.bits);
    let price = match self.orientation {
      FeedOrientation::AssetPerBase if quoted == 0 => Some(0),
      FeedOrientation::AssetPerBase => mul_div_floor(base, QUOTE_UNIT, quoted),
      FeedOrientation::BasePerAsset => mul_div_floor(quoted, base, QUOTE_UNIT),
    };
    price
      .and_then(|p| u64::try_from(p).ok())
      .map(UFix64::new)
      .ok_or(PriceComposition.into())
  }

  /// Asset units worth `value` GMU, quoted through the feed in its own
  /// orientation. A GMU-based `AssetPerBase` path is a single feed quote.
  pub fn asset_amount(&self, base_gmu: UFix64<N6>, value: u128) -> Result<u128> {
    if base_gmu == UFix64::zero() {
      return Ok(0);
    }
    match self.orientation {
      FeedOrientation::AssetPerBase => {
        let base_units = if base_gmu == UFix64::one() {
          value
        } else {
          div_fix_floor(value, base_gmu).ok_or(PriceComposition)?
        };
        self.feed.quote(base_units)
      }
      FeedOrientation::BasePerAsset => {
        let quoted = self.feed.quote(QUOTE_UNIT)?;
        let denom = quoted
          .checked_mul(u128::from(base_gmu.bits))
          .ok_or(PriceComposition)?;
        if denom == 0 {
          return Ok(0);
        }
        mul_div_floor(value, QUOTE_UNIT * PRECISION, denom)
          .ok_or(PriceComposition.into())
      }
    }
  }
}

/// Read-only view of the three prices the engine consumes.
pub trait PriceSource {
  fn collateral_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>>;
  fn share_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>>;
  fn fee_token_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>>;

  /// Fee tokens worth `value` GMU, rounded down.
  fn fee_token_amount<C: HostClock>(&self, clock: &C, value: u128) -> Result<u128> {
    let price = self.fee_token_price(clock)?;
    div_fix_floor(value, price).ok_or(PriceComposition.into())
  }
}

/// Prices resolved once and held fixed for the remainder of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceSnapshot {
  pub collateral: UFix64<N6>,
  pub share: UFix64<N6>,
  pub fee_token: UFix64<N6>,
}

impl PriceSnapshot {
  #[must_use]
  pub fn new(
    collateral: UFix64<N6>,
    share: UFix64<N6>,
    fee_token: UFix64<N6>,
  ) -> PriceSnapshot {
    PriceSnapshot {
      collateral,
      share,
      fee_token,
    }
  }
}

impl PriceSource for PriceSnapshot {
  fn collateral_price<C: HostClock>(&self, _: &C) -> Result<UFix64<N6>> {
    Ok(self.collateral)
  }

  fn share_price<C: HostClock>(&self, _: &C) -> Result<UFix64<N6>> {
    Ok(self.share)
  }

  fn fee_token_price<C: HostClock>(&self, _: &C) -> Result<UFix64<N6>> {
    Ok(self.fee_token)
  }
}

/// Chains the reference feed, GMU rate and per-asset pair feeds.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize)]
pub struct PriceResolver<R> {
  pub reference: ReferenceOracle<R>,
  /// USD to GMU rate.
  pub gmu_rate: SimpleOracle,
  pub collateral: PricePath,
  pub share: PricePath,
  pub fee_token: PricePath,
}

impl<R: ReferenceFeed> PriceResolver<R> {
  #[must_use]
  pub fn new(
    reference: ReferenceOracle<R>,
    gmu_rate: SimpleOracle,
    collateral: PricePath,
    share: PricePath,
    fee_token: PricePath,
  ) -> PriceResolver<R> {
    PriceResolver {
      reference,
      gmu_rate,
      collateral,
      share,
      fee_token,
    }
  }

  /// GMU price of the reference asset.
  ///   `reference_usd * gmu_rate / 1e6`
  pub fn reference_gmu_price<C: HostClock>(
    &self,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    let usd = self.reference.usd_price(clock)?;
    let rate = self.gmu_rate.price()?;
    usd
      .mul_div_floor(rate, UFix64::one())
      .ok_or(PriceComposition.into())
  }

  fn base_price<C: HostClock>(
    &self,
    path: &PricePath,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    match path.base {
      PriceBase::Reference => self.reference_gmu_price(clock),
      PriceBase::Gmu => Ok(UFix64::one()),
    }
  }

  fn resolve<C: HostClock>(
    &self,
    path: &PricePath,
    clock: &C,
  ) -> Result<UFix64<N6>> {
    path.price(self.base_price(path, clock)?)
  }
}

impl<R: ReferenceFeed> PriceSource for PriceResolver<R> {
  fn collateral_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>> {
    let price = self.resolve(&self.collateral, clock)?;
    debug!(target: "arth_core", price = price.bits, "resolved collateral price");
    Ok(price)
  }

  fn share_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>> {
    let price = self.resolve(&self.share, clock)?;
    debug!(target: "arth_core", price = price.bits, "resolved share price");
    Ok(price)
  }

  fn fee_token_price<C: HostClock>(&self, clock: &C) -> Result<UFix64<N6>> {
    let price = self.resolve(&self.fee_token, clock)?;
    debug!(target: "arth_core", price = price.bits, "resolved fee token price");
    Ok(price)
  }

  fn fee_token_amount<C: HostClock>(&self, clock: &C, value: u128) -> Result<u128> {
    let base = self.base_price(&self.fee_token, clock)?;
    self.fee_token.asset_amount(base, value)
  }
}
