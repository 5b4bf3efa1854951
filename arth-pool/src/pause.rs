use anchor_lang::prelude::*;
use arth_core::error::CoreError::{
  BuybackPaused, MintPaused, PriceUnavailable, RecollateralizePaused,
  RedeemPaused,
};
use fix::prelude::*;
use tracing::warn;

/// Pool entry points with an independent pause flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum Operation {
  Mint,
  Redeem,
  Recollateralize,
  Buyback,
}

/// Frozen collateral price used when the oracle reports the unset sentinel.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PriceOverride {
  price: UFixValue64,
  enabled: bool,
}

impl Default for PriceOverride {
  fn default() -> Self {
    PriceOverride {
      price: UFix64::<N6>::zero().into(),
      enabled: false,
    }
  }
}

impl PriceOverride {
  pub fn price(&self) -> Result<Option<UFix64<N6>>> {
    if self.enabled {
      let price: UFix64<N6> = self.price.try_into()?;
      Ok(Some(price))
    } else {
      Ok(None)
    }
  }
}

#[derive(Clone, Copy, Debug, Default, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PauseFlags {
  pub mint_paused: bool,
  pub redeem_paused: bool,
  pub recollateralize_paused: bool,
  pub buyback_paused: bool,
  pub collateral_price_override: PriceOverride,
}

impl PauseFlags {
  #[must_use]
  pub fn is_paused(&self, op: Operation) -> bool {
    match op {
      Operation::Mint => self.mint_paused,
      Operation::Redeem => self.redeem_paused,
      Operation::Recollateralize => self.recollateralize_paused,
      Operation::Buyback => self.buyback_paused,
    }
  }

  /// Flips the flag for `op`, returning the new paused state.
  pub fn toggle(&mut self, op: Operation) -> bool {
    let flag = match op {
      Operation::Mint => &mut self.mint_paused,
      Operation::Redeem => &mut self.redeem_paused,
      Operation::Recollateralize => &mut self.recollateralize_paused,
      Operation::Buyback => &mut self.buyback_paused,
    };
    *flag = !*flag;
    *flag
  }

  /// Fails with the operation's own pause error.
  pub fn ensure_active(&self, op: Operation) -> Result<()> {
    if !self.is_paused(op) {
      Ok(())
    } else {
      Err(
        match op {
          Operation::Mint => MintPaused,
          Operation::Redeem => RedeemPaused,
          Operation::Recollateralize => RecollateralizePaused,
          Operation::Buyback => BuybackPaused,
        }
        .into(),
      )
    }
  }

  pub fn set_price_override(&mut self, price: UFix64<N6>) {
    self.collateral_price_override = PriceOverride {
      price: price.into(),
      enabled: true,
    };
  }

  pub fn clear_price_override(&mut self) {
    self.collateral_price_override = PriceOverride::default();
  }

  /// Substitutes the override for an unset (zero) oracle price.
  ///
  /// # Errors
  /// * Unset price with no override enabled
  pub fn collateral_price(&self, resolved: UFix64<N6>) -> Result<UFix64<N6>> {
    if resolved > UFix64::zero() {
      return Ok(resolved);
    }
    match self.collateral_price_override.price()? {
      Some(price) if price > UFix64::zero() => {
        warn!(target: "arth_pool", price = price.bits, "collateral oracle unset, using override price");
        Ok(price)
      }
      _ => Err(PriceUnavailable.into()),
    }
  }
}
