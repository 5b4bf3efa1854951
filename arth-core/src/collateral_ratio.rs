use anchor_lang::prelude::*;
use fix::prelude::*;

use crate::error::CoreError::{
  CollateralRatioOutOfBounds, NotRatioController, RequiresAlgorithmic,
  RequiresFractional, RequiresFullCollateral,
};

/// Read-only access to the global collateral ratio.
pub trait RatioSource {
  fn collateral_ratio(&self) -> Result<UFix64<N6>>;
}

/// Which formula family a collateral ratio selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioBand {
  /// `CR = 1`
  Full,
  /// `0 < CR < 1`
  Fractional(UFix64<N6>),
  /// `CR = 0`
  Algorithmic,
}

impl RatioBand {
  /// Classifies a ratio.
  ///
  /// # Errors
  /// * Ratio above 100%
  pub fn of(ratio: UFix64<N6>) -> Result<RatioBand> {
    if ratio > UFix64::one() {
      Err(CollateralRatioOutOfBounds.into())
    } else if ratio == UFix64::one() {
      Ok(RatioBand::Full)
    } else if ratio == UFix64::zero() {
      Ok(RatioBand::Algorithmic)
    } else {
      Ok(RatioBand::Fractional(ratio))
    }
  }

  pub fn require_full(self) -> Result<()> {
    match self {
      RatioBand::Full => Ok(()),
      _ => Err(RequiresFullCollateral.into()),
    }
  }

  pub fn require_algorithmic(self) -> Result<()> {
    match self {
      RatioBand::Algorithmic => Ok(()),
      _ => Err(RequiresAlgorithmic.into()),
    }
  }

  pub fn require_fractional(self) -> Result<UFix64<N6>> {
    match self {
      RatioBand::Fractional(ratio) => Ok(ratio),
      _ => Err(RequiresFractional.into()),
    }
  }
}

/// Global collateral ratio, writable only by its controller.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct CollateralRatioState {
  ratio: UFixValue64,
  controller: Pubkey,
}

impl CollateralRatioState {
  /// Starts fully collateralized.
  #[must_use]
  pub fn new(controller: Pubkey) -> CollateralRatioState {
    CollateralRatioState {
      ratio: UFix64::<N6>::one().into(),
      controller,
    }
  }

  #[must_use]
  pub fn controller(&self) -> Pubkey {
    self.controller
  }

  /// Writes a new ratio.
  ///
  /// # Errors
  /// * Caller is not the controller
  /// * Ratio above 100%
  pub fn set(&mut self, caller: &Pubkey, ratio: UFix64<N6>) -> Result<()> {
    if *caller != self.controller {
      Err(NotRatioController.into())
    } else if ratio > UFix64::one() {
      Err(CollateralRatioOutOfBounds.into())
    } else {
      self.ratio = ratio.into();
      Ok(())
    }
  }

  /// Hands the setter to another controller.
  ///
  /// # Errors
  /// * Caller is not the current controller
  pub fn set_controller(&mut self, caller: &Pubkey, next: Pubkey) -> Result<()> {
    if *caller == self.controller {
      self.controller = next;
      Ok(())
    } else {
      Err(NotRatioController.into())
    }
  }
}

impl RatioSource for CollateralRatioState {
  fn collateral_ratio(&self) -> Result<UFix64<N6>> {
    self.ratio.try_into()
  }
}

impl RatioSource for UFix64<N6> {
  fn collateral_ratio(&self) -> Result<UFix64<N6>> {
    Ok(*self)
  }
}
