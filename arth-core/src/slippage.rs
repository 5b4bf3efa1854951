use anchor_lang::prelude::*;

use crate::error::CoreError::{self, SlippageCollateral, SlippageShare, SlippageStable};

/// Token leg a minimum output applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum SlippageLeg {
  Stable,
  Collateral,
  Share,
}

impl SlippageLeg {
  fn error(self) -> CoreError {
    match self {
      SlippageLeg::Stable => SlippageStable,
      SlippageLeg::Collateral => SlippageCollateral,
      SlippageLeg::Share => SlippageShare,
    }
  }
}

/// Client specified lowest tolerable output for one leg of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct MinimumOut {
  pub leg: SlippageLeg,
  pub minimum: u128,
}

impl MinimumOut {
  #[must_use]
  pub fn stable(minimum: u128) -> MinimumOut {
    MinimumOut {
      leg: SlippageLeg::Stable,
      minimum,
    }
  }

  #[must_use]
  pub fn collateral(minimum: u128) -> MinimumOut {
    MinimumOut {
      leg: SlippageLeg::Collateral,
      minimum,
    }
  }

  #[must_use]
  pub fn share(minimum: u128) -> MinimumOut {
    MinimumOut {
      leg: SlippageLeg::Share,
      minimum,
    }
  }

  /// Checks a computed output against the minimum, reporting both values.
  pub fn validate_token_out(&self, token_out: u128) -> Result<()> {
    if token_out >= self.minimum {
      Ok(())
    } else {
      Err(error!(self.leg.error()).with_values((token_out, self.minimum)))
    }
  }
}
